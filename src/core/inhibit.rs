use tracing::debug;

/// Something that can keep the session from idling.
pub trait Inhibitor {
    /// Returns a cookie, or 0 if the request was refused
    fn inhibit(&self, reason: &str) -> u32;
    fn uninhibit(&self, cookie: u32);
}

pub fn should_inhibit(paused: bool, idle_active: bool) -> bool {
    !paused && !idle_active
}

/// Holds at most one inhibit cookie.
#[derive(Debug, Default)]
pub struct InhibitGuard {
    cookie: Option<u32>,
}

impl InhibitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, wanted: bool, inhibitor: &dyn Inhibitor) {
        match (wanted, self.cookie) {
            (true, None) => {
                let cookie = inhibitor.inhibit("Playing Video");
                if cookie != 0 {
                    debug!("Idle inhibited ({})", cookie);
                    self.cookie = Some(cookie);
                }
            }
            (false, Some(_)) => self.release(inhibitor),
            _ => {}
        }
    }

    pub fn release(&mut self, inhibitor: &dyn Inhibitor) {
        if let Some(cookie) = self.cookie.take() {
            debug!("Idle inhibit released ({})", cookie);
            inhibitor.uninhibit(cookie);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl Inhibitor for Recorder {
        fn inhibit(&self, _reason: &str) -> u32 {
            self.calls.borrow_mut().push("inhibit".into());
            7
        }

        fn uninhibit(&self, cookie: u32) {
            self.calls.borrow_mut().push(format!("uninhibit {}", cookie));
        }
    }

    #[test]
    fn inhibits_only_while_playing() {
        assert!(should_inhibit(false, false));
        assert!(!should_inhibit(true, false));
        assert!(!should_inhibit(false, true));
    }

    #[test]
    fn cookie_is_taken_once_and_released_once() {
        let recorder = Recorder::default();
        let mut guard = InhibitGuard::new();

        guard.sync(true, &recorder);
        guard.sync(true, &recorder);
        assert_eq!(*recorder.calls.borrow(), vec!["inhibit"]);

        guard.sync(false, &recorder);
        guard.sync(false, &recorder);
        guard.release(&recorder);

        assert_eq!(*recorder.calls.borrow(), vec!["inhibit", "uninhibit 7"]);
    }
}
