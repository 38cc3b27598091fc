use std::time::Duration;

use crate::constants::{CONTROLS_HIDE_DELAY, CONTROLS_HIDE_DELAY_KEYBOARD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeState {
    Visible,
    Hidden,
}

/// Identifies one armed hide timer. Only the latest token can hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideToken(u64);

/// Conditions that keep the chrome on screen when the timer fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HideBlockers {
    pub engine_idle: bool,
    pub popover_open: bool,
    pub hovering_chrome: bool,
    pub fullscreen: bool,
    pub dialogs_open: bool,
}

impl HideBlockers {
    fn keeps_chrome(&self) -> bool {
        self.engine_idle || self.popover_open || self.hovering_chrome
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideOutcome {
    /// A newer arm superseded this timer
    Stale,
    /// Something still needs the chrome
    Kept,
    Hidden { hide_cursor: bool },
}

/// Show/hide state of the header bar and controls.
#[derive(Debug, Clone)]
pub struct AutoHide {
    state: ChromeState,
    generation: u64,
    pending: Option<u64>,
    last_pointer: Option<(f64, f64)>,
}

impl Default for AutoHide {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoHide {
    pub fn new() -> Self {
        Self {
            state: ChromeState::Visible,
            generation: 0,
            pending: None,
            last_pointer: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ChromeState {
        self.state
    }

    /// Start a new hide countdown, invalidating any earlier one.
    pub fn arm(&mut self) -> HideToken {
        self.generation += 1;
        self.pending = Some(self.generation);
        HideToken(self.generation)
    }

    pub fn delay(keyboard: bool) -> Duration {
        if keyboard {
            CONTROLS_HIDE_DELAY_KEYBOARD
        } else {
            CONTROLS_HIDE_DELAY
        }
    }

    /// Reveal the chrome. Returns true if it was hidden.
    pub fn show(&mut self) -> bool {
        let was_hidden = self.state == ChromeState::Hidden;
        self.state = ChromeState::Visible;
        was_hidden
    }

    /// Show and re-arm, unless the pointer did not actually move.
    pub fn pointer_moved(&mut self, x: f64, y: f64) -> Option<HideToken> {
        if self.last_pointer == Some((x, y)) {
            return None;
        }
        self.last_pointer = Some((x, y));
        self.show();
        Some(self.arm())
    }

    /// Clicks, keys and popover closes.
    pub fn activity(&mut self) -> HideToken {
        self.show();
        self.arm()
    }

    /// Cancel the pending timer without hiding.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn on_timeout(&mut self, token: HideToken, blockers: HideBlockers) -> HideOutcome {
        if self.pending != Some(token.0) {
            return HideOutcome::Stale;
        }
        self.pending = None;

        if blockers.keeps_chrome() {
            return HideOutcome::Kept;
        }

        self.state = ChromeState::Hidden;
        HideOutcome::Hidden {
            hide_cursor: blockers.fullscreen && !blockers.dialogs_open,
        }
    }
}
