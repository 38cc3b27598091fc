use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::types::EngineEvent;
use crate::utils::{CineError, Result};

/// Create the bounded queue that carries engine events to the UI thread.
///
/// The sending half lives on the pump thread and blocks when the queue is
/// full, which throttles the engine rather than dropping notifications.
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender { tx }, EventReceiver { rx })
}

/// Pump-thread side of the queue
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<EngineEvent>,
}

impl EventSender {
    /// Push an event, blocking while the queue is full.
    ///
    /// Must not be called from inside an async context.
    pub fn push(&self, event: EngineEvent) -> Result<()> {
        trace!("Queueing engine event: {}", event.kind());
        self.tx.blocking_send(event).map_err(|_| CineError::QueueClosed)
    }

    /// Push without blocking; a full queue drops the event. For events the
    /// UI can afford to lose.
    pub fn try_push(&self, event: EngineEvent) -> Result<()> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(event)) => {
                debug!("Event queue full, dropping {}", event.kind());
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(CineError::QueueClosed),
        }
    }
}

/// UI-thread side of the queue
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<EngineEvent>,
}

impl EventReceiver {
    /// Take up to `max` pending events without blocking.
    pub fn drain(&mut self, max: usize) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while events.len() < max {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(_) => break,
            }
        }
        events
    }

    /// Stop accepting new events; the pump sees `QueueClosed` on its next push.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerProperty;
    use std::thread;

    #[test]
    fn events_arrive_in_order() {
        let (tx, mut rx) = event_queue(8);

        tx.push(EngineEvent::StartFile).unwrap();
        tx.push(EngineEvent::property(PlayerProperty::Pause, false)).unwrap();
        tx.push(EngineEvent::FileLoaded).unwrap();

        assert_eq!(
            rx.drain(16),
            vec![
                EngineEvent::StartFile,
                EngineEvent::property(PlayerProperty::Pause, false),
                EngineEvent::FileLoaded,
            ]
        );
        assert!(rx.drain(16).is_empty());
    }

    #[test]
    fn drain_respects_the_batch_limit() {
        let (tx, mut rx) = event_queue(8);
        for _ in 0..5 {
            tx.push(EngineEvent::StartFile).unwrap();
        }

        assert_eq!(rx.drain(3).len(), 3);
        assert_eq!(rx.drain(3).len(), 2);
    }

    #[test]
    fn full_queue_blocks_the_pump_until_drained() {
        let (tx, mut rx) = event_queue(2);

        let pump = thread::spawn(move || {
            for _ in 0..6 {
                tx.push(EngineEvent::FileLoaded).unwrap();
            }
        });

        let mut received = 0;
        while received < 6 {
            received += rx.drain(64).len();
            thread::yield_now();
        }

        pump.join().unwrap();
        assert_eq!(received, 6);
    }

    #[test]
    fn closed_receiver_reports_queue_closed() {
        let (tx, mut rx) = event_queue(2);
        rx.close();

        let err = tx.push(EngineEvent::Shutdown).unwrap_err();
        assert!(err.is_shutdown());
        assert_eq!(tx.try_push(EngineEvent::Shutdown), Err(CineError::QueueClosed));
    }

    #[test]
    fn try_push_drops_when_full() {
        let (tx, mut rx) = event_queue(1);

        tx.try_push(EngineEvent::StartFile).unwrap();
        tx.try_push(EngineEvent::FileLoaded).unwrap();

        assert_eq!(rx.drain(8), vec![EngineEvent::StartFile]);
    }
}
