pub mod event_queue;
pub mod types;

pub use event_queue::{EventReceiver, EventSender, event_queue};
pub use types::{EngineEvent, EngineLogLevel};
