use thiserror::Error;

/// Errors raised by the player shell.
///
/// Most of these never reach the user: handlers either show a toast once or
/// log and move on. `Shutdown` in particular is expected while the window is
/// closing and is dropped silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CineError {
    /// The engine rejected a command or property access
    #[error("Engine error: {0}")]
    Engine(String),

    /// A call reached the engine after it began tearing down
    #[error("Engine is shutting down")]
    Shutdown,

    /// A property arrived in a shape the bridge cannot use
    #[error("Unexpected format for property '{property}': {found}")]
    PropertyFormat { property: String, found: String },

    /// File or folder selection failed or was cancelled
    #[error("Dialog error: {0}")]
    Dialog(String),

    /// A frame could not be rendered
    #[error("Render error: {0}")]
    Render(String),

    /// Settings could not be read, parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    /// The UI side of the event queue is gone
    #[error("Event queue closed")]
    QueueClosed,
}

impl CineError {
    /// Errors that only mean "the window is closing" and should be ignored.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, CineError::Shutdown | CineError::QueueClosed)
    }
}

impl From<std::io::Error> for CineError {
    fn from(error: std::io::Error) -> Self {
        CineError::Io(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CineError>;
