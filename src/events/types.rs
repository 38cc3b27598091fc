use crate::player::types::{Chapter, EndFileReason, PropertyValue, Track};
use crate::player::PlayerProperty;

/// Notifications produced by the engine pump thread.
///
/// Everything the pump reads off the engine is converted into one of these
/// before it crosses into the UI thread, so nothing downstream touches the
/// engine's own event structs.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// An observed property changed
    PropertyChanged {
        property: PlayerProperty,
        value: PropertyValue,
    },
    /// The track list was rebuilt
    TracksChanged(Vec<Track>),
    /// The chapter list was rebuilt, sorted by time
    ChaptersChanged(Vec<Chapter>),
    StartFile,
    FileLoaded,
    EndFile(EndFileReason),
    /// Display size of the video after a reconfig
    VideoSize { width: i64, height: i64 },
    /// Message from the engine's own log
    Log {
        level: EngineLogLevel,
        prefix: String,
        text: String,
    },
    /// The engine is terminating; the window should close
    Shutdown,
}

impl EngineEvent {
    pub fn property(property: PlayerProperty, value: impl Into<PropertyValue>) -> Self {
        EngineEvent::PropertyChanged {
            property,
            value: value.into(),
        }
    }

    /// Short name used in trace output
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::PropertyChanged { property, .. } => property.name(),
            EngineEvent::TracksChanged(_) => "track-list",
            EngineEvent::ChaptersChanged(_) => "chapter-list",
            EngineEvent::StartFile => "start-file",
            EngineEvent::FileLoaded => "file-loaded",
            EngineEvent::EndFile(_) => "end-file",
            EngineEvent::VideoSize { .. } => "video-reconfig",
            EngineEvent::Log { .. } => "log-message",
            EngineEvent::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl EngineLogLevel {
    /// Map the engine's textual level onto ours
    pub fn from_engine(level: &str) -> Self {
        match level {
            "fatal" | "error" => EngineLogLevel::Error,
            "warn" => EngineLogLevel::Warn,
            "info" => EngineLogLevel::Info,
            _ => EngineLogLevel::Debug,
        }
    }
}
