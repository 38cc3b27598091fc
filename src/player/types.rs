/// Common types shared by the engine adapter and the controller

use std::fmt;

/// A value read from or written to an engine property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Unset / unavailable ("none" in engine terms)
    None,
    Flag(bool),
    Int(i64),
    Double(f64),
    Str(String),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Double(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f64),
            PropertyValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            PropertyValue::Double(v) => Some(*v as i64),
            PropertyValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Flag(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v != 0),
            PropertyValue::Str(s) => match s.as_str() {
                "yes" | "true" => Some(true),
                "no" | "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value the way the engine's string API expects it.
    pub fn to_engine_string(&self) -> String {
        match self {
            PropertyValue::None => "no".to_string(),
            PropertyValue::Flag(v) => if *v { "yes" } else { "no" }.to_string(),
            PropertyValue::Int(v) => v.to_string(),
            PropertyValue::Double(v) => v.to_string(),
            PropertyValue::Str(s) => s.clone(),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Flag(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Double(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Str(v)
    }
}

/// Wire format a property is observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyFormat {
    /// Change notification only
    None,
    Flag,
    Int,
    Double,
    Str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Subtitle,
    Audio,
    Video,
}

impl TrackKind {
    pub fn from_engine(kind: &str) -> Option<Self> {
        match kind {
            "sub" => Some(TrackKind::Subtitle),
            "audio" => Some(TrackKind::Audio),
            "video" => Some(TrackKind::Video),
            _ => None,
        }
    }

    /// Engine property holding the selected track id
    pub fn selection_property(&self) -> &'static str {
        match self {
            TrackKind::Subtitle => "sid",
            TrackKind::Audio => "aid",
            TrackKind::Video => "vid",
        }
    }

    /// Window action the track menus activate
    pub fn action_name(&self) -> &'static str {
        match self {
            TrackKind::Subtitle => "select-subtitle",
            TrackKind::Audio => "select-audio",
            TrackKind::Video => "select-video",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: i64,
    pub kind: TrackKind,
    pub lang: Option<String>,
    pub title: Option<String>,
    pub album_art: bool,
}

impl Track {
    /// Menu label: `title – lang`, whichever parts exist, or `Track N`.
    pub fn label(&self) -> String {
        let parts: Vec<&str> = [self.title.as_deref(), self.lang.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            format!("Track {}", self.id)
        } else {
            parts.join(" – ")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub time: f64,
    pub title: Option<String>,
}

/// Why the engine stopped playing a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndFileReason {
    Eof,
    Stop,
    Quit,
    Error(String),
    Redirect,
}

impl fmt::Display for EndFileReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndFileReason::Eof => write!(f, "eof"),
            EndFileReason::Stop => write!(f, "stop"),
            EndFileReason::Quit => write!(f, "quit"),
            EndFileReason::Error(e) => write!(f, "error: {}", e),
            EndFileReason::Redirect => write!(f, "redirect"),
        }
    }
}

/// A single operation sent to the engine.
///
/// Dispatch code builds these so the mapping from gestures to engine calls
/// can be checked without a live engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOp {
    Set {
        property: &'static str,
        value: PropertyValue,
    },
    Command {
        name: &'static str,
        args: Vec<String>,
    },
    ShowText(String),
}

impl EngineOp {
    pub fn set(property: &'static str, value: impl Into<PropertyValue>) -> Self {
        EngineOp::Set {
            property,
            value: value.into(),
        }
    }

    pub fn command<S: Into<String>>(name: &'static str, args: impl IntoIterator<Item = S>) -> Self {
        EngineOp::Command {
            name,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn bare(name: &'static str) -> Self {
        EngineOp::Command {
            name,
            args: Vec::new(),
        }
    }
}
