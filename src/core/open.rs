//! Adding files to the engine: open dialogs and drag-and-drop.

use std::path::{Path, PathBuf};

use crate::constants::SUB_EXTS;
use crate::player::types::EngineOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Replace the playlist and start playing
    ClearAndAdd,
    PlaylistAdd,
    SubAdd,
    AudioAdd,
}

/// What a file chooser should offer for a mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilterSpec {
    pub name: &'static str,
    pub suffixes: Vec<&'static str>,
    pub mime_types: Vec<&'static str>,
}

impl OpenMode {
    pub fn title(self) -> &'static str {
        match self {
            OpenMode::ClearAndAdd => "Open Files",
            OpenMode::PlaylistAdd => "Add Files",
            OpenMode::SubAdd => "Add Subtitle",
            OpenMode::AudioAdd => "Add Audio",
        }
    }

    pub fn filter(self) -> FileFilterSpec {
        match self {
            OpenMode::SubAdd => FileFilterSpec {
                name: "Subtitle",
                suffixes: SUB_EXTS.iter().map(|e| e.trim_start_matches('.')).collect(),
                mime_types: Vec::new(),
            },
            OpenMode::AudioAdd => FileFilterSpec {
                name: "Audio",
                suffixes: Vec::new(),
                mime_types: vec!["video/*", "audio/*"],
            },
            OpenMode::ClearAndAdd | OpenMode::PlaylistAdd => FileFilterSpec {
                name: "Media",
                suffixes: Vec::new(),
                mime_types: vec!["video/*", "audio/*", "image/*"],
            },
        }
    }
}

/// Engine ops for files picked in an open dialog.
pub fn open_ops(mode: OpenMode, paths: &[String]) -> Vec<EngineOp> {
    let mut ops = Vec::with_capacity(paths.len() + 2);

    if mode == OpenMode::ClearAndAdd {
        ops.push(EngineOp::bare("stop"));
    }

    for path in paths {
        ops.push(match mode {
            OpenMode::SubAdd => EngineOp::command("sub-add", [path.as_str()]),
            OpenMode::AudioAdd => EngineOp::command("audio-add", [path.as_str()]),
            OpenMode::ClearAndAdd | OpenMode::PlaylistAdd => {
                EngineOp::command("loadfile", [path.as_str(), "append-play"])
            }
        });
    }

    if mode == OpenMode::ClearAndAdd {
        ops.push(EngineOp::set("pause", false));
    }

    ops
}

/// A folder replaces the playlist; the engine expands it.
pub fn open_folder_ops(folder: &str) -> Vec<EngineOp> {
    vec![
        EngineOp::bare("stop"),
        EngineOp::command("loadfile", [folder, "append-play"]),
    ]
}

/// Start dialogs next to the file being played, if it is a local file.
pub fn initial_folder(current_path: Option<&str>) -> Option<PathBuf> {
    let path = Path::new(current_path?);
    if !path.exists() {
        return None;
    }
    path.parent().map(Path::to_path_buf)
}

pub fn is_subtitle(name: &str) -> bool {
    let name = name.to_lowercase();
    SUB_EXTS.iter().any(|ext| name.ends_with(ext))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    Directory,
    Subtitle,
    Media,
    Unsupported,
}

/// A dropped file after the toolkit resolved its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    /// Local path, or URI for remote files
    pub location: String,
    pub name: String,
    pub is_dir: bool,
    pub content_type: String,
}

impl DroppedFile {
    pub fn classify(&self) -> DropKind {
        if self.is_dir {
            DropKind::Directory
        } else if is_subtitle(&self.name) {
            DropKind::Subtitle
        } else if ["video/", "audio/", "image/"]
            .iter()
            .any(|prefix| self.content_type.starts_with(prefix))
        {
            DropKind::Media
        } else {
            DropKind::Unsupported
        }
    }
}

/// Engine ops for a drop.
///
/// Subtitles are only added while something is playing. Playback is resumed
/// when the drop filled an empty playlist.
pub fn drop_ops(files: &[DroppedFile], is_playing: bool, was_empty: bool) -> Vec<EngineOp> {
    let mut ops = Vec::new();
    let mut appended = false;

    for file in files {
        match file.classify() {
            DropKind::Directory | DropKind::Media => {
                ops.push(EngineOp::command("loadfile", [file.location.as_str(), "append-play"]));
                appended = true;
            }
            DropKind::Subtitle if is_playing => {
                ops.push(EngineOp::command("sub-add", [file.location.as_str(), "select"]));
            }
            DropKind::Subtitle | DropKind::Unsupported => {}
        }
    }

    if was_empty && appended {
        ops.push(EngineOp::set("pause", false));
    }

    ops
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropIndicator {
    pub icon: &'static str,
    pub label: &'static str,
}

impl DropIndicator {
    pub const ADD_TO_PLAYLIST: DropIndicator = DropIndicator {
        icon: "list-add-symbolic",
        label: "Add to Playlist",
    };

    pub const ADD_SUBTITLE: DropIndicator = DropIndicator {
        icon: "media-view-subtitles-symbolic",
        label: "Add Subtitle Track",
    };

    /// Indicator for a drag hovering the window, decided by its first file.
    pub fn for_drag(first_name: Option<&str>, is_playing: bool) -> Self {
        match first_name {
            Some(name) if is_playing && is_subtitle(name) => Self::ADD_SUBTITLE,
            _ => Self::ADD_TO_PLAYLIST,
        }
    }
}
