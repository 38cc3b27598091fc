//! Widget writes produced by the controller.
//!
//! The controller never touches widgets; it returns these and the window
//! applies them on the UI thread with the widgets' own change handlers
//! blocked.

use std::time::Duration;

use crate::config::InterfaceConfig;
use crate::constants::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::core::adjustments::Adjustment;
use crate::core::aspect::AspectRatio;
use crate::core::autohide::HideToken;
use crate::core::navigation::NavState;
use crate::player::types::{Chapter, Track, TrackKind};
use crate::utils::format::format_time;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    PlayPauseSensitive(bool),
    Navigation(NavState),
    LoopPlaylistActive(bool),
    LoopFileActive(bool),
    /// Window state, fullscreen button icon and header decorations
    Fullscreen(bool),
    /// Elapsed label and progress value
    Progress(f64),
    /// Total label, progress range, sensitivity and elapsed label width
    Duration(f64),
    /// Volume slider value and icon
    Volume { volume: f64, muted: bool },
    MuteActive(bool),
    TrackSelected { kind: TrackKind, id: i64 },
    TrackMenus {
        tracks: Vec<Track>,
        show_video_menu: bool,
    },
    ChapterMarks(Vec<Chapter>),
    PlayPauseIcons {
        button: &'static str,
        indicator: &'static str,
        flash: bool,
    },
    /// Start page vs video surface, and menu actions that need a file
    Idle(bool),
    Title(String),
    Inhibit(bool),
    Spinner(bool),
    Toast(String),
    ShowChrome,
    HideChrome { hide_cursor: bool },
    /// Replace the pending hide timer with one for `token`
    ArmHideTimer { token: HideToken, delay: Duration },
    WindowSize { width: i32, height: i32 },
    /// Spin button in the options popover
    AdjustmentValue(Adjustment, f64),
    AspectSelected(AspectRatio),
    InterfaceChanged(InterfaceConfig),
    CloseWindow,
}

/// Content of the hover popover on the progress bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterHover {
    pub title: Option<String>,
    pub time: String,
}

impl ChapterHover {
    /// Hover at `x` over a scale `width` wide showing `duration` seconds.
    pub fn at(x: f64, width: f64, duration: f64, chapters: &[Chapter]) -> Option<Self> {
        if width <= 0.0 || duration <= 0.0 {
            return None;
        }

        let hover_time = (x / width).clamp(0.0, 1.0) * duration;
        let title = chapters
            .iter()
            .take_while(|c| c.time <= hover_time)
            .last()
            .map(|c| c.title.clone().unwrap_or_else(|| "Chapter".to_string()));

        Some(Self {
            title,
            time: format_time(hover_time),
        })
    }
}

/// Scale the video size down into the default window box, keeping aspect.
pub fn fit_window_size(width: i64, height: i64) -> Option<(i32, i32)> {
    if width <= 0 || height <= 0 {
        return None;
    }

    let aspect = width as f64 / height as f64;
    let (mut w, mut h) = (width as f64, height as f64);

    if w > DEFAULT_WIDTH as f64 {
        w = DEFAULT_WIDTH as f64;
        h = (w / aspect).trunc();
    }
    if h > DEFAULT_HEIGHT as f64 {
        h = DEFAULT_HEIGHT as f64;
        w = (h * aspect).trunc();
    }

    Some((w as i32, h as i32))
}

/// Header decorations while fullscreen: only the close button, on the
/// side the user's layout puts it.
pub fn fullscreen_decoration_layout(layout: &str) -> &'static str {
    let left = layout.split(':').next().unwrap_or("");
    if left.contains("close") { "close:" } else { ":close" }
}
