use std::time::Instant;

use crate::core::adjustments::{AdjustStep, Adjustment, Flip, Rotation};
use crate::core::aspect::AspectRatio;
use crate::core::keys::{Modifiers, MouseButton};
use crate::core::open::{DroppedFile, OpenMode};
use crate::player::types::TrackKind;

/// Everything the window can ask the controller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    TogglePause,
    Previous,
    Next,
    SetMute(bool),
    /// Volume slider moved
    SetVolume(f64),
    /// Progress slider moved
    SeekTo(f64),
    /// Scroll over the progress bar
    SeekScroll {
        dy: f64,
        smooth: bool,
        natural: bool,
        at: Instant,
    },
    /// Scroll over the volume button
    VolumeScroll { dy: f64, smooth: bool, natural: bool },
    SetShuffle(bool),
    SetLoopPlaylist(bool),
    SetLoopFile(bool),
    ToggleFullscreen,
    /// The toplevel entered or left fullscreen on its own
    FullscreenChanged(bool),
    SelectTrack { kind: TrackKind, id: i64 },
    Adjust(Adjustment, AdjustStep),
    Rotate(Rotation),
    SetAspect(AspectRatio),
    CycleAspect,
    Flip(Flip),
    ResetAllOptions,
    Open { mode: OpenMode, paths: Vec<String> },
    OpenFolder(String),
    Drop(Vec<DroppedFile>),
    /// A key that is not an application accelerator
    Key { name: String, mods: Modifiers },
    MousePress { button: MouseButton, n_press: i32 },
    MouseRelease(MouseButton),
    Wheel { dx: f64, dy: f64, natural: bool },
    PointerMoved { x: f64, y: f64 },
    /// A popover closed; restart the hide countdown
    RearmHide,
    /// A file dialog failed for a reason other than being dismissed
    DialogFailed(String),
}
