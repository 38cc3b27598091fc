// Window, timing and engine constants shared by the controller and the UI.

use std::path::PathBuf;
use std::time::Duration;

pub const APP_ID: &str = "dev.arsfeld.Cine";
pub const APP_NAME: &str = "Cine";

// === Window ===
pub const DEFAULT_WIDTH: i32 = 1088;
pub const DEFAULT_HEIGHT: i32 = 612;

// === Auto-hide ===
pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(2);
/// Longer delay after Tab so keyboard users can reach the controls
pub const CONTROLS_HIDE_DELAY_KEYBOARD: Duration = Duration::from_secs(3);

// === Transient feedback ===
pub const PAUSE_INDICATOR_FLASH: Duration = Duration::from_millis(350);
pub const DROP_INDICATOR_DELAY: Duration = Duration::from_millis(10);
pub const DROP_INDICATOR_RESET_DELAY: Duration = Duration::from_millis(100);

// === Engine event marshaling ===
pub const EVENT_QUEUE_CAPACITY: usize = 256;
pub const EVENT_DRAIN_INTERVAL: Duration = Duration::from_millis(16);
pub const EVENT_DRAIN_BATCH: usize = 64;
/// How long the pump thread blocks in the engine before checking for teardown
pub const EVENT_WAIT_TIMEOUT_SECS: f64 = 0.5;
pub const SETTINGS_CHANNEL_CAPACITY: usize = 32;

// === Input ===
pub const SEEK_SCROLL_THROTTLE: Duration = Duration::from_millis(30);
pub const DEFAULT_SEEK_SCROLL_STEP: f64 = 10.0;
pub const DEFAULT_VOLUME_SCROLL_STEP: f64 = 5.0;
pub const VOLUME_MAX: f64 = 150.0;

// === Subtitles ===
pub const SUB_EXTS: &[&str] = &[
    ".srt", ".ass", ".ssa", ".vtt", ".sub", ".idx", ".sup", ".smi", ".lrc", ".ttml", ".dfxp",
    ".mks",
];
pub const SUB_FILE_PATHS: &str = "sub:subs:subtitles:Sub:Subs:Subtitles:srt:srts:Srt:Srts";
pub const DEFAULT_SUB_COLOR: &str = "#ebebeb";
pub const DEFAULT_SUB_FONT: &str = "Adwaita Sans SemiBold";

// === Filters ===
pub const LOUDNORM_LABEL: &str = "@cine_loudnorm";
pub const LOUDNORM_FILTER: &str = "@cine_loudnorm:lavfi=[loudnorm=I=-20]";
pub const HFLIP_FILTER: &str = "@hflip:hflip";
pub const VFLIP_FILTER: &str = "@vflip:vflip";
pub const HFLIP_LABEL: &str = "@hflip";
pub const VFLIP_LABEL: &str = "@vflip";

pub const SCREENSHOT_TEMPLATE: &str = "cine_%n";

/// Key bindings loaded into the engine before the user's input.conf
pub const INTERNAL_BINDINGS: &str = "\
SPACE cycle pause
p cycle pause
MBTN_RIGHT cycle pause
MBTN_LEFT_DBL cycle fullscreen
f cycle fullscreen
ENTER cycle fullscreen
ESC set fullscreen no
RIGHT seek 5
LEFT seek -5
UP seek 60
DOWN seek -60
WHEEL_UP add volume 5
WHEEL_DOWN add volume -5
WHEEL_LEFT seek -5
WHEEL_RIGHT seek 5
m cycle mute
9 add volume -5
0 add volume 5
MBTN_BACK playlist-prev
MBTN_FORWARD playlist-next
< playlist-prev
> playlist-next
j cycle sub
J cycle sub down
v cycle sub-visibility
SHARP cycle audio
_ cycle video
[ multiply speed 1/1.1
] multiply speed 1.1
BS set speed 1.0
. frame-step
, frame-back-step
s screenshot
S screenshot video
i script-binding stats/display-stats
I script-binding stats/display-stats-toggle
";

/// `$XDG_CONFIG_HOME/cine`, also handed to the engine as its config dir
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cine")
}

/// Optional user key bindings
pub fn input_conf_path() -> PathBuf {
    config_dir().join("input.conf")
}

pub fn screenshot_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Screenshots")
}
