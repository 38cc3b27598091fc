/// Format seconds as `H:MM:SS` or `M:SS`.
pub fn format_time(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Width of the elapsed-time label so it does not jitter while playing.
pub fn elapsed_width_chars(duration: f64) -> i32 {
    if duration >= 86400.0 {
        10
    } else if duration >= 3600.0 {
        7
    } else if duration >= 600.0 {
        6
    } else {
        5
    }
}

pub fn volume_icon(volume: f64, muted: bool) -> &'static str {
    if muted || volume <= 0.0 {
        "audio-volume-muted-symbolic"
    } else if volume < 33.0 {
        "audio-volume-low-symbolic"
    } else if volume < 66.0 {
        "audio-volume-medium-symbolic"
    } else {
        "audio-volume-high-symbolic"
    }
}

pub fn play_pause_icons(paused: bool) -> (&'static str, &'static str) {
    const PLAY: &str = "media-playback-start-symbolic";
    const PAUSE: &str = "media-playback-pause-symbolic";

    // (button icon, flashed indicator icon)
    if paused { (PLAY, PAUSE) } else { (PAUSE, PLAY) }
}

pub fn fullscreen_icon(fullscreen: bool) -> &'static str {
    if fullscreen {
        "view-restore-symbolic"
    } else {
        "view-fullscreen-symbolic"
    }
}
