use crate::player::types::EngineOp;

/// Playlist navigation affordances derived from the mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavState {
    pub can_go_previous: bool,
    pub can_go_next: bool,
    /// Shuffle and loop-playlist toggles only make sense with a playlist
    pub toggles_visible: bool,
}

impl NavState {
    pub fn compute(count: i64, pos: i64, loop_playlist: bool, shuffle: bool) -> Self {
        let has_multiple = count > 1;
        let always = has_multiple && (loop_playlist || shuffle);

        Self {
            can_go_previous: always || (has_multiple && pos > 0),
            can_go_next: always || (has_multiple && pos < count - 1),
            toggles_visible: has_multiple,
        }
    }
}

/// Previous wraps to the last entry from the first one.
pub fn previous_op(pos: i64, count: i64) -> EngineOp {
    if pos <= 0 && count > 0 {
        EngineOp::set("playlist-pos", count - 1)
    } else {
        EngineOp::bare("playlist-prev")
    }
}

/// Next wraps to the first entry from the last one.
pub fn next_op(pos: i64, count: i64) -> EngineOp {
    if count > 0 && pos >= count - 1 {
        EngineOp::set("playlist-pos", 0i64)
    } else {
        EngineOp::bare("playlist-next")
    }
}

pub fn shuffle_op(enabled: bool) -> EngineOp {
    if enabled {
        EngineOp::bare("playlist-shuffle")
    } else {
        EngineOp::bare("playlist-unshuffle")
    }
}
