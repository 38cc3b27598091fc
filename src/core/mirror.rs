use crate::constants::VOLUME_MAX;
use crate::core::adjustments::{Adjustment, AdjustmentValues};
use crate::player::types::{Chapter, PropertyValue, Track};
use crate::player::PlayerProperty;

/// Last known engine state, written only from engine notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackMirror {
    pub path: Option<String>,
    pub paused: bool,
    pub idle_active: bool,
    pub volume: f64,
    pub muted: bool,
    pub loop_file: bool,
    pub loop_playlist: bool,
    pub playlist_pos: i64,
    pub playlist_count: i64,
    pub media_title: Option<String>,
    pub tracks: Vec<Track>,
    pub chapters: Vec<Chapter>,
    pub duration: f64,
    pub time_pos: f64,
    pub fullscreen: bool,
    pub sid: i64,
    pub aid: i64,
    pub vid: i64,
    pub eof_reached: bool,
    pub volume_max: f64,
    pub video_rotate: i64,
    /// `-1` when no override is set
    pub aspect_override: f64,
    pub hwdec_current: String,
    pub adjustments: AdjustmentValues,
}

impl Default for PlaybackMirror {
    fn default() -> Self {
        Self {
            path: None,
            // A fresh engine is idle with nothing loaded
            paused: false,
            idle_active: true,
            volume: 0.0,
            muted: false,
            loop_file: false,
            loop_playlist: false,
            playlist_pos: 0,
            playlist_count: 0,
            media_title: None,
            tracks: Vec::new(),
            chapters: Vec::new(),
            duration: 0.0,
            time_pos: 0.0,
            fullscreen: false,
            sid: 0,
            aid: 0,
            vid: 0,
            eof_reached: false,
            volume_max: VOLUME_MAX,
            video_rotate: 0,
            aspect_override: -1.0,
            hwdec_current: String::new(),
            adjustments: AdjustmentValues::default(),
        }
    }
}

/// `loop-file`/`loop-playlist`: "inf" or a count is on, "no" or unset is off.
pub fn loop_enabled(value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Str(s) => s != "no" && s != "false",
        PropertyValue::Flag(b) => *b,
        PropertyValue::Int(n) => *n > 0,
        _ => false,
    }
}

/// Track selection: an id, or 0 for "no"/"auto"/unset.
pub fn track_id(value: &PropertyValue) -> i64 {
    value.as_i64().filter(|id| *id > 0).unwrap_or(0)
}

fn text(value: &PropertyValue) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

impl PlaybackMirror {
    /// Store a notification. Returns false when nothing changed.
    pub fn apply(&mut self, property: PlayerProperty, value: &PropertyValue) -> bool {
        let before = self.clone();

        match property {
            PlayerProperty::Path => self.path = text(value),
            PlayerProperty::PlaylistCount => self.playlist_count = value.as_i64().unwrap_or(0),
            PlayerProperty::PlaylistPos => self.playlist_pos = value.as_i64().unwrap_or(0).max(0),
            PlayerProperty::LoopPlaylist => self.loop_playlist = loop_enabled(value),
            PlayerProperty::LoopFile => self.loop_file = loop_enabled(value),
            PlayerProperty::Fullscreen => self.fullscreen = value.as_bool().unwrap_or(false),
            PlayerProperty::TimePos => self.time_pos = value.as_f64().unwrap_or(0.0),
            PlayerProperty::Duration => self.duration = value.as_f64().unwrap_or(0.0),
            PlayerProperty::Volume => self.volume = value.as_f64().unwrap_or(0.0),
            PlayerProperty::Mute => self.muted = value.as_bool().unwrap_or(false),
            PlayerProperty::Sid => self.sid = track_id(value),
            PlayerProperty::Aid => self.aid = track_id(value),
            PlayerProperty::Vid => self.vid = track_id(value),
            // The lists themselves arrive as separate events
            PlayerProperty::TrackList | PlayerProperty::ChapterList => {}
            PlayerProperty::Pause => self.paused = value.as_bool().unwrap_or(false),
            PlayerProperty::EofReached => self.eof_reached = value.as_bool().unwrap_or(false),
            PlayerProperty::IdleActive => self.idle_active = value.as_bool().unwrap_or(false),
            PlayerProperty::MediaTitle => self.media_title = text(value),
            PlayerProperty::VolumeMax => {
                self.volume_max = value.as_f64().unwrap_or(VOLUME_MAX)
            }
            PlayerProperty::VideoRotate => self.video_rotate = value.as_i64().unwrap_or(0),
            PlayerProperty::AspectOverride => {
                self.aspect_override = value.as_f64().unwrap_or(-1.0)
            }
            PlayerProperty::HwdecCurrent => {
                self.hwdec_current = value.as_str().unwrap_or_default().to_string()
            }
            PlayerProperty::VideoZoom
            | PlayerProperty::Contrast
            | PlayerProperty::Brightness
            | PlayerProperty::Gamma
            | PlayerProperty::Saturation
            | PlayerProperty::SubDelay
            | PlayerProperty::AudioDelay
            | PlayerProperty::Speed => {
                if let Some(adjustment) = Adjustment::from_property(property.name()) {
                    let value = value.as_f64().unwrap_or(adjustment.default_value());
                    self.adjustments.set(adjustment, adjustment.round(value));
                }
            }
        }

        *self != before
    }

    /// Whether writing `value` to `property` would leave the engine as mirrored.
    ///
    /// Properties the mirror does not track never match.
    pub fn matches(&self, property: &str, value: &PropertyValue) -> bool {
        let Some(property) = PlayerProperty::from_name(property) else {
            return false;
        };

        match property {
            PlayerProperty::Pause => value.as_bool() == Some(self.paused),
            PlayerProperty::Mute => value.as_bool() == Some(self.muted),
            PlayerProperty::Fullscreen => value.as_bool() == Some(self.fullscreen),
            PlayerProperty::Volume => value.as_f64() == Some(self.volume),
            PlayerProperty::TimePos => value.as_f64() == Some(self.time_pos),
            PlayerProperty::PlaylistPos => value.as_i64() == Some(self.playlist_pos),
            PlayerProperty::LoopFile => loop_enabled(value) == self.loop_file,
            PlayerProperty::LoopPlaylist => loop_enabled(value) == self.loop_playlist,
            PlayerProperty::Sid => track_id(value) == self.sid,
            PlayerProperty::Aid => track_id(value) == self.aid,
            PlayerProperty::Vid => track_id(value) == self.vid,
            _ => match Adjustment::from_property(property.name()) {
                Some(adjustment) => {
                    value.as_f64().map(|v| adjustment.round(v))
                        == Some(self.adjustments.get(adjustment))
                }
                None => false,
            },
        }
    }

    pub fn is_playing(&self) -> bool {
        !self.idle_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_coerce_to_defaults() {
        let mut mirror = PlaybackMirror {
            time_pos: 12.0,
            duration: 60.0,
            volume: 80.0,
            sid: 2,
            loop_file: true,
            ..Default::default()
        };

        mirror.apply(PlayerProperty::TimePos, &PropertyValue::None);
        mirror.apply(PlayerProperty::Duration, &PropertyValue::None);
        mirror.apply(PlayerProperty::Volume, &PropertyValue::None);
        mirror.apply(PlayerProperty::Sid, &PropertyValue::from("no"));
        mirror.apply(PlayerProperty::LoopFile, &PropertyValue::from("no"));

        assert_eq!(mirror.time_pos, 0.0);
        assert_eq!(mirror.duration, 0.0);
        assert_eq!(mirror.volume, 0.0);
        assert_eq!(mirror.sid, 0);
        assert!(!mirror.loop_file);
    }

    #[test]
    fn loop_values_follow_engine_strings() {
        assert!(loop_enabled(&PropertyValue::from("inf")));
        assert!(loop_enabled(&PropertyValue::from("3")));
        assert!(!loop_enabled(&PropertyValue::from("no")));
        assert!(!loop_enabled(&PropertyValue::None));
    }

    #[test]
    fn apply_reports_changes() {
        let mut mirror = PlaybackMirror::default();
        assert!(mirror.apply(PlayerProperty::Pause, &PropertyValue::Flag(true)));
        assert!(!mirror.apply(PlayerProperty::Pause, &PropertyValue::Flag(true)));
    }

    #[test]
    fn matches_compares_against_mirrored_values() {
        let mut mirror = PlaybackMirror::default();
        mirror.apply(PlayerProperty::Volume, &PropertyValue::Double(55.0));
        mirror.apply(PlayerProperty::Aid, &PropertyValue::from("2"));

        assert!(mirror.matches("volume", &PropertyValue::Double(55.0)));
        assert!(!mirror.matches("volume", &PropertyValue::Double(56.0)));
        assert!(mirror.matches("aid", &PropertyValue::Int(2)));
        assert!(mirror.matches("sid", &PropertyValue::from("no")));
        assert!(mirror.matches("speed", &PropertyValue::Double(1.0)));
        assert!(!mirror.matches("speed", &PropertyValue::Double(1.05)));
        assert!(!mirror.matches("sub-pos", &PropertyValue::Int(100)));
    }

    #[test]
    fn option_values_follow_notifications() {
        let mut mirror = PlaybackMirror::default();
        assert_eq!(mirror.adjustments.get(Adjustment::Speed), 1.0);
        assert_eq!(mirror.aspect_override, -1.0);

        mirror.apply(PlayerProperty::Speed, &PropertyValue::Double(1.5));
        mirror.apply(PlayerProperty::Contrast, &PropertyValue::Int(-4));
        mirror.apply(PlayerProperty::VideoRotate, &PropertyValue::Int(90));
        mirror.apply(PlayerProperty::HwdecCurrent, &PropertyValue::from("vaapi-copy"));

        assert_eq!(mirror.adjustments.get(Adjustment::Speed), 1.5);
        assert_eq!(mirror.adjustments.get(Adjustment::Contrast), -4.0);
        assert_eq!(mirror.video_rotate, 90);
        assert_eq!(mirror.hwdec_current, "vaapi-copy");

        mirror.apply(PlayerProperty::Speed, &PropertyValue::None);
        assert_eq!(mirror.adjustments.get(Adjustment::Speed), 1.0);
    }
}
