use super::types::PropertyFormat;

/// Engine properties the window observes.
///
/// Track and chapter lists are observed without a value; the pump re-reads
/// their entries through sub-properties whenever either one changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerProperty {
    Path,
    PlaylistCount,
    PlaylistPos,
    LoopPlaylist,
    LoopFile,
    Fullscreen,
    TimePos,
    Duration,
    Volume,
    Mute,
    Sid,
    Aid,
    Vid,
    TrackList,
    ChapterList,
    Pause,
    EofReached,
    IdleActive,
    MediaTitle,
    VolumeMax,
    VideoRotate,
    AspectOverride,
    HwdecCurrent,
    VideoZoom,
    Contrast,
    Brightness,
    Gamma,
    Saturation,
    SubDelay,
    AudioDelay,
    Speed,
}

impl PlayerProperty {
    pub const ALL: [PlayerProperty; 31] = [
        PlayerProperty::Path,
        PlayerProperty::PlaylistCount,
        PlayerProperty::PlaylistPos,
        PlayerProperty::LoopPlaylist,
        PlayerProperty::LoopFile,
        PlayerProperty::Fullscreen,
        PlayerProperty::TimePos,
        PlayerProperty::Duration,
        PlayerProperty::Volume,
        PlayerProperty::Mute,
        PlayerProperty::Sid,
        PlayerProperty::Aid,
        PlayerProperty::Vid,
        PlayerProperty::TrackList,
        PlayerProperty::ChapterList,
        PlayerProperty::Pause,
        PlayerProperty::EofReached,
        PlayerProperty::IdleActive,
        PlayerProperty::MediaTitle,
        PlayerProperty::VolumeMax,
        PlayerProperty::VideoRotate,
        PlayerProperty::AspectOverride,
        PlayerProperty::HwdecCurrent,
        PlayerProperty::VideoZoom,
        PlayerProperty::Contrast,
        PlayerProperty::Brightness,
        PlayerProperty::Gamma,
        PlayerProperty::Saturation,
        PlayerProperty::SubDelay,
        PlayerProperty::AudioDelay,
        PlayerProperty::Speed,
    ];

    /// Name of the property in the engine
    pub fn name(self) -> &'static str {
        match self {
            PlayerProperty::Path => "path",
            PlayerProperty::PlaylistCount => "playlist-count",
            PlayerProperty::PlaylistPos => "playlist-pos",
            PlayerProperty::LoopPlaylist => "loop-playlist",
            PlayerProperty::LoopFile => "loop-file",
            PlayerProperty::Fullscreen => "fullscreen",
            PlayerProperty::TimePos => "time-pos",
            PlayerProperty::Duration => "duration",
            PlayerProperty::Volume => "volume",
            PlayerProperty::Mute => "mute",
            PlayerProperty::Sid => "sid",
            PlayerProperty::Aid => "aid",
            PlayerProperty::Vid => "vid",
            PlayerProperty::TrackList => "track-list",
            PlayerProperty::ChapterList => "chapter-list",
            PlayerProperty::Pause => "pause",
            PlayerProperty::EofReached => "eof-reached",
            PlayerProperty::IdleActive => "idle-active",
            PlayerProperty::MediaTitle => "media-title",
            PlayerProperty::VolumeMax => "volume-max",
            PlayerProperty::VideoRotate => "video-rotate",
            PlayerProperty::AspectOverride => "video-aspect-override",
            PlayerProperty::HwdecCurrent => "hwdec-current",
            PlayerProperty::VideoZoom => "video-zoom",
            PlayerProperty::Contrast => "contrast",
            PlayerProperty::Brightness => "brightness",
            PlayerProperty::Gamma => "gamma",
            PlayerProperty::Saturation => "saturation",
            PlayerProperty::SubDelay => "sub-delay",
            PlayerProperty::AudioDelay => "audio-delay",
            PlayerProperty::Speed => "speed",
        }
    }

    /// Format the property is observed in
    pub fn format(self) -> PropertyFormat {
        match self {
            PlayerProperty::Path | PlayerProperty::MediaTitle | PlayerProperty::HwdecCurrent => {
                PropertyFormat::Str
            }
            // "inf", "no" or a repeat count
            PlayerProperty::LoopPlaylist | PlayerProperty::LoopFile => PropertyFormat::Str,
            // "no", "auto" or an id
            PlayerProperty::Sid | PlayerProperty::Aid | PlayerProperty::Vid => {
                PropertyFormat::Str
            }
            PlayerProperty::PlaylistCount
            | PlayerProperty::PlaylistPos
            | PlayerProperty::VideoRotate => PropertyFormat::Int,
            PlayerProperty::TrackList | PlayerProperty::ChapterList => PropertyFormat::None,
            // The equalizer values are integers; the engine converts them
            PlayerProperty::TimePos
            | PlayerProperty::Duration
            | PlayerProperty::Volume
            | PlayerProperty::VolumeMax
            | PlayerProperty::AspectOverride
            | PlayerProperty::VideoZoom
            | PlayerProperty::Contrast
            | PlayerProperty::Brightness
            | PlayerProperty::Gamma
            | PlayerProperty::Saturation
            | PlayerProperty::SubDelay
            | PlayerProperty::AudioDelay
            | PlayerProperty::Speed => PropertyFormat::Double,
            PlayerProperty::Fullscreen
            | PlayerProperty::Mute
            | PlayerProperty::Pause
            | PlayerProperty::EofReached
            | PlayerProperty::IdleActive => PropertyFormat::Flag,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Stable id used as the engine's reply userdata
    pub fn id(self) -> u64 {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0) as u64 + 1
    }

    pub fn from_id(id: u64) -> Option<Self> {
        id.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize))
            .copied()
    }
}
