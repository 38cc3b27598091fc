use cine::core::open::DroppedFile;
use cine::player::types::{Chapter, Track, TrackKind};

pub fn dropped(name: &str, content_type: &str) -> DroppedFile {
    DroppedFile {
        location: format!("/media/{}", name),
        name: name.to_string(),
        is_dir: false,
        content_type: content_type.to_string(),
    }
}

pub fn dropped_dir(name: &str) -> DroppedFile {
    DroppedFile {
        location: format!("/media/{}", name),
        name: name.to_string(),
        is_dir: true,
        content_type: "inode/directory".to_string(),
    }
}

pub fn track(id: i64, kind: TrackKind, lang: Option<&str>, album_art: bool) -> Track {
    Track {
        id,
        kind,
        lang: lang.map(str::to_string),
        title: None,
        album_art,
    }
}

/// A movie with one video stream, two audio tracks and a subtitle.
pub fn movie_tracks() -> Vec<Track> {
    vec![
        track(1, TrackKind::Video, None, false),
        track(1, TrackKind::Audio, Some("eng"), false),
        track(2, TrackKind::Audio, Some("jpn"), false),
        track(1, TrackKind::Subtitle, Some("eng"), false),
    ]
}

pub fn chapters() -> Vec<Chapter> {
    vec![
        Chapter {
            time: 0.0,
            title: Some("Opening".to_string()),
        },
        Chapter {
            time: 600.0,
            title: Some("Middle".to_string()),
        },
        Chapter {
            time: 1200.0,
            title: None,
        },
    ]
}
