use tracing::debug;

use super::traits::PlaybackEngine;
use super::types::{Chapter, Track, TrackKind};

/// Read every entry of `track-list` through its sub-properties.
///
/// Entries whose type is not audio, video or sub are skipped, as are
/// entries that vanish while being read.
pub fn read_tracks(engine: &dyn PlaybackEngine, count: i64) -> Vec<Track> {
    let mut tracks = Vec::with_capacity(count.max(0) as usize);

    for i in 0..count.max(0) {
        let prefix = format!("track-list/{}", i);
        let Some(kind) = engine
            .get_string(&format!("{}/type", prefix))
            .and_then(|t| TrackKind::from_engine(&t))
        else {
            continue;
        };
        let Some(id) = engine.get_i64(&format!("{}/id", prefix)) else {
            debug!("Track {} disappeared while reading", i);
            continue;
        };

        tracks.push(Track {
            id,
            kind,
            lang: engine.get_string(&format!("{}/lang", prefix)),
            title: engine.get_string(&format!("{}/title", prefix)),
            album_art: engine
                .get_bool(&format!("{}/albumart", prefix))
                .unwrap_or(false),
        });
    }

    tracks
}

/// Read `chapter-list`, sorted by start time.
pub fn read_chapters(engine: &dyn PlaybackEngine, count: i64) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = (0..count.max(0))
        .filter_map(|i| {
            let time = engine.get_f64(&format!("chapter-list/{}/time", i))?;
            let title = engine
                .get_string(&format!("chapter-list/{}/title", i))
                .filter(|t| !t.is_empty());
            Some(Chapter { time, title })
        })
        .collect();

    chapters.sort_by(|a, b| a.time.total_cmp(&b.time));
    chapters
}

/// Video tracks that are real video, not embedded cover art.
pub fn real_video_count(tracks: &[Track]) -> usize {
    tracks
        .iter()
        .filter(|t| t.kind == TrackKind::Video && !t.album_art)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeEngine;

    #[test]
    fn reads_tracks_of_every_kind() {
        let engine = FakeEngine::new()
            .with_track(0, "video", 1, None, None, false)
            .with_track(1, "audio", 1, Some("eng"), Some("Stereo"), false)
            .with_track(2, "sub", 1, Some("por"), None, false)
            .with_track(3, "video", 2, None, Some("cover"), true);

        let tracks = read_tracks(&engine, 4);

        assert_eq!(tracks.len(), 4);
        assert_eq!(tracks[1].kind, TrackKind::Audio);
        assert_eq!(tracks[1].label(), "Stereo – eng");
        assert_eq!(tracks[2].kind, TrackKind::Subtitle);
        assert_eq!(real_video_count(&tracks), 1);
    }

    #[test]
    fn chapters_are_sorted_and_untitled_ones_kept() {
        let engine = FakeEngine::new()
            .with_chapter(0, 300.0, Some("Middle"))
            .with_chapter(1, 0.0, Some("Intro"))
            .with_chapter(2, 600.0, None);

        let chapters = read_chapters(&engine, 3);

        let times: Vec<f64> = chapters.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![0.0, 300.0, 600.0]);
        assert_eq!(chapters[2].title, None);
    }

    #[test]
    fn missing_entries_are_skipped() {
        let engine = FakeEngine::new().with_track(0, "audio", 1, None, None, false);

        assert_eq!(read_tracks(&engine, 3).len(), 1);
        assert!(read_chapters(&engine, 2).is_empty());
    }
}
