mod common;

use cine::config::Config;
use cine::core::adjustments::{AdjustStep, Adjustment, Rotation};
use cine::core::aspect::AspectRatio;
use cine::core::autohide::HideBlockers;
use cine::core::navigation::NavState;
use cine::core::open::OpenMode;
use cine::core::{UserCommand, ViewUpdate};
use cine::events::EngineEvent;
use cine::player::types::{EndFileReason, PropertyValue, TrackKind};
use cine::player::PlayerProperty;
use common::fixtures::{chapters, dropped, dropped_dir, movie_tracks, track};
use common::mocks::MockEngine;
use common::{armed_token, TestContext};

#[test]
fn adjustments_return_to_where_they_started() {
    let mut ctx = TestContext::new();

    for adjustment in Adjustment::ALL {
        let start = adjustment.default_value();
        for _ in 0..7 {
            ctx.perform(UserCommand::Adjust(adjustment, AdjustStep::Increment));
            ctx.echo_writes();
        }
        let mut last = Vec::new();
        for _ in 0..7 {
            last = ctx.perform(UserCommand::Adjust(adjustment, AdjustStep::Decrement));
            ctx.echo_writes();
        }

        assert_eq!(
            last,
            vec![ViewUpdate::AdjustmentValue(adjustment, start)],
            "{} drifted",
            adjustment.label()
        );
        assert_eq!(
            ctx.engine.property(adjustment.property()),
            Some(adjustment.to_property_value(start))
        );
    }
}

#[test]
fn adjustments_start_from_the_observed_value() {
    let mut ctx = TestContext::new();
    ctx.notify(PlayerProperty::Speed, 2.0);

    let updates = ctx.perform(UserCommand::Adjust(Adjustment::Speed, AdjustStep::Increment));

    assert_eq!(updates, vec![ViewUpdate::AdjustmentValue(Adjustment::Speed, 2.05)]);
    assert_eq!(ctx.engine.osd(), vec!["Speed: 2.05"]);
}

#[test]
fn rotation_wraps_at_both_ends() {
    let mut ctx = TestContext::new();
    ctx.notify(PlayerProperty::VideoRotate, 270i64);
    ctx.perform(UserCommand::Rotate(Rotation::Right));
    assert_eq!(ctx.engine.command_lines(), vec!["set video-rotate 0"]);

    ctx.engine.clear();
    ctx.notify(PlayerProperty::VideoRotate, 0i64);
    ctx.perform(UserCommand::Rotate(Rotation::Left));
    assert_eq!(ctx.engine.command_lines(), vec!["set video-rotate 270"]);
}

#[test]
fn pause_toggles_are_left_to_the_engine() {
    let mut ctx = TestContext::new();
    ctx.playing();

    ctx.perform(UserCommand::TogglePause);

    assert_eq!(ctx.engine.command_lines(), vec!["cycle pause"]);
    assert!(ctx.engine.writes().is_empty());
}

#[test]
fn cycling_every_ratio_comes_back_to_original() {
    let mut ctx = TestContext::new();

    let mut seen = Vec::new();
    for _ in 0..AspectRatio::ALL.len() {
        let updates = ctx.perform(UserCommand::CycleAspect);
        match updates.as_slice() {
            [ViewUpdate::AspectSelected(ratio)] => seen.push(*ratio),
            other => panic!("unexpected updates {:?}", other),
        }
    }

    assert_eq!(seen.last(), Some(&AspectRatio::Original));
    assert_eq!(seen[0], AspectRatio::Wide16x9);
    assert_eq!(ctx.engine.osd()[0], "Aspect Ratio: 16:9");
    assert_eq!(
        ctx.engine.command_lines().last().map(String::as_str),
        Some("set video-aspect-override -1")
    );
}

#[test]
fn choosing_a_ratio_moves_the_cycle() {
    let mut ctx = TestContext::new();
    ctx.perform(UserCommand::SetAspect(AspectRatio::Cinema235));

    assert_eq!(
        ctx.perform(UserCommand::CycleAspect),
        vec![ViewUpdate::AspectSelected(AspectRatio::Cinema185)]
    );
}

#[test]
fn single_entry_playlists_cannot_navigate() {
    let mut ctx = TestContext::new();
    let updates = ctx.notify(PlayerProperty::PlaylistCount, 1i64);

    assert_eq!(
        updates,
        vec![ViewUpdate::Navigation(NavState {
            can_go_previous: false,
            can_go_next: false,
            toggles_visible: false,
        })]
    );
}

#[test]
fn shuffle_enables_both_directions() {
    let mut ctx = TestContext::new();
    ctx.playlist(3, 0);
    assert!(!ctx.controller.navigation().can_go_previous);

    let updates = ctx.perform(UserCommand::SetShuffle(true));

    assert_eq!(
        updates,
        vec![ViewUpdate::Navigation(NavState {
            can_go_previous: true,
            can_go_next: true,
            toggles_visible: true,
        })]
    );
    assert_eq!(ctx.engine.command_lines(), vec!["playlist-shuffle"]);
    assert!(ctx.controller.shuffle());
}

#[test]
fn previous_and_next_wrap_around() {
    let mut ctx = TestContext::new();
    ctx.playlist(3, 0);
    ctx.perform(UserCommand::Previous);
    assert_eq!(
        ctx.engine.writes(),
        vec![("playlist-pos".to_string(), PropertyValue::Int(2))]
    );

    ctx.playlist(3, 2);
    ctx.perform(UserCommand::Next);
    assert_eq!(
        ctx.engine.writes(),
        vec![("playlist-pos".to_string(), PropertyValue::Int(0))]
    );

    ctx.playlist(3, 1);
    ctx.perform(UserCommand::Next);
    ctx.perform(UserCommand::Previous);
    assert_eq!(ctx.engine.command_lines(), vec!["playlist-next", "playlist-prev"]);
}

#[test]
fn mirrored_values_are_never_written_back() {
    let mut ctx = TestContext::new();
    ctx.notify(PlayerProperty::Fullscreen, true);
    ctx.notify(PlayerProperty::Sid, 2i64);
    ctx.notify(PlayerProperty::Volume, 70.0);
    ctx.notify(PlayerProperty::TimePos, 12.5);
    ctx.engine.clear();

    ctx.perform(UserCommand::FullscreenChanged(true));
    ctx.perform(UserCommand::SelectTrack {
        kind: TrackKind::Subtitle,
        id: 2,
    });
    ctx.perform(UserCommand::SetVolume(70.0));
    ctx.perform(UserCommand::SeekTo(12.5));

    assert!(ctx.engine.writes().is_empty());
    // Visibility is a command, not a mirrored property
    assert_eq!(ctx.engine.command_lines(), vec!["set sub-visibility yes"]);
}

#[test]
fn selecting_no_track_writes_no() {
    let mut ctx = TestContext::new();
    ctx.notify(PlayerProperty::Aid, 1i64);
    ctx.engine.clear();

    let updates = ctx.perform(UserCommand::SelectTrack {
        kind: TrackKind::Audio,
        id: 0,
    });

    assert_eq!(
        ctx.engine.writes(),
        vec![("aid".to_string(), PropertyValue::from("no"))]
    );
    assert_eq!(
        updates,
        vec![ViewUpdate::TrackSelected {
            kind: TrackKind::Audio,
            id: 0
        }]
    );
}

#[test]
fn loop_modes_exclude_each_other() {
    let mut ctx = TestContext::new();
    ctx.notify(PlayerProperty::LoopPlaylist, "inf");
    ctx.engine.clear();

    let updates = ctx.perform(UserCommand::SetLoopFile(true));

    assert_eq!(
        ctx.engine.writes(),
        vec![
            ("loop-file".to_string(), PropertyValue::from("inf")),
            ("loop-playlist".to_string(), PropertyValue::from("no")),
        ]
    );
    assert_eq!(updates, vec![ViewUpdate::LoopPlaylistActive(false)]);
}

#[test]
fn hide_timer_hides_once_and_motion_rearms() {
    let mut ctx = TestContext::new();
    ctx.playing();

    let token = armed_token(&ctx.perform(UserCommand::PointerMoved { x: 10.0, y: 10.0 }))
        .expect("motion arms the timer");

    assert_eq!(
        ctx.controller.hide_timeout(token, HideBlockers::default()),
        vec![ViewUpdate::HideChrome { hide_cursor: false }]
    );
    assert!(ctx.controller.hide_timeout(token, HideBlockers::default()).is_empty());

    let updates = ctx.perform(UserCommand::PointerMoved { x: 12.0, y: 10.0 });
    assert_eq!(updates[0], ViewUpdate::ShowChrome);
    let rearmed = armed_token(&updates).expect("motion re-arms the timer");
    assert_ne!(rearmed, token);
}

#[test]
fn open_popover_keeps_the_chrome() {
    let mut ctx = TestContext::new();
    ctx.playing();

    let token = armed_token(&ctx.perform(UserCommand::RearmHide)).expect("armed");
    let blockers = HideBlockers {
        popover_open: true,
        ..HideBlockers::default()
    };

    assert!(ctx.controller.hide_timeout(token, blockers).is_empty());
}

#[test]
fn fullscreen_hides_the_cursor_unless_a_dialog_is_open() {
    let mut ctx = TestContext::new();
    ctx.playing();
    ctx.notify(PlayerProperty::Fullscreen, true);

    let token = armed_token(&ctx.perform(UserCommand::RearmHide)).expect("armed");
    assert_eq!(
        ctx.controller.hide_timeout(token, HideBlockers::default()),
        vec![ViewUpdate::HideChrome { hide_cursor: true }]
    );

    let token = armed_token(&ctx.perform(UserCommand::RearmHide)).expect("armed");
    let blockers = HideBlockers {
        dialogs_open: true,
        ..HideBlockers::default()
    };
    assert_eq!(
        ctx.controller.hide_timeout(token, blockers),
        vec![ViewUpdate::HideChrome { hide_cursor: false }]
    );
}

#[test]
fn drop_while_idle_appends_media_and_resumes() {
    let mut ctx = TestContext::new();
    ctx.notify(PlayerProperty::Pause, true);
    ctx.engine.clear();

    ctx.perform(UserCommand::Drop(vec![
        dropped("movie.mkv", "video/x-matroska"),
        dropped("movie.srt", "application/x-subrip"),
        dropped("notes.txt", "text/plain"),
        dropped_dir("Season 1"),
    ]));

    assert_eq!(
        ctx.engine.command_lines(),
        vec![
            "loadfile /media/movie.mkv append-play",
            "loadfile /media/Season 1 append-play",
        ]
    );
    assert_eq!(
        ctx.engine.writes(),
        vec![("pause".to_string(), PropertyValue::Flag(false))]
    );
}

#[test]
fn subtitle_drop_while_playing_adds_a_track() {
    let mut ctx = TestContext::new();
    ctx.playing();
    ctx.playlist(1, 0);

    ctx.perform(UserCommand::Drop(vec![dropped("movie.ass", "text/x-ssa")]));

    assert_eq!(ctx.engine.command_lines(), vec!["sub-add /media/movie.ass select"]);
    assert!(ctx.engine.writes().is_empty());
}

#[test]
fn opening_files_replaces_the_playlist_and_keeps_shuffle() {
    let mut ctx = TestContext::new();
    ctx.perform(UserCommand::SetShuffle(true));
    ctx.engine.clear();

    ctx.perform(UserCommand::Open {
        mode: OpenMode::ClearAndAdd,
        paths: vec!["/media/a.mkv".to_string(), "/media/b.mkv".to_string()],
    });

    let commands = ctx.engine.command_lines();
    assert_eq!(commands.last().map(String::as_str), Some("playlist-shuffle"));
    assert!(commands.iter().any(|c| c.starts_with("loadfile /media/a.mkv")));
}

#[test]
fn empty_open_does_nothing() {
    let mut ctx = TestContext::new();
    let updates = ctx.perform(UserCommand::Open {
        mode: OpenMode::ClearAndAdd,
        paths: Vec::new(),
    });

    assert!(updates.is_empty());
    assert!(ctx.engine.recorded().is_empty());
}

#[test]
fn file_errors_toast_and_stop() {
    let mut ctx = TestContext::new();
    ctx.playing();

    let updates = ctx.controller.handle_event(EngineEvent::EndFile(EndFileReason::Error(
        "unrecognized file format".to_string(),
    )));

    assert!(updates.contains(&ViewUpdate::Spinner(false)));
    assert!(updates.contains(&ViewUpdate::Toast(
        "File Error: unrecognized file format".to_string()
    )));
    assert_eq!(ctx.engine.command_lines(), vec!["stop"]);
}

#[test]
fn normal_end_of_file_is_quiet() {
    let mut ctx = TestContext::new();
    let updates = ctx.controller.handle_event(EngineEvent::EndFile(EndFileReason::Eof));

    assert_eq!(updates, vec![ViewUpdate::Spinner(false)]);
    assert!(ctx.engine.recorded().is_empty());
}

#[test]
fn video_menu_needs_a_real_alternative() {
    let mut ctx = TestContext::new();

    let updates = ctx.controller.handle_event(EngineEvent::TracksChanged(movie_tracks()));
    assert!(matches!(
        updates.as_slice(),
        [ViewUpdate::TrackMenus { show_video_menu: false, .. }]
    ));

    let mut tracks = movie_tracks();
    tracks.push(track(2, TrackKind::Video, None, true));
    let updates = ctx.controller.handle_event(EngineEvent::TracksChanged(tracks.clone()));
    assert!(matches!(
        updates.as_slice(),
        [ViewUpdate::TrackMenus { show_video_menu: false, .. }]
    ));

    tracks.push(track(3, TrackKind::Video, Some("eng"), false));
    let updates = ctx.controller.handle_event(EngineEvent::TracksChanged(tracks));
    assert!(matches!(
        updates.as_slice(),
        [ViewUpdate::TrackMenus { show_video_menu: true, .. }]
    ));
}

#[test]
fn hovering_the_progress_bar_names_the_chapter() {
    let mut ctx = TestContext::new();
    ctx.notify(PlayerProperty::Duration, 1800.0);
    ctx.controller.handle_event(EngineEvent::ChaptersChanged(chapters()));

    let hover = ctx.controller.chapter_hover(50.0, 100.0).expect("hover");
    assert_eq!(hover.title.as_deref(), Some("Middle"));
    assert_eq!(hover.time, "15:00");

    let hover = ctx.controller.chapter_hover(100.0, 100.0).expect("hover");
    assert_eq!(hover.title.as_deref(), Some("Chapter"));
}

#[test]
fn startup_pushes_settings_and_arms_the_timer() {
    let engine = MockEngine::new().with_property("hwdec", "vaapi");
    let mut config = Config::default();
    config.audio.normalize_volume = true;
    let mut ctx = TestContext::with_engine(engine, config);

    let updates = ctx.controller.start();

    assert!(armed_token(&updates).is_some());
    assert!(ctx
        .engine
        .writes()
        .contains(&("hwdec".to_string(), PropertyValue::from("vaapi,auto"))));
    assert!(ctx
        .engine
        .command_lines()
        .iter()
        .any(|c| c.starts_with("af add @cine_loudnorm")));
}

#[test]
fn idle_engine_shows_the_start_page() {
    let mut ctx = TestContext::new();
    ctx.playing();

    let updates = ctx.notify(PlayerProperty::IdleActive, true);

    assert_eq!(updates[0], ViewUpdate::Idle(true));
    assert!(updates.contains(&ViewUpdate::ShowChrome));
    assert!(updates.contains(&ViewUpdate::Title("Cine".to_string())));
    assert_eq!(updates.last(), Some(&ViewUpdate::Inhibit(false)));
}

#[test]
fn engine_shutdown_closes_the_window() {
    let mut ctx = TestContext::new();
    assert_eq!(
        ctx.controller.handle_event(EngineEvent::Shutdown),
        vec![ViewUpdate::CloseWindow]
    );
}

#[test]
fn teardown_silences_the_controller() {
    let mut ctx = TestContext::new();
    assert_eq!(ctx.settings.subscriber_count(), 1);

    ctx.controller.teardown();

    assert_eq!(ctx.settings.subscriber_count(), 0);
    assert!(ctx.notify(PlayerProperty::Pause, true).is_empty());
    assert!(ctx.perform(UserCommand::Next).is_empty());
    assert!(ctx.controller.poll_settings().is_empty());
    assert!(ctx.engine.recorded().is_empty());
}

#[test]
fn terminating_engine_does_not_panic_dispatch() {
    let mut ctx = TestContext::new();
    ctx.engine.terminate();

    ctx.perform(UserCommand::TogglePause);
    ctx.perform(UserCommand::Adjust(Adjustment::Zoom, AdjustStep::Increment));

    assert!(ctx.engine.recorded().is_empty());
}

#[test]
fn failed_dialogs_show_a_toast() {
    let mut ctx = TestContext::new();

    let updates = ctx.perform(UserCommand::DialogFailed("No such file or directory".into()));

    assert_eq!(
        updates,
        vec![ViewUpdate::Toast("File Error: No such file or directory".to_string())]
    );
    assert!(ctx.engine.recorded().is_empty());
}
