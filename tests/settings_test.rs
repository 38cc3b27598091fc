mod common;

use cine::config::{AspectMode, Config};
use cine::core::ViewUpdate;
use cine::player::types::PropertyValue;
use cine::services::{SettingKey, SettingsHandle};
use common::TestContext;
use tempfile::TempDir;

#[test]
fn updates_are_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cine").join("config.toml");
    let settings = SettingsHandle::with_path(Config::default(), path.clone());

    settings
        .update(SettingKey::SubtitleScale, |c| c.subtitles.scale = 1.5)
        .unwrap();
    settings
        .update(SettingKey::Interface, |c| c.interface.aspect_mode = AspectMode::Cycle)
        .unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.subtitles.scale, 1.5);
    assert_eq!(reloaded.interface.aspect_mode, AspectMode::Cycle);
    assert_eq!(reloaded, settings.snapshot());
}

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config, Config::default());
    assert!(path.exists());
}

#[test]
fn partial_files_fill_in_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[audio]\nnormalize_volume = true\n").unwrap();

    let config = Config::load_from(&path).unwrap();

    assert!(config.audio.normalize_volume);
    assert!(config.playback.hardware_decoding);
    assert_eq!(config.subtitles, Config::default().subtitles);
}

#[test]
fn broken_files_are_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[audio\nnormalize_volume = ").unwrap();

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn unchanged_values_are_not_broadcast() {
    let settings = SettingsHandle::in_memory(Config::default());
    let mut subscription = settings.subscribe();
    let default_scale = settings.read(|c| c.subtitles.scale);

    settings
        .update(SettingKey::SubtitleScale, |c| c.subtitles.scale = default_scale)
        .unwrap();

    assert_eq!(subscription.try_next(), None);
}

#[test]
fn every_window_hears_each_change_once() {
    let settings = SettingsHandle::in_memory(Config::default());
    let mut first = settings.subscribe();
    let mut second = settings.subscribe();

    settings
        .update(SettingKey::SubtitleColor, |c| c.subtitles.color = "#ff0000".into())
        .unwrap();
    settings
        .update(SettingKey::SubtitleColor, |c| c.subtitles.color = "#00ff00".into())
        .unwrap();
    settings
        .update(SettingKey::SavePosition, |c| c.playback.save_position = true)
        .unwrap();

    let expected = vec![SettingKey::SubtitleColor, SettingKey::SavePosition];
    assert_eq!(first.drain(), expected);
    assert_eq!(second.drain(), expected);
    assert!(first.drain().is_empty());
}

#[test]
fn dropped_subscriptions_stop_counting() {
    let settings = SettingsHandle::in_memory(Config::default());
    let subscription = settings.subscribe();
    assert_eq!(settings.subscriber_count(), 1);

    subscription.unsubscribe();

    assert_eq!(settings.subscriber_count(), 0);
    // Updating with nobody listening is fine
    settings
        .update(SettingKey::OpenNewWindows, |c| c.playback.open_new_windows = true)
        .unwrap();
}

#[test]
fn open_windows_apply_changed_settings() {
    let mut ctx = TestContext::new();
    ctx.settings
        .update(SettingKey::SubtitleFont, |c| c.subtitles.font = "Cantarell Bold".into())
        .unwrap();
    ctx.settings
        .update(SettingKey::HardwareDecoding, |c| c.playback.hardware_decoding = false)
        .unwrap();

    let updates = ctx.controller.poll_settings();

    assert!(updates.is_empty());
    assert_eq!(
        ctx.engine.writes(),
        vec![
            ("sub-font".to_string(), PropertyValue::from("Cantarell Bold")),
            ("hwdec".to_string(), PropertyValue::from("no")),
        ]
    );
    assert!(ctx.controller.poll_settings().is_empty());
}

#[test]
fn interface_changes_reach_the_window() {
    let mut ctx = TestContext::new();
    ctx.settings
        .update(SettingKey::Interface, |c| {
            c.interface.options_popover = false;
            c.interface.aspect_mode = AspectMode::Cycle;
        })
        .unwrap();

    let updates = ctx.controller.poll_settings();

    let interface = ctx.settings.read(|c| c.interface.clone());
    assert_eq!(updates, vec![ViewUpdate::InterfaceChanged(interface.clone())]);
    assert_eq!(ctx.controller.interface(), &interface);
    assert!(ctx.engine.recorded().is_empty());
}

#[test]
fn turning_off_normalization_removes_the_filter() {
    let mut config = Config::default();
    config.audio.normalize_volume = true;
    let mut ctx = TestContext::with_config(config);

    ctx.settings
        .update(SettingKey::NormalizeVolume, |c| c.audio.normalize_volume = false)
        .unwrap();
    ctx.controller.poll_settings();

    assert_eq!(ctx.engine.command_lines(), vec!["af remove @cine_loudnorm"]);
}

#[test]
fn a_window_that_fell_behind_reapplies_every_setting() {
    let mut ctx = TestContext::new();
    ctx.settings
        .update(SettingKey::SubtitleColor, |c| c.subtitles.color = "#ff0000".into())
        .unwrap();
    for step in 1..=40 {
        ctx.settings
            .update(SettingKey::SubtitleScale, |c| c.subtitles.scale = 1.0 + step as f64 / 100.0)
            .unwrap();
    }

    let updates = ctx.controller.poll_settings();

    let interface = ctx.settings.read(|c| c.interface.clone());
    assert_eq!(updates, vec![ViewUpdate::InterfaceChanged(interface)]);
    let scale = ctx.settings.read(|c| c.subtitles.scale);
    let writes = ctx.engine.writes();
    assert!(writes.contains(&("sub-color".to_string(), PropertyValue::from("#ff0000"))));
    assert!(writes.contains(&("sub-scale".to_string(), PropertyValue::Double(scale))));
}

#[test]
fn unwritable_settings_still_reach_open_windows() {
    let dir = TempDir::new().unwrap();
    let settings = SettingsHandle::with_path(Config::default(), dir.path().to_path_buf());
    let mut subscription = settings.subscribe();

    let result = settings.update(SettingKey::SubtitleScale, |c| c.subtitles.scale = 1.7);

    assert!(result.is_err());
    assert_eq!(settings.snapshot().subtitles.scale, 1.7);
    assert_eq!(subscription.drain(), vec![SettingKey::SubtitleScale]);
}
