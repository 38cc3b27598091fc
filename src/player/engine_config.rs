use std::path::Path;

use super::types::EngineOp;
use crate::config::Config;
use crate::constants::{
    APP_NAME, DEFAULT_SUB_COLOR, DEFAULT_SUB_FONT, HFLIP_LABEL, INTERNAL_BINDINGS,
    LOUDNORM_FILTER, LOUDNORM_LABEL, SCREENSHOT_TEMPLATE, SUB_FILE_PATHS, VFLIP_LABEL,
    VOLUME_MAX,
};
use crate::services::SettingKey;

/// Options that only take effect before the engine initializes.
///
/// Everything here can still be overridden by the user's `mpv.conf` in the
/// config dir, which is loaded during initialization.
pub fn init_options(config_dir: &Path, screenshot_dir: &Path) -> Vec<(&'static str, String)> {
    let mut options: Vec<(&'static str, String)> = vec![
        ("audio-client-name", APP_NAME.to_string()),
        ("screenshot-directory", screenshot_dir.display().to_string()),
        ("screenshot-template", SCREENSHOT_TEMPLATE.to_string()),
        ("config", "yes".to_string()),
        ("config-dir", config_dir.display().to_string()),
        ("input-default-bindings", "no".to_string()),
        ("input-vo-keyboard", "yes".to_string()),
        ("load-scripts", "yes".to_string()),
        ("audio-display", "embedded-first".to_string()),
        ("audio-file-auto", "fuzzy".to_string()),
        ("sub-auto", "fuzzy".to_string()),
        ("sub-file-paths", SUB_FILE_PATHS.to_string()),
        ("volume-max", VOLUME_MAX.to_string()),
    ];

    // Subtitle and OSD styling
    options.extend([
        ("sub-border-size", "2".to_string()),
        ("sub-shadow-offset", "0.6".to_string()),
        ("sub-border-color", "#B6000000".to_string()),
        ("sub-shadow-color", "#97000000".to_string()),
        ("sub-color", DEFAULT_SUB_COLOR.to_string()),
        ("sub-use-margins", "no".to_string()),
        ("sub-font", DEFAULT_SUB_FONT.to_string()),
        ("osd-font", "Adwaita Sans".to_string()),
        ("osd-bold", "yes".to_string()),
        ("osd-bar", "no".to_string()),
        ("osd-blur", "1".to_string()),
        ("osd-border-size", "1.5".to_string()),
        ("osd-shadow-offset", "0.6".to_string()),
        ("osd-border-color", "#BE000000".to_string()),
        ("osd-shadow-color", "#1B000000".to_string()),
        ("osd-margin-x", "66".to_string()),
        ("osd-margin-y", "66".to_string()),
    ]);

    options
}

/// Overrides applied after initialization, on top of the user's config.
pub fn post_init_ops() -> Vec<EngineOp> {
    vec![
        EngineOp::set("keep-open", "yes"),
        EngineOp::set("keep-open-pause", "no"),
        EngineOp::set("vo", "libmpv"),
        EngineOp::set("osc", "no"),
        EngineOp::set("load-console", "no"),
        // Resuming should not pin the tracks chosen last time
        EngineOp::command("change-list", ["watch-later-options", "remove", "vid"]),
        EngineOp::command("change-list", ["watch-later-options", "remove", "aid"]),
    ]
}

/// Internal bindings first, then the user's `input.conf` so it wins.
pub fn input_conf_ops(user_input_conf: Option<&Path>) -> Vec<EngineOp> {
    let mut ops = vec![EngineOp::command(
        "load-input-conf",
        [format!("memory://{}", INTERNAL_BINDINGS)],
    )];

    if let Some(path) = user_input_conf {
        ops.push(EngineOp::command(
            "load-input-conf",
            [path.display().to_string()],
        ));
    }

    ops
}

/// Decoders configured by the user, without the "no" entry.
pub fn parse_conf_hwdec(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "no")
        .map(str::to_string)
        .collect()
}

/// Everything the persisted settings control, applied once at startup.
pub fn settings_ops(config: &Config, conf_hwdec: &[String]) -> Vec<EngineOp> {
    let mut ops = vec![
        EngineOp::set("sub-color", config.subtitles.color.as_str()),
        EngineOp::set("sub-scale", config.subtitles.scale),
        EngineOp::set("sub-font", config.subtitles.font.as_str()),
        EngineOp::set("slang", config.subtitles.languages.as_str()),
        EngineOp::set("alang", config.audio.languages.as_str()),
        EngineOp::set("save-position-on-quit", config.playback.save_position),
    ];

    ops.extend(hwdec_ops(config.playback.hardware_decoding, conf_hwdec));

    // A fresh engine has no filter to remove
    if config.audio.normalize_volume {
        ops.push(EngineOp::command("af", ["add", LOUDNORM_FILTER]));
    }

    ops
}

/// Ops for a single setting that changed while the window is open.
pub fn setting_change_ops(key: SettingKey, config: &Config, conf_hwdec: &[String]) -> Vec<EngineOp> {
    match key {
        SettingKey::SubtitleColor => vec![EngineOp::set("sub-color", config.subtitles.color.as_str())],
        SettingKey::SubtitleScale => vec![EngineOp::set("sub-scale", config.subtitles.scale)],
        SettingKey::SubtitleFont => vec![EngineOp::set("sub-font", config.subtitles.font.as_str())],
        SettingKey::SubtitleLanguages => {
            vec![EngineOp::set("slang", config.subtitles.languages.as_str())]
        }
        SettingKey::AudioLanguages => vec![EngineOp::set("alang", config.audio.languages.as_str())],
        SettingKey::HardwareDecoding => hwdec_ops(config.playback.hardware_decoding, conf_hwdec),
        SettingKey::NormalizeVolume => {
            if config.audio.normalize_volume {
                vec![EngineOp::command("af", ["add", LOUDNORM_FILTER])]
            } else {
                vec![EngineOp::command("af", ["remove", LOUDNORM_LABEL])]
            }
        }
        SettingKey::SavePosition => {
            vec![EngineOp::set("save-position-on-quit", config.playback.save_position)]
        }
        SettingKey::OpenNewWindows | SettingKey::Interface => Vec::new(),
    }
}

fn hwdec_ops(enabled: bool, conf_hwdec: &[String]) -> Vec<EngineOp> {
    if !enabled {
        return vec![EngineOp::set("hwdec", "no")];
    }

    let mut decoders = conf_hwdec.to_vec();
    decoders.push("auto".to_string());

    // Flip filters do not survive zero-copy decoding
    vec![
        EngineOp::command("vf", ["remove", HFLIP_LABEL]),
        EngineOp::command("vf", ["remove", VFLIP_LABEL]),
        EngineOp::set("hwdec", decoders.join(",")),
    ]
}
