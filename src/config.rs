use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_SEEK_SCROLL_STEP, DEFAULT_SUB_COLOR, DEFAULT_SUB_FONT, DEFAULT_VOLUME_SCROLL_STEP,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub interface: InterfaceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleConfig {
    #[serde(default = "default_sub_color")]
    pub color: String,

    #[serde(default = "default_sub_scale")]
    pub scale: f64,

    #[serde(default = "default_sub_font")]
    pub font: String,

    /// Comma separated, handed to the engine as `slang`
    #[serde(default)]
    pub languages: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Comma separated, handed to the engine as `alang`
    #[serde(default)]
    pub languages: String,

    #[serde(default)]
    pub normalize_volume: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_true")]
    pub hardware_decoding: bool,

    #[serde(default)]
    pub save_position: bool,

    #[serde(default)]
    pub open_new_windows: bool,
}

/// Window-controller variant. The two historical layouts of the player
/// differ only in these affordances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    #[serde(default = "default_true")]
    pub options_popover: bool,

    #[serde(default)]
    pub aspect_mode: AspectMode,

    #[serde(default = "default_seek_scroll_step")]
    pub seek_scroll_step: f64,

    #[serde(default = "default_volume_scroll_step")]
    pub volume_scroll_step: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectMode {
    /// A button that steps through the ratios
    Cycle,
    /// A dropdown listing every ratio
    #[default]
    Dropdown,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            let contents =
                fs::read_to_string(config_path).context("Failed to read config file")?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", config_path);
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("cine").join("config.toml"))
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            color: default_sub_color(),
            scale: default_sub_scale(),
            font: default_sub_font(),
            languages: String::new(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            hardware_decoding: default_true(),
            save_position: false,
            open_new_windows: false,
        }
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            options_popover: default_true(),
            aspect_mode: AspectMode::default(),
            seek_scroll_step: default_seek_scroll_step(),
            volume_scroll_step: default_volume_scroll_step(),
        }
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_sub_color() -> String { DEFAULT_SUB_COLOR.to_string() }
fn default_sub_scale() -> f64 { 1.0 }
fn default_sub_font() -> String { DEFAULT_SUB_FONT.to_string() }
fn default_seek_scroll_step() -> f64 { DEFAULT_SEEK_SCROLL_STEP }
fn default_volume_scroll_step() -> f64 { DEFAULT_VOLUME_SCROLL_STEP }

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cine").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[subtitles]\ncolor = \"#ffffff\"\n\n[interface]\naspect_mode = \"cycle\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.subtitles.color, "#ffffff");
        assert_eq!(config.subtitles.font, DEFAULT_SUB_FONT);
        assert_eq!(config.interface.aspect_mode, AspectMode::Cycle);
        assert!(config.playback.hardware_decoding);
    }

    #[test]
    fn saved_config_reloads_identically() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.audio.normalize_volume = true;
        config.subtitles.languages = "pt,en".into();

        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn garbage_is_reported_not_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
