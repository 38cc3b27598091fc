use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::constants::SETTINGS_CHANNEL_CAPACITY;
use crate::utils::{CineError, Result};

/// Individual settings the player reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    SubtitleColor,
    SubtitleScale,
    SubtitleFont,
    SubtitleLanguages,
    AudioLanguages,
    HardwareDecoding,
    NormalizeVolume,
    SavePosition,
    OpenNewWindows,
    Interface,
}

impl SettingKey {
    pub const ALL: [SettingKey; 10] = [
        SettingKey::SubtitleColor,
        SettingKey::SubtitleScale,
        SettingKey::SubtitleFont,
        SettingKey::SubtitleLanguages,
        SettingKey::AudioLanguages,
        SettingKey::HardwareDecoding,
        SettingKey::NormalizeVolume,
        SettingKey::SavePosition,
        SettingKey::OpenNewWindows,
        SettingKey::Interface,
    ];
}

struct SettingsInner {
    config: watch::Sender<Config>,
    changes: broadcast::Sender<SettingKey>,
    path: Option<PathBuf>,
}

/// Shared handle to the persisted settings.
///
/// Every window gets a clone at construction and subscribes for change
/// notifications; dropping the [`SettingsSubscription`] unsubscribes.
#[derive(Clone)]
pub struct SettingsHandle {
    inner: Arc<SettingsInner>,
}

impl std::fmt::Debug for SettingsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsHandle")
            .field("path", &self.inner.path)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl SettingsHandle {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        let path = Config::config_path().ok();
        let config = match &path {
            Some(path) => Config::load_from(path).unwrap_or_else(|e| {
                error!("Failed to load settings, using defaults: {:#}", e);
                Config::default()
            }),
            None => Config::default(),
        };
        info!("Settings initialized");
        match path {
            Some(path) => Self::with_path(config, path),
            None => Self::in_memory(config),
        }
    }

    /// Settings backed by a specific file.
    pub fn with_path(config: Config, path: PathBuf) -> Self {
        Self::build(config, Some(path))
    }

    /// Settings that are never written to disk.
    pub fn in_memory(config: Config) -> Self {
        Self::build(config, None)
    }

    fn build(config: Config, path: Option<PathBuf>) -> Self {
        let (config, _) = watch::channel(config);
        let (changes, _) = broadcast::channel(SETTINGS_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SettingsInner {
                config,
                changes,
                path,
            }),
        }
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> Config {
        self.inner.config.borrow().clone()
    }

    /// Read a single value without cloning the whole config.
    pub fn read<T>(&self, f: impl FnOnce(&Config) -> T) -> T {
        f(&self.inner.config.borrow())
    }

    /// Change one setting, notify subscribers, then persist it.
    ///
    /// Nothing is broadcast when the update leaves the value unchanged. A
    /// failed save is returned after the change has been applied, so every
    /// window keeps running with the same settings.
    pub fn update(&self, key: SettingKey, updater: impl FnOnce(&mut Config)) -> Result<()> {
        let changed = self.inner.config.send_if_modified(|config| {
            let before = config.clone();
            updater(config);
            *config != before
        });

        if !changed {
            return Ok(());
        }

        debug!("Setting changed: {:?}", key);
        // No subscribers is normal
        let _ = self.inner.changes.send(key);

        if let Some(path) = &self.inner.path {
            self.inner
                .config
                .borrow()
                .save_to(path)
                .map_err(|e| CineError::Config(format!("{:#}", e)))?;
        }
        Ok(())
    }

    pub fn subscribe(&self) -> SettingsSubscription {
        SettingsSubscription {
            receiver: self.inner.changes.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.changes.receiver_count()
    }
}

/// One notification from [`SettingsSubscription::try_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Key(SettingKey),
    /// The subscriber fell behind and older notifications were dropped
    Missed,
}

/// Receives [`SettingKey`] change notifications until dropped.
pub struct SettingsSubscription {
    receiver: broadcast::Receiver<SettingKey>,
}

impl std::fmt::Debug for SettingsSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsSubscription").finish()
    }
}

impl SettingsSubscription {
    /// Next pending change, if any. Never blocks.
    pub fn try_next(&mut self) -> Option<Change> {
        match self.receiver.try_recv() {
            Ok(key) => Some(Change::Key(key)),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                warn!("Missed {} setting changes", missed);
                Some(Change::Missed)
            }
            Err(_) => None,
        }
    }

    /// Drain every pending change, collapsing duplicates.
    ///
    /// When changes were missed every key is reported, since there is no
    /// telling which ones changed.
    pub fn drain(&mut self) -> Vec<SettingKey> {
        let mut keys = Vec::new();
        while let Some(change) = self.try_next() {
            match change {
                Change::Key(key) => {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                Change::Missed => {
                    // Keep draining so the receiver catches up
                    keys = SettingKey::ALL.to_vec();
                }
            }
        }
        keys
    }

    /// Explicit counterpart to [`SettingsHandle::subscribe`].
    pub fn unsubscribe(self) {}
}
