pub mod config_service;

pub use config_service::{Change, SettingKey, SettingsHandle, SettingsSubscription};
