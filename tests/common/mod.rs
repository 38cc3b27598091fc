#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use cine::config::Config;
use cine::core::autohide::HideToken;
use cine::core::{UserCommand, ViewUpdate, WindowController};
use cine::events::EngineEvent;
use cine::player::types::PropertyValue;
use cine::player::PlayerProperty;
use cine::services::SettingsHandle;
use mocks::MockEngine;
use std::sync::Arc;

/// A controller wired to a mock engine and in-memory settings.
pub struct TestContext {
    pub engine: Arc<MockEngine>,
    pub settings: SettingsHandle,
    pub controller: WindowController,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_engine(MockEngine::new(), Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_engine(MockEngine::new(), config)
    }

    pub fn with_engine(engine: MockEngine, config: Config) -> Self {
        let engine = Arc::new(engine);
        let settings = SettingsHandle::in_memory(config);
        let controller = WindowController::new(engine.clone(), settings.clone());
        Self {
            engine,
            settings,
            controller,
        }
    }

    /// Deliver a property notification as the pump would.
    pub fn notify(&mut self, property: PlayerProperty, value: impl Into<PropertyValue>) -> Vec<ViewUpdate> {
        self.controller
            .handle_event(EngineEvent::property(property, value))
    }

    pub fn perform(&mut self, command: UserCommand) -> Vec<ViewUpdate> {
        self.controller.perform(command)
    }

    /// Report every recorded property write back as a notification, the
    /// way the engine confirms a change it applied.
    pub fn echo_writes(&mut self) -> Vec<ViewUpdate> {
        let mut updates = Vec::new();
        for (name, value) in self.engine.writes() {
            if let Some(property) = PlayerProperty::from_name(&name) {
                updates.extend(self.notify(property, value));
            }
        }
        self.engine.clear();
        updates
    }

    /// Mark a file as loaded and playing.
    pub fn playing(&mut self) {
        self.notify(PlayerProperty::IdleActive, false);
        self.notify(PlayerProperty::Path, "/media/movie.mkv");
        self.notify(PlayerProperty::Pause, false);
        self.engine.clear();
    }

    /// Load a playlist of `count` entries positioned at `pos`.
    pub fn playlist(&mut self, count: i64, pos: i64) {
        self.notify(PlayerProperty::PlaylistCount, count);
        self.notify(PlayerProperty::PlaylistPos, pos);
        self.engine.clear();
    }
}

/// The hide timer token in a batch of updates, if one was armed.
pub fn armed_token(updates: &[ViewUpdate]) -> Option<HideToken> {
    updates.iter().find_map(|update| match update {
        ViewUpdate::ArmHideTimer { token, .. } => Some(*token),
        _ => None,
    })
}
