#![cfg(test)]

use std::collections::HashMap;
use std::sync::Mutex;

use crate::player::types::{EngineOp, PropertyValue};
use crate::player::PlaybackEngine;
use crate::utils::{CineError, Result};

/// A call the fake engine received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Set(String, PropertyValue),
    Command(String, Vec<String>),
    ShowText(String),
}

/// In-memory engine: stores properties, records every call.
#[derive(Debug, Default)]
pub struct FakeEngine {
    properties: Mutex<HashMap<String, PropertyValue>>,
    calls: Mutex<Vec<Call>>,
    reads: Mutex<Vec<String>>,
    shut_down: Mutex<bool>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.put(name, value);
        self
    }

    pub fn with_track(
        self,
        index: usize,
        kind: &str,
        id: i64,
        lang: Option<&str>,
        title: Option<&str>,
        album_art: bool,
    ) -> Self {
        let prefix = format!("track-list/{}", index);
        self.put(&format!("{}/type", prefix), kind);
        self.put(&format!("{}/id", prefix), id);
        if let Some(lang) = lang {
            self.put(&format!("{}/lang", prefix), lang);
        }
        if let Some(title) = title {
            self.put(&format!("{}/title", prefix), title);
        }
        self.put(&format!("{}/albumart", prefix), album_art);
        self
    }

    pub fn with_chapter(self, index: usize, time: f64, title: Option<&str>) -> Self {
        self.put(&format!("chapter-list/{}/time", index), time);
        if let Some(title) = title {
            self.put(&format!("chapter-list/{}/title", index), title);
        }
        self
    }

    pub fn put(&self, name: &str, value: impl Into<PropertyValue>) {
        self.properties
            .lock()
            .unwrap()
            .insert(name.to_string(), value.into());
    }

    /// Make every later call fail as if the engine were terminating
    pub fn shut_down(&self) {
        *self.shut_down.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of every property read so far
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    /// Commands only, as `name arg arg` strings
    pub fn commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Command(name, args) => {
                    let mut parts = vec![name];
                    parts.extend(args);
                    Some(parts.join(" "))
                }
                _ => None,
            })
            .collect()
    }

    pub fn sets(&self) -> Vec<(String, PropertyValue)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Set(name, value) => Some((name, value)),
                _ => None,
            })
            .collect()
    }

    fn check_alive(&self) -> Result<()> {
        if *self.shut_down.lock().unwrap() {
            Err(CineError::Shutdown)
        } else {
            Ok(())
        }
    }
}

impl PlaybackEngine for FakeEngine {
    fn get_property(&self, name: &str) -> Result<PropertyValue> {
        self.check_alive()?;
        self.reads.lock().unwrap().push(name.to_string());
        self.properties
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| CineError::Engine(format!("property unavailable: {}", name)))
    }

    fn set_property(&self, name: &str, value: PropertyValue) -> Result<()> {
        self.check_alive()?;
        self.calls
            .lock()
            .unwrap()
            .push(Call::Set(name.to_string(), value.clone()));
        self.put(name, value);
        Ok(())
    }

    fn set_property_async(&self, name: &str, value: PropertyValue) {
        let _ = self.set_property(name, value);
    }

    fn command(&self, name: &str, args: &[&str]) -> Result<()> {
        self.check_alive()?;
        self.calls.lock().unwrap().push(Call::Command(
            name.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        Ok(())
    }

    fn command_async(&self, name: &str, args: &[&str]) {
        let _ = self.command(name, args);
    }

    fn show_text(&self, text: &str) {
        if self.check_alive().is_ok() {
            self.calls
                .lock()
                .unwrap()
                .push(Call::ShowText(text.to_string()));
        }
    }
}

/// Render a list of ops the way [`FakeEngine::commands`] renders calls
pub fn describe(ops: &[EngineOp]) -> Vec<String> {
    ops.iter()
        .map(|op| match op {
            EngineOp::Set { property, value } => {
                format!("set {} {}", property, value.to_engine_string())
            }
            EngineOp::Command { name, args } => {
                let mut parts = vec![name.to_string()];
                parts.extend(args.iter().cloned());
                parts.join(" ")
            }
            EngineOp::ShowText(text) => format!("show-text {}", text),
        })
        .collect()
}
