use cine::player::types::{EngineOp, PropertyValue};
use cine::player::PlaybackEngine;
use cine::utils::{CineError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// What the mock engine was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Set(String, PropertyValue),
    Command(Vec<String>),
    Osd(String),
}

/// Engine double that keeps properties in a map and records every call.
#[derive(Debug, Default)]
pub struct MockEngine {
    properties: Mutex<HashMap<String, PropertyValue>>,
    recorded: Mutex<Vec<Recorded>>,
    terminating: Mutex<bool>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties
            .lock()
            .unwrap()
            .insert(name.to_string(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        self.properties.lock().unwrap().get(name).cloned()
    }

    pub fn terminate(&self) {
        *self.terminating.lock().unwrap() = true;
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.recorded.lock().unwrap().clear();
    }

    /// Property writes as `(name, value)`
    pub fn writes(&self) -> Vec<(String, PropertyValue)> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Set(name, value) => Some((name, value)),
                _ => None,
            })
            .collect()
    }

    /// Commands joined with spaces
    pub fn command_lines(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Command(argv) => Some(argv.join(" ")),
                _ => None,
            })
            .collect()
    }

    pub fn osd(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Osd(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn alive(&self) -> Result<()> {
        if *self.terminating.lock().unwrap() {
            Err(CineError::Shutdown)
        } else {
            Ok(())
        }
    }

    fn record(&self, entry: Recorded) {
        self.recorded.lock().unwrap().push(entry);
    }
}

impl PlaybackEngine for MockEngine {
    fn get_property(&self, name: &str) -> Result<PropertyValue> {
        self.alive()?;
        self.property(name)
            .ok_or_else(|| CineError::Engine(format!("no property {}", name)))
    }

    fn set_property(&self, name: &str, value: PropertyValue) -> Result<()> {
        self.alive()?;
        self.record(Recorded::Set(name.to_string(), value.clone()));
        self.properties
            .lock()
            .unwrap()
            .insert(name.to_string(), value);
        Ok(())
    }

    fn set_property_async(&self, name: &str, value: PropertyValue) {
        let _ = self.set_property(name, value);
    }

    fn command(&self, name: &str, args: &[&str]) -> Result<()> {
        self.alive()?;
        let mut argv = vec![name.to_string()];
        argv.extend(args.iter().map(|a| a.to_string()));
        self.record(Recorded::Command(argv));
        Ok(())
    }

    fn command_async(&self, name: &str, args: &[&str]) {
        let _ = self.command(name, args);
    }

    fn show_text(&self, text: &str) {
        if self.alive().is_ok() {
            self.record(Recorded::Osd(text.to_string()));
        }
    }
}

/// Render ops as `set name value`, `name arg...` or `show-text text`.
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
