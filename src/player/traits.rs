use tracing::{debug, trace, warn};

use super::types::{EngineOp, PropertyValue};
use crate::utils::Result;

/// The slice of the playback engine the window talks to.
///
/// Implementations must be callable from the UI thread without blocking on
/// playback; `set_property_async` and `command_async` never wait for the
/// engine's reply. `execute` only uses those two.
pub trait PlaybackEngine: Send + Sync {
    fn get_property(&self, name: &str) -> Result<PropertyValue>;
    /// Write a property and wait for the engine to apply it
    fn set_property(&self, name: &str, value: PropertyValue) -> Result<()>;
    /// Queue a property write; failures are reported through the log only
    fn set_property_async(&self, name: &str, value: PropertyValue);
    /// Run a command and wait for the engine to accept it
    fn command(&self, name: &str, args: &[&str]) -> Result<()>;
    /// Queue a command; failures are reported through the log only
    fn command_async(&self, name: &str, args: &[&str]);
    fn show_text(&self, text: &str);

    /// Apply a batch of dispatch operations, fire-and-forget.
    fn execute(&self, ops: &[EngineOp]) {
        for op in ops {
            trace!("Queueing {:?}", op);
            match op {
                EngineOp::Set { property, value } => {
                    self.set_property_async(property, value.clone())
                }
                EngineOp::Command { name, args } => {
                    let args: Vec<&str> = args.iter().map(String::as_str).collect();
                    self.command_async(name, &args);
                }
                EngineOp::ShowText(text) => self.show_text(text),
            }
        }
    }

    /// Apply ops in order, waiting for each one. Only for engine setup.
    fn execute_blocking(&self, ops: &[EngineOp]) {
        for op in ops {
            let result = match op {
                EngineOp::Set { property, value } => self.set_property(property, value.clone()),
                EngineOp::Command { name, args } => {
                    let args: Vec<&str> = args.iter().map(String::as_str).collect();
                    self.command(name, &args)
                }
                EngineOp::ShowText(text) => {
                    self.show_text(text);
                    Ok(())
                }
            };

            if let Err(e) = result {
                if e.is_shutdown() {
                    debug!("Ignoring {:?} during shutdown", op);
                } else {
                    warn!("Engine rejected {:?}: {}", op, e);
                }
            }
        }
    }

    fn get_f64(&self, name: &str) -> Option<f64> {
        self.get_property(name).ok().and_then(|v| v.as_f64())
    }

    fn get_i64(&self, name: &str) -> Option<i64> {
        self.get_property(name).ok().and_then(|v| v.as_i64())
    }

    fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_property(name).ok().and_then(|v| v.as_bool())
    }

    fn get_string(&self, name: &str) -> Option<String> {
        match self.get_property(name).ok()? {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }
}
