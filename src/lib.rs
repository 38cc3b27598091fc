// Library half of the player: everything except the binary entry point.
// The core builds without GTK or libmpv so it can be tested headless.

pub mod config;
pub mod constants;
pub mod core;
pub mod events;
pub mod player;
pub mod services;
#[cfg(all(feature = "gtk", feature = "mpv"))]
pub mod ui;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use utils::{CineError, Result};
