pub mod adjustments;
pub mod aspect;
pub mod autohide;
pub mod commands;
pub mod controller;
pub mod inhibit;
pub mod keys;
pub mod mirror;
pub mod navigation;
pub mod open;
pub mod preferences;
pub mod view;

pub use commands::UserCommand;
pub use controller::{OptionsSnapshot, WindowController};
pub use inhibit::{InhibitGuard, Inhibitor};
pub use view::ViewUpdate;
