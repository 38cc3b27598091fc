pub mod engine_config;
#[cfg(feature = "mpv")]
pub mod mpv_player;
pub mod properties;
pub mod tracks;
pub mod traits;
pub mod types;

#[cfg(feature = "mpv")]
pub use mpv_player::MpvEngine;
pub use properties::PlayerProperty;
pub use traits::PlaybackEngine;
pub use types::{Chapter, EndFileReason, EngineOp, PropertyValue, Track, TrackKind};
