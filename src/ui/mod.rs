mod app;
mod options;
mod preferences;
mod video_area;
mod window;

pub use app::CineApp;
pub use window::PlayerWindow;
