use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing; RUST_LOG overrides the default filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cine=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting {}", cine::constants::APP_NAME);

    // Initialize GTK and Adwaita first
    gtk4::init().context("Failed to initialize GTK")?;
    libadwaita::init().context("Failed to initialize libadwaita")?;

    let exit_code = cine::ui::CineApp::new().run();
    info!("Exited with {:?}", exit_code);

    Ok(())
}
