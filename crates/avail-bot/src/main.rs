//! Availability bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p avail-bot
//! ```
//!
//! Configuration is loaded from environment variables.

use avail_common::{try_init_tracing, AvailConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the bot
    if let Err(e) = run().await {
        error!(error = %e, "Bot failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting availability bot...");

    // Load configuration
    let config = AvailConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.server.port,
        leagues = ?config.tables.league_names(),
        "Configuration loaded"
    );

    // Run the bot server
    avail_bot::run(config).await?;

    Ok(())
}
