//! GroundLink - ground-station daemon for a nanosatellite serial link

use groundlink::config::Config;
use groundlink::error::Result;
use groundlink::gateway::Gateway;
use groundlink::station::GroundStation;
use groundlink::transport::SerialTransport;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("GroundLink v0.1.0 starting...");

    // Get config path from args or default
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/groundlink.toml".to_string());

    log::info!("Using config: {}", config_path);
    let config = Config::load(&config_path)?;

    // Open the satellite link
    let link = SerialTransport::open(&config.link.device, config.link.baud_rate)?;
    let station = Arc::new(GroundStation::new(Box::new(link)));

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);

    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| groundlink::Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    // Start the operator gateway
    let _gateway = Gateway::start(
        &config.network.bind_address,
        config.network.max_clients,
        Arc::clone(&station),
        Arc::clone(&running),
    )?;

    log::info!("GroundLink running. Press Ctrl-C to stop.");

    // Main loop - drive the satellite link until shutdown
    station.listen(&running);

    log::info!("GroundLink stopped");
    Ok(())
}
