// APRS POI Bridge - Main Entry Point
// Dire Wolf CSV log -> Navit POI file, plus a mock NMEA fix on stdout
// Licensed under AGPL v3

use aprs_poi_bridge::config::Config;
use aprs_poi_bridge::coordinator::Coordinator;
use aprs_poi_bridge::gps::GpsMock;
use chrono::Utc;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    // Logs go to stderr; stdout is the NMEA pipe
    init_logging(config.verbose);

    info!("Starting APRS POI bridge");

    let mut coordinator = Coordinator::from_config(&config);

    if config.once {
        let report = coordinator.run_cycle(Utc::now())?;
        info!(
            "Wrote {} stations ({} active, {} inactive) to {}",
            report.stations(),
            report.active,
            report.inactive,
            config.poi_file.display()
        );
        return Ok(());
    }

    // Maintenance task owns the position store outright
    let maintenance = tokio::spawn(coordinator.run(config.refresh_period()));

    // GPS task only knows the map center
    let gps = GpsMock::new(config.latitude, config.longitude);
    let emitter = tokio::spawn(gps.run(config.gps_period(), tokio::io::stdout()));

    tokio::select! {
        result = signal::ctrl_c() => match result {
            Ok(()) => info!("Received shutdown signal (Ctrl+C)"),
            Err(err) => {
                error!("Unable to listen for shutdown signal: {}", err);
                return Err(err.into());
            }
        },
        result = emitter => match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => info!("GPS consumer went away ({}), shutting down", e),
            Err(e) => error!("GPS task failed: {}", e),
        },
        result = maintenance => {
            if let Err(e) = result {
                error!("Maintenance task failed: {}", e);
            }
        }
    }

    info!("Stopped");
    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    if verbose {
        subscriber
            .with_max_level(tracing::Level::DEBUG)
            .init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber
            .with_max_level(tracing::Level::INFO)
            .init();
    }
}
