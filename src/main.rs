//! WeatherLink Live standalone poller binary.
//!
//! Loads a station configuration, runs the polling loop, and logs each
//! refreshed snapshot until interrupted.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weatherlink_live::{Poller, ReadingCache, StationConfig};

/// Poller for the Davis WeatherLink Live local API.
#[derive(Parser, Debug)]
#[command(name = "weatherlink-live", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "config.yaml",
        env = "WEATHERLINK_CONFIG"
    )]
    config: String,

    /// Station URL (overrides config file)
    #[arg(long, env = "WEATHERLINK_URL")]
    url: Option<String>,

    /// Polling interval, e.g. "300s" or "5m" (overrides config file)
    #[arg(long, env = "WEATHERLINK_INTERVAL", value_parser = humantime::parse_duration)]
    interval: Option<std::time::Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,weatherlink_live=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!("Loading configuration from: {}", cli.config);
    let mut config = StationConfig::load(&cli.config)?;

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(url) = cli.url {
        config.url = url;
    }
    if let Some(interval) = cli.interval {
        config.polling_interval = interval;
    }
    let config = config.normalized()?;

    tracing::info!(
        "Station: {} ({} {}), polling {} every {}",
        config.name,
        config.manufacturer,
        config.model,
        config.url,
        humantime::format_duration(config.polling_interval),
    );

    let (poller, cache) = Poller::new(config)?;
    let handle = poller.spawn();

    tokio::spawn(log_readings(cache));

    shutdown_signal().await;

    tracing::info!("Shutting down poller...");
    if let Err(e) = handle.shutdown().await {
        tracing::error!("Failed to shut down poller: {}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Log every refreshed snapshot at info level.
async fn log_readings(mut cache: ReadingCache) {
    while cache.changed().await {
        let reading = cache.snapshot();
        tracing::info!(
            temperature = reading.temperature,
            humidity = reading.humidity,
            pm2p5 = reading.pm2p5,
            pm10 = reading.pm10,
            air_quality = %reading.air_quality,
            "Current conditions"
        );
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
