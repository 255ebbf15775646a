//! Periodic fetch cycle against the station endpoint.
//!
//! One spawned task owns the whole cycle: GET, parse, derive, replace the
//! cache snapshot, sleep one interval, repeat. Because the task arms its own
//! next sleep only after the previous cycle fully completes, at most one
//! pending timer exists per poller and fetches never overlap.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::StationConfig;
use crate::reading::{Reading, ReadingCache};
use crate::station::CurrentConditions;

/// Default timeout for graceful shutdown of the polling task (5 seconds).
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A single fetch cycle's failure modes.
///
/// All of these are non-fatal: the cycle is logged at error severity, the
/// cache keeps its previous snapshot, and the next cycle runs a full
/// interval later. There is no backoff and no circuit breaking.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or HTTP transport failure (includes non-2xx statuses and
    /// request timeouts).
    #[error("request to station failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("station response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed JSON without the expected `data.conditions` entries.
    #[error("station response has no conditions records")]
    MissingConditions,
}

/// Errors constructing or tearing down a poller.
#[derive(Debug, Error)]
pub enum PollerError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The polling task did not stop within the shutdown timeout.
    #[error("polling task shutdown timed out")]
    ShutdownTimeout,

    /// The polling task panicked.
    #[error("polling task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Polls the station and writes derived readings into the cache.
pub struct Poller {
    config: StationConfig,
    client: Client,
    tx: watch::Sender<Reading>,
}

impl Poller {
    /// Build a poller plus the cache handle its readings are served from.
    ///
    /// The cache starts at the zeroed default snapshot and can be cloned
    /// freely before or after the poller is spawned.
    ///
    /// # Errors
    /// Returns `PollerError::Client` if the HTTP client cannot be built.
    pub fn new(config: StationConfig) -> Result<(Self, ReadingCache), PollerError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(PollerError::Client)?;
        let (tx, rx) = watch::channel(Reading::default());

        Ok((Self { config, client, tx }, ReadingCache::new(rx)))
    }

    /// Get the poller's configuration.
    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Run one fetch cycle: GET the endpoint, parse the body, derive a
    /// snapshot, and replace the cache wholesale.
    ///
    /// On any failure the previous snapshot stays in place.
    pub async fn poll_once(&self) -> Result<(), FetchError> {
        let body = self
            .client
            .get(&self.config.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        tracing::debug!(station = %self.config.name, bytes = body.len(), "Station responded");

        let document: CurrentConditions = serde_json::from_str(&body)?;
        let record = document.current().ok_or(FetchError::MissingConditions)?;
        let reading = Reading::from_conditions(record, self.config.temperature_unit);

        self.tx.send_replace(reading);
        tracing::debug!(
            station = %self.config.name,
            temperature = reading.temperature,
            humidity = reading.humidity,
            pm2p5 = reading.pm2p5,
            pm10 = reading.pm10,
            air_quality = %reading.air_quality,
            "Reading updated"
        );
        Ok(())
    }

    /// Spawn the polling loop: an immediate first fetch, then one fetch per
    /// interval until the handle is shut down.
    pub fn spawn(self) -> PollerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let interval = self.config.polling_interval;
        let name = self.config.name.clone();
        tracing::info!(
            station = %name,
            url = %self.config.url,
            interval = ?interval,
            "Polling loop started"
        );

        let task = tokio::spawn(async move {
            loop {
                self.run_cycle().await;
                tokio::select! {
                    _ = time::sleep(interval) => {}
                    _ = shutdown_rx.changed() => {
                        tracing::debug!(station = %name, "Polling loop stopping");
                        break;
                    }
                }
            }
        });

        PollerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run_cycle(&self) {
        if let Err(e) = self.poll_once().await {
            tracing::error!(station = %self.config.name, error = %e, "Fetch cycle failed");
        }
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Handle to a spawned polling loop.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) leaves
/// the loop running detached for the life of the process, matching the
/// poll-forever contract; shut it down explicitly to stop it.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Signal the loop to stop and wait for it, with the default timeout.
    pub async fn shutdown(self) -> Result<(), PollerError> {
        self.shutdown_with_timeout(SHUTDOWN_TIMEOUT).await
    }

    /// Shutdown with a custom timeout. The task is aborted if it does not
    /// stop in time.
    pub async fn shutdown_with_timeout(self, timeout: Duration) -> Result<(), PollerError> {
        // Receiver is gone if the task already ended; nothing left to signal.
        let _ = self.shutdown.send(true);

        let mut task = self.task;
        match time::timeout(timeout, &mut task).await {
            Ok(join) => {
                join?;
                tracing::info!("Polling loop shutdown complete");
                Ok(())
            }
            Err(_) => {
                tracing::warn!("Polling loop shutdown timed out, aborting task");
                task.abort();
                Err(PollerError::ShutdownTimeout)
            }
        }
    }

    /// Whether the polling task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl std::fmt::Debug for PollerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollerHandle")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aqi::AirQuality;

    #[tokio::test]
    async fn test_new_poller_cache_starts_zeroed() {
        let config = StationConfig::new("http://127.0.0.1:65535/v1/current_conditions");
        let (_poller, cache) = Poller::new(config).unwrap();
        assert_eq!(cache.temperature(), 0.0);
        assert_eq!(cache.humidity(), 0);
        assert_eq!(cache.air_quality(), AirQuality::Unknown);
    }

    #[tokio::test]
    async fn test_transport_error_is_nonfatal_and_keeps_cache() {
        // Reserved TLD, guaranteed not to resolve.
        let config = StationConfig::new("http://station.invalid/v1/current_conditions")
            .with_request_timeout(Duration::from_secs(2));
        let (poller, cache) = Poller::new(config).unwrap();

        let before = cache.snapshot();
        let err = poller.poll_once().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(cache.snapshot(), before);
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let config = StationConfig::new("http://station.invalid/v1/current_conditions")
            .with_polling_interval(Duration::from_secs(60))
            .with_request_timeout(Duration::from_secs(1));
        let (poller, _cache) = Poller::new(config).unwrap();

        let handle = poller.spawn();
        assert!(handle.is_running());
        handle
            .shutdown_with_timeout(Duration::from_secs(5))
            .await
            .unwrap();
    }
}
