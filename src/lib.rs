//! Poller for the Davis WeatherLink Live local API.
//!
//! Periodically fetches the station's current-conditions document, derives
//! temperature, humidity, and particulate readings, and serves the
//! last-known-good snapshot through synchronous accessors. Every fetch
//! failure is non-fatal: the cache keeps its previous values and the next
//! cycle runs a full interval later.
//!
//! # Architecture
//!
//! - [`config`]: YAML configuration with defaults and validation
//! - [`station`]: wire model for the station's JSON document
//! - [`aqi`]: particulate breakpoint classifier
//! - [`reading`]: derived snapshot and the watch-backed cache
//! - [`poller`]: fetch cycle, polling loop, graceful shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use weatherlink_live::{Poller, StationConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StationConfig::new("http://192.168.1.30/v1/current_conditions")
//!     .with_polling_interval(std::time::Duration::from_secs(60))
//!     .normalized()?;
//!
//! let (poller, cache) = Poller::new(config)?;
//! let handle = poller.spawn();
//!
//! // Zeroed defaults until the first successful fetch.
//! println!("temperature: {}", cache.temperature());
//! println!("air quality: {}", cache.air_quality());
//!
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod aqi;
pub mod config;
pub mod poller;
pub mod reading;
pub mod station;

pub use aqi::AirQuality;
pub use config::{ConfigError, StationConfig, TemperatureUnit};
pub use poller::{FetchError, Poller, PollerError, PollerHandle};
pub use reading::{Reading, ReadingCache};
