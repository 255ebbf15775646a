//! Last-known-good reading snapshot and the cache it is served from.

use serde::Serialize;
use tokio::sync::watch;

use crate::aqi::{self, AirQuality};
use crate::config::TemperatureUnit;
use crate::station::{ConditionRecord, fahrenheit_to_celsius};

/// Readings derived from one successful fetch.
///
/// `Default` is the zeroed pre-first-fetch snapshot: until the station has
/// answered once, callers see `0` values and `Unknown` air quality rather
/// than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    /// Temperature in the configured unit.
    pub temperature: f64,
    /// Relative humidity, whole percent (0–100).
    pub humidity: u8,
    /// PM2.5 now-cast average, µg/m³.
    pub pm2p5: f64,
    /// PM10 now-cast average, µg/m³.
    pub pm10: f64,
    /// Category derived from the PM pair.
    pub air_quality: AirQuality,
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0,
            pm2p5: 0.0,
            pm10: 0.0,
            air_quality: AirQuality::Unknown,
        }
    }
}

impl Reading {
    /// Derive a snapshot from a station record.
    ///
    /// The station reports Fahrenheit; conversion happens here when the
    /// configured unit is Celsius. Humidity is rounded to the nearest whole
    /// percent. PM now-cast values pass through unmodified.
    pub fn from_conditions(record: &ConditionRecord, unit: TemperatureUnit) -> Self {
        let temperature = match unit {
            TemperatureUnit::Celsius => fahrenheit_to_celsius(record.temp),
            TemperatureUnit::Fahrenheit => record.temp,
        };
        Self {
            temperature,
            humidity: record.hum.round().clamp(0.0, 100.0) as u8,
            pm2p5: record.pm_2p5_nowcast,
            pm10: record.pm_10_nowcast,
            air_quality: aqi::classify(record.pm_2p5_nowcast, record.pm_10_nowcast),
        }
    }
}

/// Read side of the snapshot cache.
///
/// The poller owns the matching writer and replaces the snapshot wholesale
/// after each successful fetch; a failed fetch leaves the previous snapshot
/// in place. Accessors are synchronous and never fail. Cloning hands out
/// additional independent readers.
#[derive(Debug, Clone)]
pub struct ReadingCache {
    rx: watch::Receiver<Reading>,
}

impl ReadingCache {
    pub(crate) fn new(rx: watch::Receiver<Reading>) -> Self {
        Self { rx }
    }

    /// The whole current snapshot.
    pub fn snapshot(&self) -> Reading {
        *self.rx.borrow()
    }

    /// Temperature in the configured unit.
    pub fn temperature(&self) -> f64 {
        self.rx.borrow().temperature
    }

    /// Relative humidity, whole percent.
    pub fn humidity(&self) -> u8 {
        self.rx.borrow().humidity
    }

    /// Air-quality category.
    pub fn air_quality(&self) -> AirQuality {
        self.rx.borrow().air_quality
    }

    /// PM2.5 now-cast average, µg/m³.
    pub fn pm2p5(&self) -> f64 {
        self.rx.borrow().pm2p5
    }

    /// PM10 now-cast average, µg/m³.
    pub fn pm10(&self) -> f64 {
        self.rx.borrow().pm10
    }

    /// Wait until the snapshot is next replaced.
    ///
    /// Returns `false` once the poller has gone away and no further updates
    /// can arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
