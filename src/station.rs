//! Wire model for the WeatherLink Live current-conditions document.
//!
//! The station answers `GET /v1/current_conditions` with a JSON body shaped
//! as `{ "data": { "conditions": [ ... ] }, "error": null }`. Only the fields
//! this poller consumes are modeled; everything else is ignored.

use serde::Deserialize;

/// Top-level response document.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub data: Option<ConditionsData>,
}

/// The `data` envelope around the sensor records.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionsData {
    #[serde(default)]
    pub conditions: Vec<ConditionRecord>,
}

/// One sensor record from the `conditions` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionRecord {
    /// Outdoor temperature, degrees Fahrenheit.
    pub temp: f64,
    /// Relative humidity, percent.
    pub hum: f64,
    /// PM2.5 now-cast average, µg/m³. The station omits it until the
    /// air-quality sensor has warmed up.
    #[serde(default)]
    pub pm_2p5_nowcast: f64,
    /// PM10 now-cast average, µg/m³.
    #[serde(default)]
    pub pm_10_nowcast: f64,
}

impl CurrentConditions {
    /// First entry of the `conditions` array; `None` when the array is
    /// missing or empty.
    pub fn current(&self) -> Option<&ConditionRecord> {
        self.data.as_ref().and_then(|d| d.conditions.first())
    }
}

/// Fahrenheit to Celsius, rounded to one decimal place.
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    ((f - 32.0) * (5.0 / 9.0) * 10.0).round() / 10.0
}
