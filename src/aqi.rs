//! Air-quality classification from particulate now-cast averages.

use serde::{Deserialize, Serialize};

/// PM2.5 breakpoints (µg/m³), paired by index with [`PM10_LIMITS`].
const PM2P5_LIMITS: [f64; 4] = [15.0, 30.0, 55.0, 110.0];

/// PM10 breakpoints (µg/m³).
const PM10_LIMITS: [f64; 4] = [25.0, 50.0, 90.0, 180.0];

/// Air-quality category, ordered from no-data to worst.
///
/// `Unknown` means the particulate sensor has not reported yet (both
/// now-cast averages exactly zero), not that the air is clean.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AirQuality {
    #[default]
    Unknown,
    Excellent,
    Good,
    Fair,
    Inferior,
    Poor,
}

impl AirQuality {
    /// Get the category name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Inferior => "inferior",
            Self::Poor => "poor",
        }
    }
}

impl std::fmt::Display for AirQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a PM2.5/PM10 now-cast pair into an air-quality category.
///
/// The first breakpoint row that both values fall within (≤) wins. A pair
/// that straddles rows is re-tested whole against each following row, so the
/// laxer value within a row can pull the result down a tier; this mirrors the
/// station firmware's published classification rather than taking the worse
/// of the two values independently.
pub fn classify(pm2p5: f64, pm10: f64) -> AirQuality {
    if pm2p5 == 0.0 && pm10 == 0.0 {
        return AirQuality::Unknown;
    }

    const TIERS: [AirQuality; 4] = [
        AirQuality::Excellent,
        AirQuality::Good,
        AirQuality::Fair,
        AirQuality::Inferior,
    ];

    for (i, tier) in TIERS.into_iter().enumerate() {
        if pm2p5 <= PM2P5_LIMITS[i] && pm10 <= PM10_LIMITS[i] {
            return tier;
        }
    }
    AirQuality::Poor
}
