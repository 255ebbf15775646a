//! Station configuration: YAML loading, defaults, and validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default polling interval (300 seconds).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// Minimum allowed polling interval (1 second).
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Default HTTP request timeout (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn default_name() -> String {
    "WeatherLink Live".to_string()
}

fn default_manufacturer() -> String {
    "Davis".to_string()
}

fn default_model() -> String {
    "Default".to_string()
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Temperature unit the read accessors serve.
///
/// The station always reports Fahrenheit; `Celsius` converts on derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Get the unit as its config-file string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "C" => Ok(Self::Celsius),
            "F" => Ok(Self::Fahrenheit),
            other => Err(format!(
                "unknown temperature unit '{}', expected C or F",
                other
            )),
        }
    }
}

impl TryFrom<String> for TemperatureUnit {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TemperatureUnit> for String {
    fn from(unit: TemperatureUnit) -> Self {
        unit.as_str().to_string()
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable station configuration, fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Station endpoint URL. Supports `${VAR}` / `${VAR:-default}`
    /// environment-variable expansion.
    pub url: String,

    /// Display name (default: "WeatherLink Live").
    #[serde(default = "default_name")]
    pub name: String,

    /// Manufacturer string (default: "Davis").
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    /// Model string (default: "Default").
    #[serde(default = "default_model")]
    pub model: String,

    /// Polling interval (default: 300s, clamped to a 1s minimum).
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub polling_interval: Duration,

    /// Temperature unit for served readings (default: C).
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,

    /// Per-request HTTP timeout (default: 10s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl StationConfig {
    /// Create a configuration with defaults for everything but the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: default_name(),
            manufacturer: default_manufacturer(),
            model: default_model(),
            polling_interval: DEFAULT_INTERVAL,
            temperature_unit: TemperatureUnit::default(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the manufacturer string.
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// Set the model string.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the polling interval.
    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    /// Set the temperature unit.
    pub fn with_temperature_unit(mut self, unit: TemperatureUnit) -> Self {
        self.temperature_unit = unit;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from a YAML file and normalize it.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.normalized()
    }

    /// Expand environment variables in the URL, clamp the interval, and
    /// validate. Idempotent, so overrides can be applied on a loaded config
    /// and the result normalized again.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn normalized(mut self) -> Result<Self, ConfigError> {
        self.url = expand_env_vars(&self.url);

        if self.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "station url must not be empty".to_string(),
            ));
        }
        let parsed = reqwest::Url::parse(&self.url).map_err(|e| {
            ConfigError::Validation(format!("invalid station url '{}': {}", self.url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "station url must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.polling_interval < MIN_INTERVAL {
            tracing::warn!(
                min_interval = ?MIN_INTERVAL,
                "Polling interval below minimum allowed, clamping"
            );
            self.polling_interval = MIN_INTERVAL;
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "request_timeout must be positive".to_string(),
            ));
        }

        Ok(self)
    }
}

/// Expand environment variables in a string.
/// Supports ${VAR} and ${VAR:-default} syntax.
pub fn expand_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

    let regex = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("failed to compile env var regex")
    });

    regex
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_yaml_gets_defaults() {
        let config: StationConfig =
            serde_yaml::from_str("url: http://192.168.1.30/v1/current_conditions").unwrap();
        assert_eq!(config.name, "WeatherLink Live");
        assert_eq!(config.manufacturer, "Davis");
        assert_eq!(config.model, "Default");
        assert_eq!(config.polling_interval, Duration::from_secs(300));
        assert_eq!(config.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_yaml_humantime_interval() {
        let config: StationConfig =
            serde_yaml::from_str("url: http://host/v1\npolling_interval: 5m").unwrap();
        assert_eq!(config.polling_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_unit_parse_case_insensitive() {
        assert_eq!(
            "f".parse::<TemperatureUnit>().unwrap(),
            TemperatureUnit::Fahrenheit
        );
        assert_eq!(
            "c".parse::<TemperatureUnit>().unwrap(),
            TemperatureUnit::Celsius
        );
        let config: StationConfig =
            serde_yaml::from_str("url: http://host/v1\ntemperature_unit: f").unwrap();
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_unknown_unit_rejected() {
        assert!("kelvin".parse::<TemperatureUnit>().is_err());
        let result: Result<StationConfig, _> =
            serde_yaml::from_str("url: http://host/v1\ntemperature_unit: K");
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_clamps_short_interval() {
        let config = StationConfig::new("http://host/v1")
            .with_polling_interval(Duration::from_millis(100))
            .normalized()
            .unwrap();
        assert_eq!(config.polling_interval, MIN_INTERVAL);
    }

    #[test]
    fn test_normalize_rejects_empty_url() {
        let result = StationConfig::new("").normalized();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_normalize_rejects_non_http_scheme() {
        let result = StationConfig::new("ftp://host/v1").normalized();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_normalize_rejects_zero_timeout() {
        let result = StationConfig::new("http://host/v1")
            .with_request_timeout(Duration::ZERO)
            .normalized();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_url_env_expansion_with_default() {
        let config = StationConfig::new(
            "http://${WEATHERLINK_HOST_MISSING_12345:-192.168.1.30}/v1/current_conditions",
        )
        .normalized()
        .unwrap();
        assert_eq!(config.url, "http://192.168.1.30/v1/current_conditions");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "url: http://192.168.1.30/v1/current_conditions\nname: Backyard\npolling_interval: 60s\ntemperature_unit: F"
        )
        .unwrap();

        let config = StationConfig::load(file.path()).unwrap();
        assert_eq!(config.name, "Backyard");
        assert_eq!(config.polling_interval, Duration::from_secs(60));
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_load_missing_file() {
        let result = StationConfig::load("/nonexistent/weatherlink.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_builder_chain() {
        let config = StationConfig::new("http://host/v1")
            .with_name("Roof")
            .with_manufacturer("Davis Instruments")
            .with_model("6100")
            .with_temperature_unit(TemperatureUnit::Fahrenheit)
            .with_polling_interval(Duration::from_secs(60));
        assert_eq!(config.name, "Roof");
        assert_eq!(config.manufacturer, "Davis Instruments");
        assert_eq!(config.model, "6100");
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(config.polling_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_unit_roundtrips_through_serde() {
        let yaml = serde_yaml::to_string(&TemperatureUnit::Fahrenheit).unwrap();
        assert_eq!(yaml.trim(), "F");
        let parsed: TemperatureUnit = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, TemperatureUnit::Fahrenheit);
    }
}
