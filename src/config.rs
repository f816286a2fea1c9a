//! Engine configuration
//!
//! [`ForecastConfig`] is plain data: build it in code, through
//! [`EngineBuilder`](crate::EngineBuilder), or load it from JSON.
//!
//! ```rust
//! use ohlc_forecast::config::ForecastConfig;
//!
//! let config = ForecastConfig::from_json_str(r#"{ "window": 20 }"#).unwrap();
//! assert_eq!(config.window.get(), 20);
//! assert!(config.validate_data);
//! ```

use std::path::Path;

use crate::{analytics::ConfidenceMetric, Period};

/// Errors loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Settings for [`ForecastEngine`](crate::ForecastEngine)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
  /// ATR window in bars
  pub window: Period,
  pub confidence_metric: ConfidenceMetric,
  /// Reject malformed bars instead of trusting the caller
  pub validate_data: bool,
}

impl Default for ForecastConfig {
  fn default() -> Self {
    Self {
      window: Period::default(),
      confidence_metric: ConfidenceMetric::default(),
      validate_data: true,
    }
  }
}

impl ForecastConfig {
  /// Parse a JSON document; the window is checked by `Period`'s deserializer
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    Self::from_json_str(&text)
  }
}
