//! Chart configuration and parameter metadata
//!
//! Everything the matcher needs (window size, trend look-back, the bearish
//! threshold) lives in [`ChartConfig`] and is handed to a chart when it is built.
//! Nothing is read from ambient global state.
//!
//! # Example
//!
//! ```rust
//! use candlechart::prelude::*;
//!
//! let config = ChartConfig::from_toml_str(
//!   r#"
//!   pattern_window = 8
//!   bearish_below = 0.0
//!   "#,
//! )
//! .unwrap();
//! assert_eq!(config.pattern_window.get(), 8);
//! assert_eq!(config.trend_lookback.get(), 3);
//!
//! for param in ChartConfig::param_meta() {
//!   println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::{collections::HashMap, fs, path::Path};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
  candle::{CandleFactory, Timeframe, DEFAULT_BEARISH_BELOW},
  ChartError, Period, Result,
};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Price threshold (any finite value)
  Threshold,
  /// Candle count (positive integer)
  Period,
}

/// Metadata for a single configuration parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "pattern_window")
  pub name: &'static str,
  /// Parameter type (Threshold or Period)
  pub param_type: ParamType,
  /// Default value
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn threshold(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Threshold, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if !value.is_finite() {
      return Err(ChartError::InvalidValue("Parameter must be finite"));
    }
    if value < min || value > max {
      return Err(ChartError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Threshold => Ok(()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(ChartError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

static PARAMS: [ParamMeta; 3] = [
  ParamMeta::period(
    "pattern_window",
    5.0,
    (1.0, 50.0, 1.0),
    "Number of trailing candles scanned per detection call",
  ),
  ParamMeta::period(
    "trend_lookback",
    3.0,
    (1.0, 20.0, 1.0),
    "Candles before a pattern's anchor used to score the preceding trend",
  ),
  ParamMeta::threshold(
    "bearish_below",
    DEFAULT_BEARISH_BELOW,
    (-10.0, 10.0, 0.5),
    "Candles with close - open below this value are bearish",
  ),
];

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  Period::new(value as usize)
}

// ============================================================
// CHART CONFIG
// ============================================================

/// How repeated detections of the same pattern at the same anchor are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
  /// A (kind, anchor) pair already in the result list is not appended again
  #[default]
  SkipExisting,
  /// Every detection is appended
  Keep,
}

/// Settings a chart and its matcher run with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
  /// Trailing candles scanned per detection call
  pub pattern_window: Period,
  /// Candles before an anchor that decide its preceding trend
  pub trend_lookback: Period,
  /// Trend threshold on `close - open`
  pub bearish_below: f64,
  /// Period of candles built from raw prices
  pub timeframe: Timeframe,
  pub duplicates: DuplicatePolicy,
}

impl Default for ChartConfig {
  fn default() -> Self {
    Self {
      pattern_window: Period::new_const(5),
      trend_lookback: Period::new_const(3),
      bearish_below: DEFAULT_BEARISH_BELOW,
      timeframe: Timeframe::H1,
      duplicates: DuplicatePolicy::SkipExisting,
    }
  }
}

impl ChartConfig {
  pub fn validate(&self) -> Result<()> {
    if !self.bearish_below.is_finite() {
      return Err(ChartError::InvalidValue("bearish_below must be finite"));
    }
    Ok(())
  }

  /// Candle factory matching this configuration
  pub fn candle_factory(&self) -> Result<CandleFactory> {
    CandleFactory::new(self.timeframe.duration(), self.bearish_below)
  }

  /// Returns metadata for all numeric parameters
  pub fn param_meta() -> &'static [ParamMeta] {
    &PARAMS
  }

  /// Build a config from a parameter map; missing parameters use their defaults.
  pub fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    for meta in Self::param_meta() {
      if let Some(&value) = params.get(meta.name) {
        meta.validate(value)?;
      }
    }

    let config = Self {
      pattern_window: get_period(params, "pattern_window", 5)?,
      trend_lookback: get_period(params, "trend_lookback", 3)?,
      bearish_below: params.get("bearish_below").copied().unwrap_or(DEFAULT_BEARISH_BELOW),
      ..Self::default()
    };
    config.validate()?;
    Ok(config)
  }

  pub fn from_toml_str(content: &str) -> Result<Self> {
    let config: Self =
      toml::from_str(content).map_err(|e| ChartError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_json_str(content: &str) -> Result<Self> {
    let config: Self =
      serde_json::from_str(content).map_err(|e| ChartError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  /// Load from a `.toml` or `.json` file, chosen by extension.
  pub fn load(path: &Path) -> Result<Self> {
    debug!("loading chart config from {}", path.display());
    let content = fs::read_to_string(path)
      .map_err(|e| ChartError::InvalidConfig(format!("{}: {}", path.display(), e)))?;

    let config = match path.extension().and_then(|ext| ext.to_str()) {
      Some("toml") => Self::from_toml_str(&content)?,
      Some("json") => Self::from_json_str(&content)?,
      _ => {
        return Err(ChartError::InvalidConfig(format!(
          "{}: unsupported config format",
          path.display()
        )))
      },
    };

    info!(
      "chart config loaded from {} (window {}, lookback {})",
      path.display(),
      config.pattern_window.get(),
      config.trend_lookback.get()
    );
    Ok(config)
  }
}

// ============================================================
// TESTS
// ============================================================
