//! # candlechart
//!
//! Candlestick chart navigation, trend scoring and reversal/continuation pattern matching.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlechart::prelude::*;
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//!
//! // Trade prices observed in each hourly period
//! let periods: [&[f64]; 5] = [
//!     &[20.0, 20.5, 18.0],
//!     &[18.0, 18.2, 16.0],
//!     &[16.0, 16.4, 14.0],
//!     &[14.0, 14.1, 12.0],
//!     &[12.0, 12.3, 10.0],
//! ];
//!
//! let candles = periods
//!     .iter()
//!     .enumerate()
//!     .map(|(i, prices)| Candle::from_prices(start + Duration::hours(i as i64), prices, 10.0))
//!     .collect::<Result<Vec<_>>>()
//!     .unwrap();
//!
//! let mut chart = Chart::new(candles);
//! let found = chart.detect_patterns().unwrap();
//! assert_eq!(found[0].kind, PatternKind::BearishGenericPattern);
//! ```

pub mod candle;
pub mod chart;
pub mod config;
pub mod matcher;
pub mod patterns;
pub mod rules;
pub mod trend;

pub mod prelude {
    pub use crate::{
        // Candles
        candle::{Candle, CandleFactory, Timeframe, DEFAULT_BEARISH_BELOW},
        // Chart
        chart::Chart,
        // Configuration
        config::{ChartConfig, DuplicatePolicy, ParamMeta, ParamType},
        // Matching
        matcher::{Detection, MatcherBuilder, PatternMatcher},
        patterns::{PatternKind, PatternRecord},
        rules::{Rule, Trigger, CATALOG},
        // Parallel
        scan_parallel,
        // Trend scoring
        trend::{all_bearish, all_bullish, score_series, score_trend, LineChart},
        // Errors
        ChartError,
        Direction,
        Period,
        Result,
        ScanError,
        ScanResult,
        Trend,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ChartError>;

/// Errors raised by candle construction, chart navigation and pattern scanning
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    #[error("Empty input: a candle needs at least one price")]
    EmptyInput,

    #[error("Division by zero: opening price is zero")]
    DivisionByZero,

    #[error("No more candles beyond index {index}")]
    NoMoreCandles { index: usize },

    #[error("Insufficient window: need {need} candles, got {got}")]
    InsufficientWindow { need: usize, got: usize },

    #[error("Insufficient lookback: need {need} candles, got {got}")]
    InsufficientLookback { need: usize, got: usize },

    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

impl ChartError {
    /// True for errors caused by walking off either end of a chart.
    ///
    /// Pattern rules that hit one of these are skipped rather than failing the scan.
    #[inline]
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            ChartError::NoMoreCandles { .. } | ChartError::InsufficientLookback { .. }
        )
    }
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Candle count (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(ChartError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV INPUT
// ============================================================

/// Bar supplied by an external market-data source
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Start of the bar as Unix seconds, when known.
    fn timestamp(&self) -> Option<i64> {
        None
    }
}

impl<T: OHLCV + ?Sized> OHLCV for &T {
    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }

    fn volume(&self) -> f64 {
        (**self).volume()
    }

    fn timestamp(&self) -> Option<i64> {
        (**self).timestamp()
    }
}

/// Validate OHLCV data consistency
pub(crate) fn validate_bar<T: OHLCV + ?Sized>(bar: &T, index: usize) -> Result<()> {
    let values = [bar.open(), bar.high(), bar.low(), bar.close(), bar.volume()];
    if values.iter().any(|v| v.is_nan()) {
        return Err(ChartError::InvalidOHLCV {
            index,
            reason: "NaN in OHLCV",
        });
    }
    if values.iter().any(|v| v.is_infinite()) {
        return Err(ChartError::InvalidOHLCV {
            index,
            reason: "Infinite value in OHLCV",
        });
    }
    if bar.high() < bar.low() {
        return Err(ChartError::InvalidOHLCV {
            index,
            reason: "high < low",
        });
    }
    let inside = |v: f64| bar.low() <= v && v <= bar.high();
    if !inside(bar.open()) || !inside(bar.close()) {
        return Err(ChartError::InvalidOHLCV {
            index,
            reason: "open/close outside high/low",
        });
    }
    Ok(())
}

// ============================================================
// TREND / DIRECTION
// ============================================================

/// Directional label of a candle or a run of candles
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Indifferent,
}

impl Trend {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Trend::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Trend::Bearish)
    }

    #[inline]
    pub fn is_indifferent(self) -> bool {
        matches!(self, Trend::Indifferent)
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Trend::Bullish => "Bullish",
            Trend::Bearish => "Bearish",
            Trend::Indifferent => "Indifferent",
        };
        f.write_str(name)
    }
}

/// Which result list a pattern belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

impl From<Direction> for Trend {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Bullish => Trend::Bullish,
            Direction::Bearish => Trend::Bearish,
        }
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use chart::Chart;
use matcher::PatternMatcher;
use patterns::PatternRecord;
use rayon::prelude::*;

/// Records appended to a single instrument's chart
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub patterns: Vec<PatternRecord>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: ChartError,
}

/// Scan independent charts on the rayon pool.
///
/// Each chart is borrowed mutably by exactly one worker, so no chart is ever
/// scanned by two callers at once.
pub fn scan_parallel<'a, I>(matcher: &PatternMatcher, charts: I) -> (Vec<ScanResult>, Vec<ScanError>)
where
    I: IntoParallelIterator<Item = (&'a str, &'a mut Chart)>,
{
    let results: Vec<_> = charts
        .into_par_iter()
        .map(|(symbol, chart)| {
            chart
                .detect_with(matcher)
                .map(|patterns| ScanResult {
                    symbol: symbol.to_string(),
                    patterns,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
