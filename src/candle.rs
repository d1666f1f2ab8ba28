//! Single OHLC bar with derived classification
//!
//! A [`Candle`] is built either from the raw trade prices observed during one
//! period ([`CandleFactory::from_prices`]) or from a bar supplied by an external
//! feed ([`CandleFactory::from_bar`]). Once built it never changes; the owning
//! [`Chart`](crate::chart::Chart) only stamps its position on it.

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::{validate_bar, ChartError, Result, Trend, OHLCV};

/// Candles whose `close - open` falls below this value are classified bearish.
pub const DEFAULT_BEARISH_BELOW: f64 = 1.0;

// ============================================================
// TIMEFRAMES
// ============================================================

/// Standard candle periods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M15,
    M30,
    M45,
    #[default]
    H1,
    H2,
    H3,
    H4,
    H6,
    H12,
    H18,
    H24,
    H48,
    H72,
}

impl Timeframe {
    pub fn minutes(self) -> i64 {
        match self {
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::M45 => 45,
            Timeframe::H1 => 60,
            Timeframe::H2 => 2 * 60,
            Timeframe::H3 => 3 * 60,
            Timeframe::H4 => 4 * 60,
            Timeframe::H6 => 6 * 60,
            Timeframe::H12 => 12 * 60,
            Timeframe::H18 => 18 * 60,
            Timeframe::H24 => 24 * 60,
            Timeframe::H48 => 48 * 60,
            Timeframe::H72 => 72 * 60,
        }
    }

    #[inline]
    pub fn duration(self) -> Duration {
        Duration::minutes(self.minutes())
    }
}

// ============================================================
// CANDLE
// ============================================================

fn serialize_period<S: Serializer>(period: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_i64(period.num_seconds())
}

/// One OHLC bar with derived metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    range: f64,
    percent_change: f64,
    #[serde(serialize_with = "serialize_period")]
    period: Duration,
    start_time: DateTime<Utc>,
    total_volume: f64,
    trend: Trend,
    upper_tail: f64,
    lower_tail: f64,
    index: usize,
}

impl Candle {
    /// Build a one-hour candle from the trade prices of a period using the default threshold.
    pub fn from_prices(start_time: DateTime<Utc>, prices: &[f64], volume: f64) -> Result<Self> {
        CandleFactory::default().from_prices(start_time, prices, volume)
    }

    #[inline]
    pub fn open(&self) -> f64 {
        self.open
    }

    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }

    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[inline]
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Signed body: `close - open`
    #[inline]
    pub fn range(&self) -> f64 {
        self.range
    }

    #[inline]
    pub fn percent_change(&self) -> f64 {
        self.percent_change
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[inline]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[inline]
    pub fn total_volume(&self) -> f64 {
        self.total_volume
    }

    #[inline]
    pub fn trend(&self) -> Trend {
        self.trend
    }

    #[inline]
    pub fn upper_tail(&self) -> f64 {
        self.upper_tail
    }

    #[inline]
    pub fn lower_tail(&self) -> f64 {
        self.lower_tail
    }

    /// Position within the owning chart
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    // ===========================================
    // Predicates
    // ===========================================

    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.trend == Trend::Bullish
    }

    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.trend == Trend::Bearish
    }

    /// Open and close share the same integer part.
    ///
    /// This is a coarse test: 10.9 -> 10.1 is a doji, 10.9 -> 11.0 is not.
    #[inline]
    pub fn is_doji(&self) -> bool {
        self.open.floor() == self.close.floor()
    }

    /// Bullish candle whose lower tail is more than twice its upper tail
    #[inline]
    pub fn is_hammer(&self) -> bool {
        self.is_bullish() && self.lower_tail > 2.0 * self.upper_tail
    }

    /// High/low range strictly contains the other candle's high/low range.
    #[inline]
    pub fn engulfs(&self, other: &Candle) -> bool {
        self.high > other.high && self.low < other.low
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.total_volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.start_time.timestamp())
    }
}

// ============================================================
// FACTORY
// ============================================================

/// Builds candles with an explicit period and trend threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleFactory {
    period: Duration,
    bearish_below: f64,
}

impl Default for CandleFactory {
    fn default() -> Self {
        Self {
            period: Timeframe::H1.duration(),
            bearish_below: DEFAULT_BEARISH_BELOW,
        }
    }
}

impl CandleFactory {
    pub fn new(period: Duration, bearish_below: f64) -> Result<Self> {
        if period <= Duration::zero() {
            return Err(ChartError::InvalidValue("Candle period must be positive"));
        }
        if !bearish_below.is_finite() {
            return Err(ChartError::InvalidValue("Bearish threshold must be finite"));
        }
        Ok(Self {
            period,
            bearish_below,
        })
    }

    pub fn with_timeframe(timeframe: Timeframe) -> Self {
        Self {
            period: timeframe.duration(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[inline]
    pub fn bearish_below(&self) -> f64 {
        self.bearish_below
    }

    /// Build a candle from the ordered trade prices of one period.
    pub fn from_prices(&self, start_time: DateTime<Utc>, prices: &[f64], volume: f64) -> Result<Candle> {
        let (open, close) = match (prices.first(), prices.last()) {
            (Some(&open), Some(&close)) => (open, close),
            _ => return Err(ChartError::EmptyInput),
        };
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(ChartError::InvalidValue("Prices must be finite"));
        }

        let high = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let low = prices.iter().copied().fold(f64::INFINITY, f64::min);

        self.build(start_time, open, high, low, close, volume)
    }

    /// Build a candle from an externally supplied bar.
    ///
    /// Bars without a timestamp start at the Unix epoch.
    pub fn from_bar<T: OHLCV + ?Sized>(&self, bar: &T) -> Result<Candle> {
        validate_bar(bar, 0)?;
        let start_time = bar
            .timestamp()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_default();

        self.build(start_time, bar.open(), bar.high(), bar.low(), bar.close(), bar.volume())
    }

    fn build(
        &self,
        start_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Candle> {
        if open == 0.0 {
            return Err(ChartError::DivisionByZero);
        }

        let range = close - open;
        let (trend, upper_tail, lower_tail) = self.classify(open, high, low, close);

        Ok(Candle {
            open,
            high,
            low,
            close,
            range,
            percent_change: range * 100.0 / open,
            period: self.period,
            start_time: self.truncate(start_time),
            total_volume: volume,
            trend,
            upper_tail,
            lower_tail,
            index: 0,
        })
    }

    /// Re-derive period, start time, trend and tails of an existing candle.
    pub(crate) fn restamp(&self, candle: Candle) -> Candle {
        let (trend, upper_tail, lower_tail) =
            self.classify(candle.open, candle.high, candle.low, candle.close);
        Candle {
            period: self.period,
            start_time: self.truncate(candle.start_time),
            trend,
            upper_tail,
            lower_tail,
            ..candle
        }
    }

    /// Trend plus (upper, lower) tails
    fn classify(&self, open: f64, high: f64, low: f64, close: f64) -> (Trend, f64, f64) {
        if close - open < self.bearish_below {
            (Trend::Bearish, high - open, close - low)
        } else {
            (Trend::Bullish, high - close, open - low)
        }
    }

    #[inline]
    fn truncate(&self, start_time: DateTime<Utc>) -> DateTime<Utc> {
        start_time.duration_trunc(self.period).unwrap_or(start_time)
    }
}

// ============================================================
// TESTS
// ============================================================
