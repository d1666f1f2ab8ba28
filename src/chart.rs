//! Candle chart: an indexed, immutable run of candles plus the patterns found in it
//!
//! Candles live in a single vector and every candle carries its position, so
//! navigation is plain index arithmetic. Navigation keys off the candle's index
//! only; passing a candle from another chart navigates this chart at that index.

use log::{debug, trace};
use serde::Serialize;

use crate::{
    candle::{Candle, CandleFactory},
    config::{ChartConfig, DuplicatePolicy},
    matcher::PatternMatcher,
    patterns::{PatternKind, PatternRecord},
    trend::score_trend,
    ChartError, Direction, Result, OHLCV,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Chart {
    candles: Vec<Candle>,
    config: ChartConfig,
    bullish_patterns: Vec<PatternRecord>,
    bearish_patterns: Vec<PatternRecord>,
}

impl Chart {
    /// Build a chart with the default configuration.
    ///
    /// Candles are re-derived under the default one-hour period and trend
    /// threshold, whatever factory built them.
    pub fn new(candles: Vec<Candle>) -> Self {
        let factory = CandleFactory::default();
        Self::assemble(
            candles.into_iter().map(|c| factory.restamp(c)),
            ChartConfig::default(),
        )
    }

    /// Build a chart whose candles follow `config`'s timeframe and trend threshold.
    pub fn with_config(candles: Vec<Candle>, config: ChartConfig) -> Result<Self> {
        config.validate()?;
        let factory = config.candle_factory()?;
        Ok(Self::assemble(
            candles.into_iter().map(|c| factory.restamp(c)),
            config,
        ))
    }

    /// Build a chart from externally supplied bars, oldest first.
    pub fn from_bars<T: OHLCV>(bars: &[T], config: ChartConfig) -> Result<Self> {
        config.validate()?;
        let factory = config.candle_factory()?;

        let candles = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                factory.from_bar(bar).map_err(|e| match e {
                    ChartError::InvalidOHLCV { reason, .. } => {
                        ChartError::InvalidOHLCV { index: i, reason }
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::assemble(candles, config))
    }

    /// Stamp each candle with its position.
    fn assemble<I: IntoIterator<Item = Candle>>(candles: I, config: ChartConfig) -> Self {
        let candles = candles
            .into_iter()
            .enumerate()
            .map(|(i, candle)| candle.with_index(i))
            .collect();

        Self {
            candles,
            config,
            bullish_patterns: Vec::new(),
            bearish_patterns: Vec::new(),
        }
    }

    // ===========================================
    // Accessors
    // ===========================================

    #[inline]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    #[inline]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    #[inline]
    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    #[inline]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[inline]
    pub fn pattern_window(&self) -> usize {
        self.config.pattern_window.get()
    }

    /// The trailing `pattern_window` candles.
    pub fn window(&self) -> Result<&[Candle]> {
        let need = self.pattern_window();
        let got = self.len();
        if got < need {
            return Err(ChartError::InsufficientWindow { need, got });
        }
        Ok(&self.candles[got - need..])
    }

    // ===========================================
    // Navigation
    // ===========================================

    fn position(&self, candle: &Candle) -> Result<usize> {
        let index = candle.index();
        if index >= self.len() {
            return Err(ChartError::NoMoreCandles { index });
        }
        Ok(index)
    }

    /// The candle right after `candle`.
    pub fn next(&self, candle: &Candle) -> Result<&Candle> {
        let index = self.position(candle)?;
        self.candles
            .get(index + 1)
            .ok_or(ChartError::NoMoreCandles { index })
    }

    /// The candle right before `candle`.
    pub fn previous(&self, candle: &Candle) -> Result<&Candle> {
        let index = self.position(candle)?;
        if index == 0 {
            return Err(ChartError::NoMoreCandles { index });
        }
        Ok(&self.candles[index - 1])
    }

    /// Exactly `n` candles after `candle`, nearest first.
    pub fn next_n(&self, n: usize, candle: &Candle) -> Result<Vec<&Candle>> {
        let index = self.position(candle)?;
        let available = self.len() - index - 1;
        if n > available {
            return Err(ChartError::NoMoreCandles { index });
        }
        Ok(self.candles[index + 1..=index + n].iter().collect())
    }

    /// Exactly `n` candles before `candle`, nearest first.
    ///
    /// Fails without returning anything when fewer than `n` candles precede it.
    pub fn previous_n(&self, n: usize, candle: &Candle) -> Result<Vec<&Candle>> {
        let index = self.position(candle)?;
        if n > index {
            return Err(ChartError::InsufficientLookback { need: n, got: index });
        }
        Ok(self.candles[index - n..index].iter().rev().collect())
    }

    // ===========================================
    // Pattern results
    // ===========================================

    #[inline]
    pub fn bullish_patterns(&self) -> &[PatternRecord] {
        &self.bullish_patterns
    }

    #[inline]
    pub fn bearish_patterns(&self) -> &[PatternRecord] {
        &self.bearish_patterns
    }

    /// All recorded patterns, bullish first.
    pub fn patterns(&self) -> impl Iterator<Item = &PatternRecord> {
        self.bullish_patterns.iter().chain(self.bearish_patterns.iter())
    }

    pub fn clear_patterns(&mut self) {
        self.bullish_patterns.clear();
        self.bearish_patterns.clear();
    }

    /// Record `kind` anchored at the candle with index `anchor`.
    ///
    /// The preceding trend is scored over the `trend_lookback` candles before the
    /// anchor. When those candles don't exist the match is dropped and `None` is
    /// returned; this is not an error.
    pub fn add_pattern(&mut self, anchor: usize, kind: PatternKind) -> Option<PatternRecord> {
        let lookback = self.config.trend_lookback.get();
        let preceding_trend = {
            let Some(candle) = self.candles.get(anchor) else {
                debug!("{} dropped: anchor {} is outside the chart", kind, anchor);
                return None;
            };
            match self.previous_n(lookback, candle) {
                Ok(before) => score_trend(before),
                Err(e) => {
                    debug!("{} at {} dropped: {}", kind, anchor, e);
                    return None;
                }
            }
        };

        let policy = self.config.duplicates;
        let list = match kind.direction() {
            Direction::Bullish => &mut self.bullish_patterns,
            Direction::Bearish => &mut self.bearish_patterns,
        };
        if policy == DuplicatePolicy::SkipExisting
            && list.iter().any(|r| r.kind == kind && r.anchor == anchor)
        {
            trace!("{} at {} already recorded", kind, anchor);
            return None;
        }

        let record = PatternRecord {
            kind,
            preceding_trend,
            anchor,
        };
        list.push(record);
        Some(record)
    }

    // ===========================================
    // Detection
    // ===========================================

    /// Scan the trailing window against the full catalog.
    ///
    /// Returns the records appended by this call.
    pub fn detect_patterns(&mut self) -> Result<Vec<PatternRecord>> {
        self.detect_with(&PatternMatcher::default())
    }

    /// Scan the trailing window with a custom matcher.
    pub fn detect_with(&mut self, matcher: &PatternMatcher) -> Result<Vec<PatternRecord>> {
        let detections = matcher.scan(self)?;
        Ok(detections
            .into_iter()
            .filter_map(|d| self.add_pattern(d.anchor, d.kind))
            .collect())
    }
}

// ============================================================
// TESTS
// ============================================================
