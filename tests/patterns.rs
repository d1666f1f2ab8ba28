//! Integration tests for candlechart pattern detection.
//!
//! These tests drive the public API end to end: external bars in, pattern
//! records out.

use candlechart::prelude::*;
use chrono::{TimeZone, Utc};

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
        Self { o, h, l, c }
    }
}

impl OHLCV for TestBar {
    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> f64 {
        1000.0
    }
}

fn bars(raw: &[(f64, f64, f64, f64)]) -> Vec<TestBar> {
    raw.iter().map(|&(o, h, l, c)| TestBar::new(o, h, l, c)).collect()
}

fn chart_of(raw: &[(f64, f64, f64, f64)]) -> Chart {
    Chart::from_bars(&bars(raw), ChartConfig::default()).unwrap()
}

/// Three bearish candles stepping down by two
const SELL_OFF: [(f64, f64, f64, f64); 3] = [
    (30.0, 31.0, 27.0, 28.0),
    (28.0, 29.0, 25.0, 26.0),
    (26.0, 27.0, 23.0, 24.0),
];

fn record(kind: PatternKind, preceding_trend: Trend, anchor: usize) -> PatternRecord {
    PatternRecord {
        kind,
        preceding_trend,
        anchor,
    }
}

// ============================================================
// ENDING BEARISH
// ============================================================

#[test]
fn test_bearish_engulfing_and_key_reversal() {
    let mut chart = chart_of(&[
        (10.0, 10.5, 7.5, 8.0),
        (8.0, 12.5, 7.8, 12.0),
        (12.0, 12.4, 10.8, 11.0),
        (9.0, 13.5, 8.5, 13.0),
        (14.0, 15.0, 6.0, 7.0),
    ]);

    let found = chart.detect_patterns().unwrap();
    let expected = vec![
        record(PatternKind::BearishEngulfing, Trend::Bearish, 3),
        record(PatternKind::BearishKeyReversal, Trend::Bearish, 3),
    ];
    assert_eq!(found, expected);
    assert_eq!(chart.bearish_patterns(), expected.as_slice());
    assert!(chart.bullish_patterns().is_empty());
}

#[test]
fn test_falling_three_after_sell_off() {
    let mut raw = SELL_OFF.to_vec();
    raw.extend_from_slice(&[
        (20.0, 21.0, 10.0, 11.0),
        (12.0, 14.0, 11.5, 13.5),
        (13.0, 15.0, 12.5, 14.5),
        (14.0, 16.0, 13.5, 15.5),
        (15.0, 15.5, 8.0, 9.0),
    ]);
    let mut chart = chart_of(&raw);

    let found = chart.detect_patterns().unwrap();
    assert_eq!(found, vec![record(PatternKind::BearishFallingThree, Trend::Bearish, 3)]);
}

#[test]
fn test_falling_three_without_history_is_dropped() {
    // The formation anchors at index 0, which has no preceding candles to score
    let mut chart = chart_of(&[
        (20.0, 21.0, 10.0, 11.0),
        (12.0, 14.0, 11.5, 13.5),
        (13.0, 15.0, 12.5, 14.5),
        (14.0, 16.0, 13.5, 15.5),
        (15.0, 15.5, 8.0, 9.0),
    ]);

    assert!(chart.detect_patterns().unwrap().is_empty());
    assert_eq!(chart.patterns().count(), 0);
}

#[test]
fn test_generic_bearish_run() {
    let mut raw = SELL_OFF.to_vec();
    raw.extend_from_slice(&[(24.0, 25.0, 21.0, 22.0), (22.0, 23.0, 19.0, 20.0)]);
    let mut chart = chart_of(&raw);

    let found = chart.detect_patterns().unwrap();
    assert_eq!(found, vec![record(PatternKind::BearishGenericPattern, Trend::Bearish, 4)]);
}

#[test]
fn test_no_pattern_after_bearish_candle() {
    // Open/close pairs only; the candle before last is bearish
    let mut chart = chart_of(&[
        (10.0, 10.0, 8.0, 8.0),
        (8.0, 12.0, 8.0, 12.0),
        (12.0, 12.0, 11.0, 11.0),
        (11.0, 11.0, 9.0, 9.0),
        (9.0, 9.0, 7.0, 7.0),
    ]);

    assert!(chart.detect_patterns().unwrap().is_empty());
}

// ============================================================
// ENDING BULLISH
// ============================================================

#[test]
fn test_bullish_engulfing_and_key_reversal() {
    let mut raw = SELL_OFF.to_vec();
    raw.extend_from_slice(&[(13.0, 13.5, 8.5, 9.0), (8.0, 15.0, 6.0, 14.0)]);
    let mut chart = chart_of(&raw);

    let found = chart.detect_patterns().unwrap();
    assert_eq!(
        found,
        vec![
            record(PatternKind::BullishEngulfing, Trend::Bearish, 3),
            record(PatternKind::BullishKeyReversal, Trend::Bearish, 3),
        ]
    );
    assert_eq!(chart.bullish_patterns().len(), 2);
    assert!(chart.bearish_patterns().is_empty());
}

// ============================================================
// ENDING IN A DOJI
// ============================================================

#[test]
fn test_doji_arms_both_groups() {
    // The doji closes only 0.4 above its open, so it is also a bearish candle
    let mut raw = SELL_OFF.to_vec();
    raw.extend_from_slice(&[(20.0, 22.0, 8.0, 10.0), (15.2, 16.0, 14.0, 15.6)]);
    let mut chart = chart_of(&raw);

    let found = chart.detect_patterns().unwrap();
    assert_eq!(
        found,
        vec![
            record(PatternKind::BearishGenericPattern, Trend::Bearish, 4),
            record(PatternKind::BullishHaramiCross, Trend::Bearish, 3),
        ]
    );
    assert_eq!(chart.bullish_patterns().len(), 1);
    assert_eq!(chart.bearish_patterns().len(), 1);
}

// ============================================================
// CHART API
// ============================================================

#[test]
fn test_repeated_detection_skips_existing() {
    let mut raw = SELL_OFF.to_vec();
    raw.extend_from_slice(&[(24.0, 25.0, 21.0, 22.0), (22.0, 23.0, 19.0, 20.0)]);
    let mut chart = chart_of(&raw);

    assert_eq!(chart.detect_patterns().unwrap().len(), 1);
    assert!(chart.detect_patterns().unwrap().is_empty());
    assert_eq!(chart.bearish_patterns().len(), 1);
}

#[test]
fn test_repeated_detection_keeps_duplicates() {
    let mut raw = SELL_OFF.to_vec();
    raw.extend_from_slice(&[(24.0, 25.0, 21.0, 22.0), (22.0, 23.0, 19.0, 20.0)]);
    let config = ChartConfig {
        duplicates: DuplicatePolicy::Keep,
        ..Default::default()
    };
    let mut chart = Chart::from_bars(&bars(&raw), config).unwrap();

    chart.detect_patterns().unwrap();
    chart.detect_patterns().unwrap();
    assert_eq!(chart.bearish_patterns().len(), 2);
    assert_eq!(chart.bearish_patterns()[0], chart.bearish_patterns()[1]);
}

#[test]
fn test_short_chart_fails_without_recording() {
    let mut chart = chart_of(&SELL_OFF);

    assert_eq!(
        chart.detect_patterns(),
        Err(ChartError::InsufficientWindow { need: 5, got: 3 })
    );
    assert!(chart.bullish_patterns().is_empty());
    assert!(chart.bearish_patterns().is_empty());
}

#[test]
fn test_config_from_toml() {
    let config = ChartConfig::from_toml_str("pattern_window = 2\ntrend_lookback = 1\n").unwrap();
    let mut chart = Chart::from_bars(
        &bars(&[(10.0, 10.5, 7.5, 8.0), (9.0, 13.5, 8.5, 13.0), (14.0, 15.0, 6.0, 7.0)]),
        config,
    )
    .unwrap();

    let found = chart.detect_patterns().unwrap();
    assert_eq!(
        found,
        vec![
            record(PatternKind::BearishEngulfing, Trend::Bearish, 1),
            record(PatternKind::BearishKeyReversal, Trend::Bearish, 1),
        ]
    );
}

#[test]
fn test_custom_matcher() {
    let matcher = PatternMatcher::builder()
        .with_catalog()
        .only_patterns(&[PatternKind::BearishKeyReversal])
        .build()
        .unwrap();

    let mut chart = chart_of(&[
        (10.0, 10.5, 7.5, 8.0),
        (8.0, 12.5, 7.8, 12.0),
        (12.0, 12.4, 10.8, 11.0),
        (9.0, 13.5, 8.5, 13.0),
        (14.0, 15.0, 6.0, 7.0),
    ]);
    let found = chart.detect_with(&matcher).unwrap();
    assert_eq!(found, vec![record(PatternKind::BearishKeyReversal, Trend::Bearish, 3)]);
}

#[test]
fn test_from_bars_rejects_bad_bar() {
    let mut raw = bars(&SELL_OFF);
    raw.push(TestBar::new(10.0, 9.0, 11.0, 10.0));

    assert_eq!(
        Chart::from_bars(&raw, ChartConfig::default()).unwrap_err(),
        ChartError::InvalidOHLCV {
            index: 3,
            reason: "high < low"
        }
    );

    // Close below the reported low
    let mut raw = bars(&SELL_OFF);
    raw.insert(1, TestBar::new(20.0, 21.0, 18.0, 17.5));
    assert_eq!(
        Chart::from_bars(&raw, ChartConfig::default()).unwrap_err(),
        ChartError::InvalidOHLCV {
            index: 1,
            reason: "open/close outside high/low"
        }
    );
}

#[test]
fn test_candles_from_prices() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let candle = Candle::from_prices(start, &[10.0, 12.0, 9.0, 11.5], 42.0).unwrap();

    assert_eq!(candle.high(), 12.0);
    assert_eq!(candle.low(), 9.0);
    assert_eq!(candle.range(), 1.5);
    assert!(candle.is_bullish());
    assert_eq!(candle.upper_tail(), 0.5);
    assert_eq!(candle.lower_tail(), 1.0);

    assert_eq!(
        Candle::from_prices(start, &[], 0.0).unwrap_err(),
        ChartError::EmptyInput
    );
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

#[test]
fn test_parallel_scan() {
    let mut raw = SELL_OFF.to_vec();
    raw.extend_from_slice(&[(24.0, 25.0, 21.0, 22.0), (22.0, 23.0, 19.0, 20.0)]);

    let mut sym1 = chart_of(&raw);
    let mut sym2 = chart_of(&SELL_OFF);
    let instruments: Vec<(&str, &mut Chart)> = vec![("SYM1", &mut sym1), ("SYM2", &mut sym2)];

    let matcher = PatternMatcher::default();
    let (results, errors) = scan_parallel(&matcher, instruments);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].symbol, "SYM1");
    assert_eq!(results[0].patterns.len(), 1);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].symbol, "SYM2");
    assert_eq!(errors[0].error, ChartError::InsufficientWindow { need: 5, got: 3 });

    assert_eq!(sym1.bearish_patterns().len(), 1);
}

// ============================================================
// SERIALIZATION
// ============================================================

#[test]
fn test_records_serialize() {
    let mut raw = SELL_OFF.to_vec();
    raw.extend_from_slice(&[(24.0, 25.0, 21.0, 22.0), (22.0, 23.0, 19.0, 20.0)]);
    let mut chart = chart_of(&raw);
    chart.detect_patterns().unwrap();

    let json = serde_json::to_value(&chart).unwrap();
    assert_eq!(json["bearish_patterns"][0]["kind"], "BearishGenericPattern");
    assert_eq!(json["bearish_patterns"][0]["anchor"], 4);
    assert_eq!(json["candles"].as_array().unwrap().len(), 5);
}
