//! Trend scoring over candle runs and raw price series

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{candle::Candle, Trend};

/// Majority vote of candle trends.
///
/// More bullish than bearish candles gives [`Trend::Bullish`], the reverse gives
/// [`Trend::Bearish`], and a tie (including no candles at all) gives
/// [`Trend::Indifferent`]. An odd count avoids ties.
pub fn score_trend<'a, I>(candles: I) -> Trend
where
    I: IntoIterator<Item = &'a Candle>,
{
    let (bullish, bearish) = candles
        .into_iter()
        .fold((0usize, 0usize), |(bu, be), candle| match candle.trend() {
            Trend::Bullish => (bu + 1, be),
            Trend::Bearish => (bu, be + 1),
            Trend::Indifferent => (bu, be),
        });

    match bullish.cmp(&bearish) {
        Ordering::Greater => Trend::Bullish,
        Ordering::Less => Trend::Bearish,
        Ordering::Equal => Trend::Indifferent,
    }
}

/// Net direction of consecutive price moves: +1 per rise, -1 per fall.
pub fn score_series(prices: &[f64]) -> Trend {
    let score: i64 = prices
        .windows(2)
        .map(|pair| match pair[0].partial_cmp(&pair[1]) {
            Some(Ordering::Less) => 1,
            Some(Ordering::Greater) => -1,
            _ => 0,
        })
        .sum();

    match score.cmp(&0) {
        Ordering::Greater => Trend::Bullish,
        Ordering::Less => Trend::Bearish,
        Ordering::Equal => Trend::Indifferent,
    }
}

#[inline]
pub fn all_bullish<'a, I>(candles: I) -> bool
where
    I: IntoIterator<Item = &'a Candle>,
{
    candles.into_iter().all(Candle::is_bullish)
}

#[inline]
pub fn all_bearish<'a, I>(candles: I) -> bool
where
    I: IntoIterator<Item = &'a Candle>,
{
    candles.into_iter().all(Candle::is_bearish)
}

/// Chart of closing prices, one data point per interval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    prices: Vec<f64>,
    trend: Trend,
}

impl LineChart {
    pub fn new(prices: Vec<f64>) -> Self {
        let trend = score_series(&prices);
        Self { prices, trend }
    }

    #[inline]
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    #[inline]
    pub fn trend(&self) -> Trend {
        self.trend
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.prices.last().copied()
    }
}
