//! Three-bar rules: Morning/Evening Star and their doji variants
//!
//! The window's last candle closes the formation, the middle candle is the
//! "star", and the first candle is the anchor.

use crate::{candle::Candle, chart::Chart, Result};

/// The star (candle before last) and the candle that opened the formation
fn star_and_first<'c>(chart: &'c Chart, last: &Candle) -> Result<(&'c Candle, &'c Candle)> {
    let star = chart.previous(last)?;
    let first = chart.previous(star)?;
    Ok((star, first))
}

/// Bullish candle, a doji gapping above its close, then a bearish candle
/// opening below the doji.
pub fn evening_doji_star(chart: &Chart, last: &Candle) -> Result<bool> {
    let (star, first) = star_and_first(chart, last)?;
    Ok(first.is_bullish()
        && star.is_doji()
        && star.low() > first.close()
        && last.open() < star.close()
        && last.close() > first.open())
}

/// Bullish candle, a small non-doji body at most half the last candle's range,
/// then a bearish candle.
pub fn evening_star(chart: &Chart, last: &Candle) -> Result<bool> {
    let (star, first) = star_and_first(chart, last)?;
    Ok(first.is_bullish()
        && !star.is_doji()
        && star.range() <= last.range() / 2.0
        && star.open() > first.open()
        && last.open() > star.close()
        && last.close() > first.open())
}

/// Bearish candle, a doji below its close, then a bullish candle opening above
/// the doji.
pub fn morning_doji_star(chart: &Chart, last: &Candle) -> Result<bool> {
    let (star, first) = star_and_first(chart, last)?;
    Ok(first.is_bearish()
        && star.is_doji()
        && star.high() < first.close()
        && last.open() > star.close()
        && last.close() < first.open())
}

pub fn morning_star(chart: &Chart, last: &Candle) -> Result<bool> {
    let (star, first) = star_and_first(chart, last)?;
    Ok(first.is_bearish()
        && !star.is_doji()
        && star.range() <= last.range() / 2.0
        && star.close() < first.close()
        && last.open() > star.close()
        && last.close() < first.open())
}
