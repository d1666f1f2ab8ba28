//! Two-bar rules: Engulfing, Harami, Key Reversal, Harami Cross
//!
//! All of these compare the window's last candle with the one before it and are
//! anchored at that previous candle.

use crate::{candle::Candle, chart::Chart, Result};

// ============================================================
// ENDING BEARISH
// ============================================================

/// Bearish candle whose range contains the preceding bullish candle's range
pub fn bearish_engulfing(chart: &Chart, last: &Candle) -> Result<bool> {
    let prev = chart.previous(last)?;
    Ok(prev.is_bullish() && last.engulfs(prev))
}

/// Bearish candle contained in the preceding bullish candle's range
pub fn bearish_harami(chart: &Chart, last: &Candle) -> Result<bool> {
    let prev = chart.previous(last)?;
    Ok(prev.is_bullish() && prev.engulfs(last))
}

/// Opens above the prior close, trades higher, then closes below the prior low
pub fn bearish_key_reversal(chart: &Chart, last: &Candle) -> Result<bool> {
    let prev = chart.previous(last)?;
    Ok(prev.is_bullish()
        && last.open() > prev.close()
        && last.high() > last.open()
        && last.close() < prev.low())
}

// ============================================================
// ENDING BULLISH
// ============================================================

pub fn bullish_engulfing(chart: &Chart, last: &Candle) -> Result<bool> {
    let prev = chart.previous(last)?;
    Ok(prev.is_bearish() && last.engulfs(prev))
}

pub fn bullish_harami(chart: &Chart, last: &Candle) -> Result<bool> {
    let prev = chart.previous(last)?;
    Ok(prev.is_bearish() && prev.engulfs(last))
}

/// Opens below the prior close, trades lower, then closes above the prior high
pub fn bullish_key_reversal(chart: &Chart, last: &Candle) -> Result<bool> {
    let prev = chart.previous(last)?;
    Ok(prev.is_bearish()
        && last.open() < prev.close()
        && last.low() < last.open()
        && last.close() > prev.high())
}

// ============================================================
// ENDING IN A DOJI
// ============================================================

#[inline]
fn inside(inner: &Candle, outer: &Candle) -> bool {
    inner.high() < outer.high() && inner.low() > outer.low()
}

/// Doji inside a preceding bearish candle
pub fn bullish_harami_cross(chart: &Chart, last: &Candle) -> Result<bool> {
    let prev = chart.previous(last)?;
    Ok(prev.is_bearish() && inside(last, prev))
}

/// Doji inside a preceding bullish candle
pub fn bearish_harami_cross(chart: &Chart, last: &Candle) -> Result<bool> {
    let prev = chart.previous(last)?;
    Ok(prev.is_bullish() && inside(last, prev))
}
