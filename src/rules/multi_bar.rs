//! Multi-bar rules: Rising/Falling Three, Rising/Falling Two, generic runs
//!
//! The three/two method formations are anchored at the long candle that
//! precedes the counter-trend run; the generic runs are anchored at the last
//! candle itself.

use crate::{
    candle::Candle,
    chart::Chart,
    trend::{all_bearish, all_bullish},
    Result,
};

/// `n` bullish candles before `last`, preceded by a bearish candle whose high
/// tops all of them.
fn falling_method(chart: &Chart, last: &Candle, n: usize) -> Result<bool> {
    let run = chart.previous_n(n, last)?;
    if !all_bullish(run.iter().copied()) {
        return Ok(false);
    }
    let Some(oldest) = run.last() else {
        return Ok(false);
    };
    let anchor = chart.previous(oldest)?;
    let ceiling = run.iter().map(|c| c.high()).fold(f64::NEG_INFINITY, f64::max);
    Ok(anchor.is_bearish() && anchor.high() > ceiling)
}

/// `n` bearish candles before `last`, preceded by a bullish candle whose low
/// undercuts all of them.
fn rising_method(chart: &Chart, last: &Candle, n: usize) -> Result<bool> {
    let run = chart.previous_n(n, last)?;
    if !all_bearish(run.iter().copied()) {
        return Ok(false);
    }
    let Some(oldest) = run.last() else {
        return Ok(false);
    };
    let anchor = chart.previous(oldest)?;
    let floor = run.iter().map(|c| c.low()).fold(f64::INFINITY, f64::min);
    Ok(anchor.is_bullish() && anchor.low() < floor)
}

pub fn falling_three(chart: &Chart, last: &Candle) -> Result<bool> {
    falling_method(chart, last, 3)
}

pub fn falling_two(chart: &Chart, last: &Candle) -> Result<bool> {
    falling_method(chart, last, 2)
}

pub fn rising_three(chart: &Chart, last: &Candle) -> Result<bool> {
    rising_method(chart, last, 3)
}

pub fn rising_two(chart: &Chart, last: &Candle) -> Result<bool> {
    rising_method(chart, last, 2)
}

/// Three bearish candles before the last one
pub fn bearish_run(chart: &Chart, last: &Candle) -> Result<bool> {
    Ok(all_bearish(chart.previous_n(3, last)?))
}

/// Three bullish candles before the last one
pub fn bullish_run(chart: &Chart, last: &Candle) -> Result<bool> {
    Ok(all_bullish(chart.previous_n(3, last)?))
}
