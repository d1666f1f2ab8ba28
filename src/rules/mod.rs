//! Pattern catalog
//!
//! Each [`Rule`] is an independent entry: the classification of the last candle
//! that arms it ([`Trigger`]), a predicate over the chart, how far back from the
//! last candle the match is anchored, and the pattern it records. Rules never
//! depend on each other, so every rule that fires on a window is recorded.
//!
//! # Rule Groups
//!
//! - **Two-bar**: Engulfing, Harami, Key Reversal, Harami Cross
//! - **Three-bar**: Morning/Evening Star, Morning/Evening Doji Star
//! - **Multi-bar**: Rising/Falling Three, Rising/Falling Two, generic runs

use crate::{candle::Candle, chart::Chart, patterns::PatternKind, ChartError, Result};

pub mod multi_bar;
pub mod three_bar;
pub mod two_bar;

/// Predicate over the chart, evaluated with the window's last candle.
///
/// Navigation errors mean the look-back the rule needs does not exist; the
/// matcher skips the rule when that happens.
pub type Predicate = fn(&Chart, &Candle) -> Result<bool>;

/// Classification of the last candle that arms a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Bearish,
    Bullish,
    Doji,
}

impl Trigger {
    #[inline]
    pub fn fires(self, last: &Candle) -> bool {
        match self {
            Trigger::Bearish => last.is_bearish(),
            Trigger::Bullish => last.is_bullish(),
            Trigger::Doji => last.is_doji(),
        }
    }
}

/// One entry of the catalog
#[derive(Clone, Copy)]
pub struct Rule {
    pub kind: PatternKind,
    pub trigger: Trigger,
    /// Candles back from the last one to the anchor (0 anchors at the last candle)
    pub anchor: usize,
    pub predicate: Predicate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("trigger", &self.trigger)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

impl Rule {
    pub const fn new(kind: PatternKind, trigger: Trigger, anchor: usize, predicate: Predicate) -> Self {
        Self {
            kind,
            trigger,
            anchor,
            predicate,
        }
    }

    /// Returns the anchor index when the rule matches with `last` as the final candle.
    pub fn evaluate(&self, chart: &Chart, last: &Candle) -> Result<Option<usize>> {
        if !self.trigger.fires(last) {
            return Ok(None);
        }
        if !(self.predicate)(chart, last)? {
            return Ok(None);
        }
        last.index()
            .checked_sub(self.anchor)
            .map(Some)
            .ok_or(ChartError::InsufficientLookback {
                need: self.anchor,
                got: last.index(),
            })
    }
}

/// All builtin rules, in evaluation order
pub static CATALOG: [Rule; 18] = [
    // Ending in a bearish candle
    Rule::new(PatternKind::BearishEngulfing, Trigger::Bearish, 1, two_bar::bearish_engulfing),
    Rule::new(PatternKind::BearishHarami, Trigger::Bearish, 1, two_bar::bearish_harami),
    Rule::new(PatternKind::BearishKeyReversal, Trigger::Bearish, 1, two_bar::bearish_key_reversal),
    Rule::new(PatternKind::EveningDojiStar, Trigger::Bearish, 2, three_bar::evening_doji_star),
    Rule::new(PatternKind::BearishEveningStar, Trigger::Bearish, 2, three_bar::evening_star),
    Rule::new(PatternKind::BearishFallingThree, Trigger::Bearish, 4, multi_bar::falling_three),
    Rule::new(PatternKind::BearishFallingTwo, Trigger::Bearish, 3, multi_bar::falling_two),
    Rule::new(PatternKind::BearishGenericPattern, Trigger::Bearish, 0, multi_bar::bearish_run),
    // Ending in a bullish candle
    Rule::new(PatternKind::BullishEngulfing, Trigger::Bullish, 1, two_bar::bullish_engulfing),
    Rule::new(PatternKind::BullishHarami, Trigger::Bullish, 1, two_bar::bullish_harami),
    Rule::new(PatternKind::BullishKeyReversal, Trigger::Bullish, 1, two_bar::bullish_key_reversal),
    Rule::new(PatternKind::MorningDojiStar, Trigger::Bullish, 2, three_bar::morning_doji_star),
    Rule::new(PatternKind::BullishMorningStar, Trigger::Bullish, 2, three_bar::morning_star),
    Rule::new(PatternKind::BullishRisingThree, Trigger::Bullish, 4, multi_bar::rising_three),
    Rule::new(PatternKind::BullishRisingTwo, Trigger::Bullish, 3, multi_bar::rising_two),
    Rule::new(PatternKind::BullishGenericPattern, Trigger::Bullish, 0, multi_bar::bullish_run),
    // Ending in a doji
    Rule::new(PatternKind::BullishHaramiCross, Trigger::Doji, 1, two_bar::bullish_harami_cross),
    Rule::new(PatternKind::BearishHaramiCross, Trigger::Doji, 1, two_bar::bearish_harami_cross),
];
