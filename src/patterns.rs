//! Pattern kinds and the records produced by a scan

use serde::{Deserialize, Serialize};

use crate::{Direction, Trend};

/// Candlestick formations recognised by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    // Bullish
    BullishEngulfing,
    BullishHarami,
    BullishHaramiCross,
    BullishKeyReversal,
    BullishMorningStar,
    MorningDojiStar,
    BullishRisingThree,
    BullishRisingTwo,
    BullishGenericPattern,

    // Bearish
    BearishEngulfing,
    BearishHarami,
    BearishHaramiCross,
    BearishKeyReversal,
    BearishEveningStar,
    EveningDojiStar,
    BearishFallingThree,
    BearishFallingTwo,
    BearishGenericPattern,
}

impl PatternKind {
    pub const ALL: [PatternKind; 18] = [
        PatternKind::BullishEngulfing,
        PatternKind::BullishHarami,
        PatternKind::BullishHaramiCross,
        PatternKind::BullishKeyReversal,
        PatternKind::BullishMorningStar,
        PatternKind::MorningDojiStar,
        PatternKind::BullishRisingThree,
        PatternKind::BullishRisingTwo,
        PatternKind::BullishGenericPattern,
        PatternKind::BearishEngulfing,
        PatternKind::BearishHarami,
        PatternKind::BearishHaramiCross,
        PatternKind::BearishKeyReversal,
        PatternKind::BearishEveningStar,
        PatternKind::EveningDojiStar,
        PatternKind::BearishFallingThree,
        PatternKind::BearishFallingTwo,
        PatternKind::BearishGenericPattern,
    ];

    /// Stable string identifier
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::BullishEngulfing => "BULLISH_ENGULFING",
            PatternKind::BullishHarami => "BULLISH_HARAMI",
            PatternKind::BullishHaramiCross => "BULLISH_HARAMI_CROSS",
            PatternKind::BullishKeyReversal => "BULLISH_KEY_REVERSAL",
            PatternKind::BullishMorningStar => "BULLISH_MORNING_STAR",
            PatternKind::MorningDojiStar => "MORNING_DOJI_STAR",
            PatternKind::BullishRisingThree => "BULLISH_RISING_THREE",
            PatternKind::BullishRisingTwo => "BULLISH_RISING_TWO",
            PatternKind::BullishGenericPattern => "BULLISH_GENERIC",
            PatternKind::BearishEngulfing => "BEARISH_ENGULFING",
            PatternKind::BearishHarami => "BEARISH_HARAMI",
            PatternKind::BearishHaramiCross => "BEARISH_HARAMI_CROSS",
            PatternKind::BearishKeyReversal => "BEARISH_KEY_REVERSAL",
            PatternKind::BearishEveningStar => "BEARISH_EVENING_STAR",
            PatternKind::EveningDojiStar => "EVENING_DOJI_STAR",
            PatternKind::BearishFallingThree => "BEARISH_FALLING_THREE",
            PatternKind::BearishFallingTwo => "BEARISH_FALLING_TWO",
            PatternKind::BearishGenericPattern => "BEARISH_GENERIC",
        }
    }

    /// Which result list the pattern is recorded in
    pub fn direction(self) -> Direction {
        match self {
            PatternKind::BullishEngulfing
            | PatternKind::BullishHarami
            | PatternKind::BullishHaramiCross
            | PatternKind::BullishKeyReversal
            | PatternKind::BullishMorningStar
            | PatternKind::MorningDojiStar
            | PatternKind::BullishRisingThree
            | PatternKind::BullishRisingTwo
            | PatternKind::BullishGenericPattern => Direction::Bullish,
            PatternKind::BearishEngulfing
            | PatternKind::BearishHarami
            | PatternKind::BearishHaramiCross
            | PatternKind::BearishKeyReversal
            | PatternKind::BearishEveningStar
            | PatternKind::EveningDojiStar
            | PatternKind::BearishFallingThree
            | PatternKind::BearishFallingTwo
            | PatternKind::BearishGenericPattern => Direction::Bearish,
        }
    }

    #[inline]
    pub fn is_bullish(self) -> bool {
        self.direction().is_bullish()
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        self.direction().is_bearish()
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded match - Copy, no allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub kind: PatternKind,
    /// Trend of the candles immediately before the anchor
    pub preceding_trend: Trend,
    /// Chart index of the candle the pattern is anchored at
    pub anchor: usize,
}
