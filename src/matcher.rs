//! Matcher: runs a rule set over a chart's trailing window

use log::{debug, trace};

use crate::{
    chart::Chart,
    patterns::PatternKind,
    rules::{Rule, CATALOG},
    ChartError, Result,
};

/// One rule that fired, before the preceding trend is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub kind: PatternKind,
    pub anchor: usize,
}

/// Evaluates an ordered set of rules against the last candle of a chart's window.
///
/// The matcher only reads the chart; recording is done by
/// [`Chart::detect_with`](crate::chart::Chart::detect_with). A matcher can be
/// shared across threads and reused for any number of charts.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    rules: Vec<Rule>,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMatcher {
    /// Matcher over the full builtin catalog
    pub fn new() -> Self {
        Self {
            rules: CATALOG.to_vec(),
        }
    }

    pub fn builder() -> MatcherBuilder {
        MatcherBuilder::new()
    }

    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate every rule against the window's last candle.
    ///
    /// Rules whose look-back is missing are skipped. Any other error aborts the scan.
    pub fn scan(&self, chart: &Chart) -> Result<Vec<Detection>> {
        let window = chart.window()?;
        let Some(last) = window.last() else {
            return Err(ChartError::EmptyInput);
        };
        debug!(
            "scanning {} rules over candles {}..={} ({})",
            self.rules.len(),
            window[0].index(),
            last.index(),
            last.trend()
        );

        let mut found = Vec::new();
        for rule in &self.rules {
            match rule.evaluate(chart, last) {
                Ok(Some(anchor)) => {
                    trace!("{} matched at {}", rule.kind, anchor);
                    found.push(Detection {
                        kind: rule.kind,
                        anchor,
                    });
                },
                Ok(None) => {},
                Err(e) if e.is_navigation() => {
                    trace!("{} skipped: {}", rule.kind, e);
                },
                Err(e) => return Err(e),
            }
        }

        debug!("{} rules matched", found.len());
        Ok(found)
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for matchers over a subset of the catalog or custom rules
#[derive(Debug, Clone, Default)]
pub struct MatcherBuilder {
    rules: Vec<Rule>,
    only: Option<Vec<PatternKind>>,
}

impl MatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every builtin rule
    pub fn with_catalog(mut self) -> Self {
        self.rules.extend_from_slice(&CATALOG);
        self
    }

    /// Add a single rule, evaluated after the ones already added
    pub fn add(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Keep only rules recording one of `kinds`
    pub fn only_patterns(mut self, kinds: &[PatternKind]) -> Self {
        self.only = Some(kinds.to_vec());
        self
    }

    pub fn build(self) -> Result<PatternMatcher> {
        let rules: Vec<Rule> = match &self.only {
            Some(kinds) => self.rules.into_iter().filter(|r| kinds.contains(&r.kind)).collect(),
            None => self.rules,
        };
        if rules.is_empty() {
            return Err(ChartError::InvalidConfig("Matcher has no rules".into()));
        }
        Ok(PatternMatcher { rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{testing::chart, Trigger};
    use crate::candle::Candle;

    const ENGULFING: [(f64, f64, f64, f64); 5] = [
        (10.0, 10.5, 7.5, 8.0),
        (8.0, 12.5, 7.8, 12.0),
        (12.0, 12.4, 10.8, 11.0),
        (9.0, 13.5, 8.5, 13.0),
        (14.0, 15.0, 6.0, 7.0),
    ];

    #[test]
    fn test_default_uses_catalog() {
        let matcher = PatternMatcher::default();
        assert_eq!(matcher.rules().len(), CATALOG.len());
    }

    #[test]
    fn test_scan_reports_every_firing_rule() {
        let c = chart(&ENGULFING);
        let found = PatternMatcher::new().scan(&c).unwrap();
        assert_eq!(
            found,
            vec![
                Detection {
                    kind: PatternKind::BearishEngulfing,
                    anchor: 3
                },
                Detection {
                    kind: PatternKind::BearishKeyReversal,
                    anchor: 3
                },
            ]
        );
    }

    #[test]
    fn test_scan_needs_full_window() {
        let c = chart(&ENGULFING[3..]);
        assert_eq!(
            PatternMatcher::new().scan(&c),
            Err(ChartError::InsufficientWindow { need: 5, got: 2 })
        );
    }

    #[test]
    fn test_scan_does_not_modify_chart() {
        let c = chart(&ENGULFING);
        PatternMatcher::new().scan(&c).unwrap();
        assert_eq!(c.patterns().count(), 0);
    }

    #[test]
    fn test_only_patterns() {
        let matcher = PatternMatcher::builder()
            .with_catalog()
            .only_patterns(&[PatternKind::BearishKeyReversal])
            .build()
            .unwrap();
        assert_eq!(matcher.rules().len(), 1);

        let found = matcher.scan(&chart(&ENGULFING)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::BearishKeyReversal);
    }

    #[test]
    fn test_empty_builder_is_rejected() {
        assert!(matches!(
            MatcherBuilder::new().build(),
            Err(ChartError::InvalidConfig(_))
        ));
        assert!(matches!(
            MatcherBuilder::new().with_catalog().only_patterns(&[]).build(),
            Err(ChartError::InvalidConfig(_))
        ));
    }

    fn wide_last(_: &Chart, last: &Candle) -> Result<bool> {
        Ok(last.high() - last.low() > 5.0)
    }

    fn needs_deep_history(chart: &Chart, last: &Candle) -> Result<bool> {
        Ok(!chart.previous_n(10, last)?.is_empty())
    }

    #[test]
    fn test_custom_rules() {
        let matcher = PatternMatcher::builder()
            .add(Rule::new(PatternKind::BearishGenericPattern, Trigger::Bearish, 0, needs_deep_history))
            .add(Rule::new(PatternKind::BearishHarami, Trigger::Bearish, 0, wide_last))
            .build()
            .unwrap();

        // The first rule's look-back is missing, so it is skipped
        let found = matcher.scan(&chart(&ENGULFING)).unwrap();
        assert_eq!(
            found,
            vec![Detection {
                kind: PatternKind::BearishHarami,
                anchor: 4
            }]
        );
    }
}
