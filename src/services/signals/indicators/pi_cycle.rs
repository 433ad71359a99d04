//! Pi Cycle Top indicator.

use crate::error::EngineError;
use crate::services::signals::history::project_trailing;
use crate::services::signals::rolling::{last_window_end, nonzero, PrefixSums};
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{HistorySeries, IndicatorId, IndicatorResult, PriceSeries};

/// Gap between the short average and twice the long average.
///
/// The value is `(2 * long - short) / (2 * long) * 100`. A short average at
/// or above twice the long one is the historical top signal.
pub struct PiCycleTop {
    short: usize,
    long: usize,
}

impl Default for PiCycleTop {
    fn default() -> Self {
        Self {
            short: 111,
            long: 350,
        }
    }
}

/// A computed gap with the crossing flag.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Gap {
    pct: f64,
    crossed: bool,
}

impl PiCycleTop {
    fn gap_at(&self, sums: &PrefixSums, end: usize) -> Result<Gap, EngineError> {
        let short = sums.window_mean(end, self.short)?;
        let doubled = nonzero(sums.window_mean(end, self.long)? * 2.0, "doubled long average")?;

        Ok(Gap {
            pct: (doubled - short) / doubled * 100.0,
            crossed: short >= doubled,
        })
    }

    fn classify(gap: Gap) -> (f64, String) {
        if gap.crossed {
            (-1.0, "crossed, top signal".to_string())
        } else if gap.pct <= 20.0 {
            (0.0, format!("gap {:.1}%, approaching cross", gap.pct))
        } else {
            (1.0, format!("gap {:.1}%, safe", gap.pct))
        }
    }
}

impl Indicator for PiCycleTop {
    fn id(&self) -> IndicatorId {
        IndicatorId::PiCycleTop
    }

    fn min_periods(&self) -> usize {
        self.long.max(self.short)
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        _ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let prices = series.prices();
        let end = last_window_end(prices.len(), self.min_periods())?;
        let gap = self.gap_at(&PrefixSums::new(prices), end)?;
        let (score, status) = Self::classify(gap);

        Ok(IndicatorResult::new(self.id(), gap.pct, score, status))
    }

    fn project(
        &self,
        series: &PriceSeries,
        _ctx: &EvaluationContext<'_>,
        days: usize,
    ) -> Result<HistorySeries, EngineError> {
        let sums = PrefixSums::new(series.prices());
        project_trailing(self.id(), series, days, self.min_periods(), |i, _| {
            self.gap_at(&sums, i).map(|g| g.pct)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConstants;
    use crate::types::{MarketSnapshot, Tone};
    use chrono::{NaiveDate, Utc};

    fn evaluate(prices: Vec<f64>) -> Result<IndicatorResult, EngineError> {
        let series =
            PriceSeries::daily(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(), prices).unwrap();
        let snapshot = MarketSnapshot::new();
        let constants = ModelConstants::default();
        let ctx = EvaluationContext::new(Utc::now(), &snapshot, &constants);
        PiCycleTop::default().evaluate(&series, &ctx)
    }

    #[test]
    fn test_pi_cycle_needs_long_window() {
        assert_eq!(
            evaluate(vec![100.0; 349]),
            Err(EngineError::insufficient(350, 349))
        );
    }

    #[test]
    fn test_pi_cycle_flat_series_is_safe() {
        let result = evaluate(vec![100.0; 400]).unwrap();
        assert_eq!(result.value, 50.0);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.color, Tone::Green);
    }

    #[test]
    fn test_pi_cycle_exact_cross_is_bearish() {
        // Long average 239, short average 478: exactly crossed.
        let mut prices = vec![128.0; 239];
        prices.extend(vec![478.0; 111]);

        let result = evaluate(prices).unwrap();
        assert_eq!(result.value, 0.0);
        assert_eq!(result.score, -1.0);
    }

    #[test]
    fn test_pi_cycle_near_cross_is_neutral() {
        let mut prices = vec![100.0; 239];
        prices.extend(vec![300.0; 111]);

        let result = evaluate(prices).unwrap();
        assert!(result.value > 0.0 && result.value <= 20.0, "{}", result.value);
        assert_eq!(result.score, 0.0);
    }
}
