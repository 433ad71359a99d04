//! Mayer Multiple indicator.

use crate::error::EngineError;
use crate::services::signals::history::project_trailing;
use crate::services::signals::rolling::{last_window_end, nonzero, PrefixSums};
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{HistorySeries, IndicatorId, IndicatorResult, PriceSeries};

/// Price divided by its long simple moving average.
///
/// - Below 0.6: deep value
/// - 0.6 to 1.1: undervalued
/// - 1.1 to 1.8: fair
/// - 1.8 to 2.4: elevated
/// - 2.4 and above: overheated
pub struct MayerMultiple {
    window: usize,
}

impl Default for MayerMultiple {
    fn default() -> Self {
        Self { window: 200 }
    }
}

impl MayerMultiple {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    fn multiple_at(
        &self,
        prices: &[f64],
        sums: &PrefixSums,
        end: usize,
    ) -> Result<f64, EngineError> {
        let sma = nonzero(sums.window_mean(end, self.window)?, "moving average")?;
        Ok(prices[end] / sma)
    }

    /// Score and status for a multiple.
    pub fn classify(multiple: f64) -> (f64, &'static str) {
        if multiple < 0.6 {
            (1.0, "deep value")
        } else if multiple < 1.1 {
            (0.5, "undervalued")
        } else if multiple < 1.8 {
            (0.0, "fair value")
        } else if multiple < 2.4 {
            (-0.5, "elevated")
        } else {
            (-1.0, "overheated")
        }
    }
}

impl Indicator for MayerMultiple {
    fn id(&self) -> IndicatorId {
        IndicatorId::MayerMultiple
    }

    fn min_periods(&self) -> usize {
        self.window
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        _ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let prices = series.prices();
        let end = last_window_end(prices.len(), self.window)?;
        let multiple = self.multiple_at(prices, &PrefixSums::new(prices), end)?;
        let (score, label) = Self::classify(multiple);

        Ok(IndicatorResult::new(
            self.id(),
            multiple,
            score,
            format!("{} ({:.2})", label, multiple),
        ))
    }

    fn project(
        &self,
        series: &PriceSeries,
        _ctx: &EvaluationContext<'_>,
        days: usize,
    ) -> Result<HistorySeries, EngineError> {
        let prices = series.prices();
        let sums = PrefixSums::new(prices);
        project_trailing(self.id(), series, days, self.window, |i, _| {
            self.multiple_at(prices, &sums, i)
        })
    }
}
