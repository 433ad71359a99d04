//! AHR999 accumulation index.

use crate::config::ModelConstants;
use crate::error::EngineError;
use crate::services::signals::history::project_trailing;
use crate::services::signals::rolling::{mean, nonzero, GeometricWindows};
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{HistorySeries, IndicatorId, IndicatorResult, PriceSeries};
use chrono::NaiveDate;

/// `(price / cost) * (price / fair)`.
///
/// `cost` is the geometric mean of the trailing cost window and `fair` the
/// accumulation power-law curve evaluated at the observation's own date.
/// With a shorter history the arithmetic mean of what exists stands in for
/// the cost and the status says so.
#[derive(Default)]
pub struct Ahr999;

impl Ahr999 {
    fn index(
        constants: &ModelConstants,
        price: f64,
        date: NaiveDate,
        cost: f64,
    ) -> Result<f64, EngineError> {
        let days = constants.days_since_origin(date);
        if days <= 0.0 {
            return Err(EngineError::ComputationDegenerate(format!(
                "{} is not after the model origin",
                date
            )));
        }

        let cost = nonzero(cost, "cost basis")?;
        let fair = nonzero(constants.accumulation.fair_value(days), "fair value")?;

        Ok((price / cost) * (price / fair))
    }

    /// Index at `end` with the geometric cost of the window ending there.
    fn index_at(
        constants: &ModelConstants,
        series: &PriceSeries,
        costs: &GeometricWindows,
        end: usize,
    ) -> Result<f64, EngineError> {
        let cost = costs.window_mean(end, constants.cost_window)?;
        Self::index(constants, series.prices()[end], series.dates()[end], cost)
    }

    fn classify(value: f64) -> (f64, &'static str) {
        if value < 0.45 {
            (1.0, "bottom zone")
        } else if value < 1.2 {
            (0.0, "accumulation zone")
        } else {
            (-1.0, "take-profit zone")
        }
    }
}

impl Indicator for Ahr999 {
    fn id(&self) -> IndicatorId {
        IndicatorId::Ahr999
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let prices = series.prices();
        let end = prices.len() - 1;

        let (value, approximate) = if prices.len() >= ctx.constants.cost_window {
            let costs = GeometricWindows::new(prices);
            (Self::index_at(ctx.constants, series, &costs, end)?, false)
        } else {
            let index = Self::index(ctx.constants, prices[end], series.last_date(), mean(prices))?;
            (index, true)
        };

        let (score, label) = Self::classify(value);
        let status = if approximate {
            format!("{} ({:.2}, approximate)", label, value)
        } else {
            format!("{} ({:.2})", label, value)
        };

        Ok(IndicatorResult::new(self.id(), value, score, status))
    }

    fn project(
        &self,
        series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
        days: usize,
    ) -> Result<HistorySeries, EngineError> {
        let constants = ctx.constants;
        let costs = GeometricWindows::new(series.prices());
        project_trailing(self.id(), series, days, constants.cost_window, |i, _| {
            Self::index_at(constants, series, &costs, i)
        })
    }
}
