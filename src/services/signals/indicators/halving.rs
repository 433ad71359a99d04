//! Halving cycle position.

use crate::error::EngineError;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{IndicatorId, IndicatorResult, PriceSeries};

const DAYS_PER_MONTH: f64 = 30.44;

/// Months elapsed since the most recent halving on or before `as_of`.
///
/// The first year after a halving has historically been the start of a bull
/// run; past two years the cycle is late.
#[derive(Default)]
pub struct HalvingCycle;

impl HalvingCycle {
    fn classify(months: f64) -> (f64, &'static str) {
        if months <= 12.0 {
            (1.0, "early cycle")
        } else if months <= 24.0 {
            (0.0, "mid cycle")
        } else {
            (-1.0, "late cycle")
        }
    }
}

impl Indicator for HalvingCycle {
    fn id(&self) -> IndicatorId {
        IndicatorId::HalvingCycle
    }

    fn evaluate(
        &self,
        _series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let today = ctx.today();
        let last = ctx.constants.last_halving(today).ok_or_else(|| {
            EngineError::ComputationDegenerate(format!("{} precedes the first halving", today))
        })?;

        let months = (today - last).num_days() as f64 / DAYS_PER_MONTH;
        let (score, label) = Self::classify(months);
        let until_next = (ctx.constants.next_halving - today).num_days();

        let status = if until_next > 0 {
            format!(
                "{} ({:.0} months since halving, next in {} days)",
                label, months, until_next
            )
        } else {
            format!("{} ({:.0} months since halving)", label, months)
        };

        Ok(IndicatorResult::new(self.id(), months, score, status))
    }
}
