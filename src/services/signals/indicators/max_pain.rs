//! Options max pain.

use crate::error::EngineError;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{IndicatorId, IndicatorResult, PriceSeries};

/// Strike of the busiest expiry at which option holders collect the least.
///
/// Price tends to gravitate towards it into expiry, so it is reported as a
/// reference level with a neutral score.
#[derive(Default)]
pub struct MaxPain;

impl Indicator for MaxPain {
    fn id(&self) -> IndicatorId {
        IndicatorId::MaxPain
    }

    fn evaluate(
        &self,
        _series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let pain = ctx.snapshot.option_chain()?.max_pain()?;

        Ok(IndicatorResult::new(
            self.id(),
            pain.strike,
            0.0,
            format!("pain point ${:.0} ({})", pain.strike, pain.expiry),
        ))
    }
}
