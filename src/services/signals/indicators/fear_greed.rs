//! Fear & Greed sentiment indicator.

use crate::error::EngineError;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{IndicatorId, IndicatorResult, MarketMetric, PriceSeries};

/// Contrarian reading of the 0 to 100 sentiment index.
///
/// Fear is treated as opportunity and greed as risk.
#[derive(Default)]
pub struct FearGreed;

impl FearGreed {
    fn classify(index: f64) -> (f64, &'static str) {
        if index <= 25.0 {
            (1.0, "extreme fear")
        } else if index <= 45.0 {
            (0.5, "fear")
        } else if index <= 55.0 {
            (0.0, "neutral")
        } else if index <= 75.0 {
            (-0.5, "greed")
        } else {
            (-1.0, "extreme greed")
        }
    }
}

impl Indicator for FearGreed {
    fn id(&self) -> IndicatorId {
        IndicatorId::FearGreedIndex
    }

    fn evaluate(
        &self,
        _series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let index = ctx.snapshot.get(MarketMetric::FearGreedIndex)?;
        let (score, label) = Self::classify(index);

        Ok(IndicatorResult::new(
            self.id(),
            index,
            score,
            format!("{} ({:.0})", label, index),
        ))
    }
}
