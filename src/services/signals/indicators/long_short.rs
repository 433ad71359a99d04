//! Long/short account ratio.

use crate::error::EngineError;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{IndicatorId, IndicatorResult, MarketMetric, PriceSeries};

#[derive(Default)]
pub struct LongShortRatio;

impl LongShortRatio {
    fn classify(ratio: f64) -> (f64, &'static str) {
        if ratio > 2.0 {
            (-1.0, "extremely long")
        } else if ratio > 1.2 {
            (-0.5, "long heavy")
        } else if ratio > 0.8 {
            (0.0, "balanced")
        } else if ratio > 0.5 {
            (0.5, "short heavy")
        } else {
            (1.0, "short squeeze setup")
        }
    }
}

impl Indicator for LongShortRatio {
    fn id(&self) -> IndicatorId {
        IndicatorId::LongShortRatio
    }

    fn evaluate(
        &self,
        _series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let ratio = ctx.snapshot.get(MarketMetric::LongShortRatio)?;
        let (score, label) = Self::classify(ratio);

        Ok(IndicatorResult::new(
            self.id(),
            ratio,
            score,
            format!("{} ({:.2})", label, ratio),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_short_bands() {
        assert_eq!(LongShortRatio::classify(2.5).0, -1.0);
        assert_eq!(LongShortRatio::classify(2.0).0, -0.5);
        assert_eq!(LongShortRatio::classify(1.0).0, 0.0);
        assert_eq!(LongShortRatio::classify(0.8).0, 0.5);
        assert_eq!(LongShortRatio::classify(0.5).0, 1.0);
    }
}
