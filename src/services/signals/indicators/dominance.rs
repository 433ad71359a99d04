//! Market dominance.

use crate::error::EngineError;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{IndicatorId, IndicatorResult, MarketMetric, PriceSeries};

/// Share of total market capitalisation. High dominance means capital has
/// not yet rotated into riskier assets.
#[derive(Default)]
pub struct BtcDominance;

impl BtcDominance {
    fn classify(pct: f64) -> (f64, &'static str) {
        if pct > 55.0 {
            (1.0, "dominant")
        } else if pct > 45.0 {
            (0.0, "balanced")
        } else {
            (-0.5, "altcoin rotation")
        }
    }
}

impl Indicator for BtcDominance {
    fn id(&self) -> IndicatorId {
        IndicatorId::BtcDominance
    }

    fn evaluate(
        &self,
        _series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let pct = ctx.snapshot.get(MarketMetric::BtcDominance)?;
        let (score, label) = Self::classify(pct);

        Ok(IndicatorResult::new(
            self.id(),
            pct,
            score,
            format!("{} ({:.1}%)", label, pct),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominance_bands() {
        assert_eq!(BtcDominance::classify(60.0).0, 1.0);
        assert_eq!(BtcDominance::classify(55.0).0, 0.0);
        assert_eq!(BtcDominance::classify(45.0).0, -0.5);
    }
}
