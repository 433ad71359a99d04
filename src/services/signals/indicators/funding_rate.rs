//! Perpetual futures funding rate.

use crate::error::EngineError;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{IndicatorId, IndicatorResult, MarketMetric, PriceSeries};

/// Funding rate in percent per funding interval.
///
/// Persistently positive funding means crowded longs.
#[derive(Default)]
pub struct FundingRate;

impl FundingRate {
    fn classify(rate: f64) -> (f64, &'static str) {
        if rate > 0.1 {
            (-1.0, "overheated longs")
        } else if rate > 0.03 {
            (-0.5, "long bias")
        } else if rate > -0.03 {
            (0.0, "neutral")
        } else if rate > -0.1 {
            (0.5, "short bias")
        } else {
            (1.0, "crowded shorts")
        }
    }
}

impl Indicator for FundingRate {
    fn id(&self) -> IndicatorId {
        IndicatorId::FundingRate
    }

    fn evaluate(
        &self,
        _series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let rate = ctx.snapshot.get(MarketMetric::FundingRate)?;
        let (score, label) = Self::classify(rate);

        Ok(IndicatorResult::new(
            self.id(),
            rate,
            score,
            format!("{} ({:.4}%)", label, rate),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funding_rate_bands() {
        assert_eq!(FundingRate::classify(0.11).0, -1.0);
        assert_eq!(FundingRate::classify(0.1).0, -0.5);
        assert_eq!(FundingRate::classify(0.03).0, 0.0);
        assert_eq!(FundingRate::classify(0.0).0, 0.0);
        assert_eq!(FundingRate::classify(-0.03).0, 0.5);
        assert_eq!(FundingRate::classify(-0.1).0, 1.0);
    }
}
