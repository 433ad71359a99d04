//! Company treasury holdings.

use crate::error::EngineError;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{IndicatorId, IndicatorResult, MarketMetric, PriceSeries};

/// Coins held by listed companies. Any treasury demand is mildly bullish,
/// a large one more so.
#[derive(Default)]
pub struct CompanyHoldings;

impl CompanyHoldings {
    fn classify(coins: f64) -> (f64, &'static str) {
        if coins > 300_000.0 {
            (1.0, "heavy corporate accumulation")
        } else {
            (0.5, "corporate accumulation")
        }
    }
}

impl Indicator for CompanyHoldings {
    fn id(&self) -> IndicatorId {
        IndicatorId::CompanyHoldings
    }

    fn evaluate(
        &self,
        _series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let coins = ctx.snapshot.get(MarketMetric::CompanyHoldings)?;
        if coins <= 0.0 {
            return Err(EngineError::DataUnavailable("no holdings reported".to_string()));
        }
        let (score, label) = Self::classify(coins);

        Ok(IndicatorResult::new(
            self.id(),
            coins,
            score,
            format!("{} ({:.0} coins)", label, coins),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConstants;
    use crate::types::MarketSnapshot;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_holdings_bands() {
        assert_eq!(CompanyHoldings::classify(350_000.0).0, 1.0);
        assert_eq!(CompanyHoldings::classify(300_000.0).0, 0.5);
        assert_eq!(CompanyHoldings::classify(1_000.0).0, 0.5);
    }

    #[test]
    fn test_zero_holdings_are_unavailable() {
        let snapshot = MarketSnapshot::new().with_reading(MarketMetric::CompanyHoldings, 0.0);
        let constants = ModelConstants::default();
        let ctx = EvaluationContext::new(Utc::now(), &snapshot, &constants);
        let series =
            PriceSeries::daily(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), vec![1.0; 3]).unwrap();

        assert!(matches!(
            CompanyHoldings.evaluate(&series, &ctx),
            Err(EngineError::DataUnavailable(_))
        ));
    }
}
