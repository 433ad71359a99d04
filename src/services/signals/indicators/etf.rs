//! Spot ETF trading activity.

use crate::error::EngineError;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{IndicatorId, IndicatorResult, MarketMetric, PriceSeries};

/// Daily spot ETF volume in billions of USD. Heavy volume means
/// institutional demand is active.
#[derive(Default)]
pub struct EtfActivity;

impl EtfActivity {
    fn classify(volume: f64) -> (f64, &'static str) {
        if volume > 2.0 {
            (1.0, "heavy flows")
        } else if volume > 1.0 {
            (0.5, "active")
        } else {
            (0.0, "quiet")
        }
    }
}

impl Indicator for EtfActivity {
    fn id(&self) -> IndicatorId {
        IndicatorId::EtfActivity
    }

    fn evaluate(
        &self,
        _series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let volume = ctx.snapshot.get(MarketMetric::EtfVolume)?;
        if volume <= 0.0 {
            return Err(EngineError::DataUnavailable("no ETF volume reported".to_string()));
        }
        let (score, label) = Self::classify(volume);

        Ok(IndicatorResult::new(
            self.id(),
            volume,
            score,
            format!("{} (${:.2}B daily volume)", label, volume),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etf_activity_bands() {
        assert_eq!(EtfActivity::classify(2.5).0, 1.0);
        assert_eq!(EtfActivity::classify(2.0).0, 0.5);
        assert_eq!(EtfActivity::classify(1.01).0, 0.5);
        assert_eq!(EtfActivity::classify(1.0).0, 0.0);
        assert_eq!(EtfActivity::classify(0.2).0, 0.0);
    }
}
