//! Relative Strength Index (RSI) voted across timeframes.

use crate::error::EngineError;
use crate::services::signals::rolling::{rsi, rsi_series};
use crate::services::signals::voter::{Lean, Reading, TimeframeFormula};
use crate::types::{HistorySeries, IndicatorId, PriceSeries};
use std::collections::BTreeMap;

/// RSI momentum formula.
///
/// Values range from 0-100:
/// - 30 or below: oversold (bullish side)
/// - 70 or above: overbought (bearish side)
pub struct RsiFormula {
    period: usize,
    overbought: f64,
    oversold: f64,
}

impl Default for RsiFormula {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl RsiFormula {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }
}

impl TimeframeFormula for RsiFormula {
    fn id(&self) -> IndicatorId {
        IndicatorId::RsiMultiTimeframe
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn read(&self, closes: &[f64]) -> Result<Reading, EngineError> {
        let value = rsi(closes, self.period)?;

        let (lean, strength) = if value <= self.oversold {
            (Lean::Bullish, (self.oversold - value) / self.oversold)
        } else if value >= self.overbought {
            (Lean::Bearish, (value - self.overbought) / (100.0 - self.overbought))
        } else {
            (Lean::Neutral, 0.0)
        };

        Ok(Reading {
            value,
            lean,
            strength,
        })
    }

    fn label(&self, lean: Lean) -> &'static str {
        match lean {
            Lean::Bullish => "oversold",
            Lean::Bearish => "overbought",
            Lean::Neutral => "neutral",
        }
    }

    fn project_daily(&self, series: &PriceSeries, days: usize) -> Result<HistorySeries, EngineError> {
        let values = rsi_series(series.prices(), self.period);
        if values.is_empty() {
            return Err(EngineError::insufficient(self.min_periods(), series.len()));
        }

        // values[k] belongs to the observation at index period + k.
        let start = values.len().saturating_sub(days);
        Ok(HistorySeries {
            indicator: self.id(),
            dates: series.dates()[self.period + start..].to_vec(),
            values: values[start..].to_vec(),
            thresholds: BTreeMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConstants;
    use crate::services::signals::{EvaluationContext, Indicator, MultiTimeframe};
    use crate::types::MarketSnapshot;
    use chrono::{NaiveDate, Utc};

    fn series(prices: Vec<f64>) -> PriceSeries {
        PriceSeries::daily(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), prices).unwrap()
    }

    #[test]
    fn test_rsi_min_periods() {
        assert_eq!(RsiFormula::default().min_periods(), 15);
        assert_eq!(RsiFormula::new(7).min_periods(), 8);
    }

    #[test]
    fn test_rsi_reading_leans() {
        let formula = RsiFormula::default();

        let up: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let reading = formula.read(&up).unwrap();
        assert_eq!(reading.lean, Lean::Bearish);
        assert_eq!(reading.strength, 1.0);

        let flat = vec![10.0; 30];
        assert_eq!(formula.read(&flat).unwrap().lean, Lean::Neutral);
    }

    #[test]
    fn test_rsi_short_history_is_insufficient() {
        let snapshot = MarketSnapshot::new();
        let constants = ModelConstants::default();
        let ctx = EvaluationContext::new(Utc::now(), &snapshot, &constants);

        let result = MultiTimeframe::new(RsiFormula::default()).compute(&series(vec![1.0; 10]), &ctx);
        assert!(result.value.is_nan());
        assert_eq!(result.status, "insufficient data");
    }

    #[test]
    fn test_rsi_uptrend_votes_overbought() {
        let snapshot = MarketSnapshot::new();
        let constants = ModelConstants::default();
        let ctx = EvaluationContext::new(Utc::now(), &snapshot, &constants);

        // Daily, 3-day and weekly have enough closes; monthly and yearly do not.
        let prices: Vec<f64> = (0..200).map(|i| 100.0 + i as f64).collect();
        let result = MultiTimeframe::new(RsiFormula::default())
            .evaluate(&series(prices), &ctx)
            .unwrap();

        assert_eq!(result.value, 100.0);
        assert_eq!(result.score, -1.0);
        assert!(result.status.starts_with("strongly overbought (3/3:"), "{}", result.status);
    }

    #[test]
    fn test_rsi_projection_ends_at_point_value() {
        let prices: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0)
            .collect();
        let s = series(prices);
        let formula = RsiFormula::default();

        let history = formula.project_daily(&s, 30).unwrap();
        assert_eq!(history.len(), 30);
        assert_eq!(history.dates.last(), Some(&s.last_date()));
        assert_eq!(history.last_value(), Some(rsi(s.prices(), 14).unwrap()));
    }
}
