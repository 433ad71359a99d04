//! Moving-average trend voted across timeframes.

use crate::error::EngineError;
use crate::services::signals::rolling::{nonzero, sma};
use crate::services::signals::voter::{Lean, Reading, TimeframeFormula};
use crate::types::IndicatorId;

/// Fast SMA against slow SMA.
///
/// The reading is the spread `(fast / slow - 1) * 100` in percent; a fast
/// average above the slow one is bullish.
pub struct TrendFormula {
    fast: usize,
    slow: usize,
}

impl Default for TrendFormula {
    fn default() -> Self {
        Self { fast: 20, slow: 50 }
    }
}

impl TimeframeFormula for TrendFormula {
    fn id(&self) -> IndicatorId {
        IndicatorId::TrendMultiTimeframe
    }

    fn min_periods(&self) -> usize {
        self.fast.max(self.slow)
    }

    fn read(&self, closes: &[f64]) -> Result<Reading, EngineError> {
        let slow = nonzero(sma(closes, self.slow)?, "slow average")?;
        let fast = sma(closes, self.fast)?;
        let spread = (fast / slow - 1.0) * 100.0;

        let lean = if fast > slow {
            Lean::Bullish
        } else if fast < slow {
            Lean::Bearish
        } else {
            Lean::Neutral
        };

        Ok(Reading {
            value: spread,
            lean,
            strength: spread.abs(),
        })
    }

    fn label(&self, lean: Lean) -> &'static str {
        match lean {
            Lean::Bullish => "bullish",
            Lean::Bearish => "bearish",
            Lean::Neutral => "neutral",
        }
    }
}
