//! Indicator engine.
//!
//! Every indicator is a pure computation over a price series and an optional
//! market snapshot. Results are combined by the aggregator into one weighted
//! score and recommendation.

pub mod aggregator;
pub mod engine;
pub mod history;
pub mod indicators;
pub mod rolling;
pub mod voter;

pub use aggregator::{aggregate, Aggregate};
pub use engine::DashboardEngine;
pub use voter::{tally, Consensus, Lean, MultiTimeframe, Reading, TimeframeFormula, Verdict, Vote};

use crate::config::ModelConstants;
use crate::error::EngineError;
use crate::types::{HistorySeries, IndicatorId, IndicatorResult, MarketSnapshot, PriceSeries};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

/// Inputs shared by every indicator in one computation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Instant the dashboard is computed for.
    pub as_of: DateTime<Utc>,
    pub snapshot: &'a MarketSnapshot,
    pub constants: &'a ModelConstants,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        as_of: DateTime<Utc>,
        snapshot: &'a MarketSnapshot,
        constants: &'a ModelConstants,
    ) -> Self {
        Self {
            as_of,
            snapshot,
            constants,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.as_of.date_naive()
    }
}

/// Trait for implementing indicators.
pub trait Indicator: Send + Sync {
    /// Identifier this indicator reports under.
    fn id(&self) -> IndicatorId;

    /// Minimum number of observations required. Zero for snapshot and
    /// calendar indicators.
    fn min_periods(&self) -> usize {
        0
    }

    /// Compute the reading, reporting why it could not be computed.
    fn evaluate(
        &self,
        series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError>;

    /// Compute the reading, turning any failure into an unavailable result.
    fn compute(&self, series: &PriceSeries, ctx: &EvaluationContext<'_>) -> IndicatorResult {
        match self.evaluate(series, ctx) {
            Ok(result) => result,
            Err(e) => {
                debug!("{} unavailable: {}", self.id(), e);
                IndicatorResult::unavailable(self.id(), &e)
            }
        }
    }

    /// Trailing `days` values of the raw reading, without thresholds.
    fn project(
        &self,
        _series: &PriceSeries,
        _ctx: &EvaluationContext<'_>,
        _days: usize,
    ) -> Result<HistorySeries, EngineError> {
        Err(EngineError::HistoryUnsupported(self.id().to_string()))
    }
}
