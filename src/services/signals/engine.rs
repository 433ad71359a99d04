//! Dashboard engine: runs every indicator and aggregates the results.

use super::aggregator::aggregate;
use super::history;
use super::indicators::all_indicators;
use super::{EvaluationContext, Indicator};
use crate::error::EngineError;
use crate::types::{
    DashboardResult, HistorySeries, IndicatorId, PriceSeries, RecommendationScale, WeightTable,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Synchronous, pure computation of dashboards and indicator histories.
pub struct DashboardEngine {
    indicators: Vec<Box<dyn Indicator>>,
    weights: WeightTable,
    scale: RecommendationScale,
}

impl DashboardEngine {
    /// Engine over every registered indicator.
    pub fn new(weights: WeightTable, scale: RecommendationScale) -> Self {
        Self::with_indicators(all_indicators(), weights, scale)
    }

    pub fn with_indicators(
        indicators: Vec<Box<dyn Indicator>>,
        weights: WeightTable,
        scale: RecommendationScale,
    ) -> Self {
        Self {
            indicators,
            weights,
            scale,
        }
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn scale(&self) -> RecommendationScale {
        self.scale
    }

    /// Identifiers of the registered indicators.
    pub fn indicator_ids(&self) -> Vec<IndicatorId> {
        self.indicators.iter().map(|i| i.id()).collect()
    }

    fn indicator(&self, id: IndicatorId) -> Option<&dyn Indicator> {
        self.indicators
            .iter()
            .find(|i| i.id() == id)
            .map(|i| i.as_ref())
    }

    /// Compute every indicator and the weighted recommendation.
    ///
    /// Indicator failures become unavailable results; this never fails.
    pub fn compute_dashboard(
        &self,
        series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> DashboardResult {
        let indicators: BTreeMap<_, _> = self
            .indicators
            .iter()
            .map(|indicator| (indicator.id(), indicator.compute(series, ctx)))
            .collect();

        let agg = aggregate(indicators.values(), &self.weights, self.scale);

        debug!(
            "Computed dashboard over {} observations: {}/{} indicators included, total {:.3} ({})",
            series.len(),
            agg.included,
            indicators.len(),
            agg.total_score,
            agg.recommendation
        );

        DashboardResult {
            timestamp: ctx.as_of,
            price: series.last_price(),
            indicators,
            total_score: agg.total_score,
            recommendation: agg.recommendation,
            source: String::new(),
            warnings: Vec::new(),
        }
    }

    /// Trailing `days` values of one indicator with its chart thresholds.
    pub fn indicator_history(
        &self,
        id: IndicatorId,
        series: &PriceSeries,
        days: usize,
        ctx: &EvaluationContext<'_>,
    ) -> Result<HistorySeries, EngineError> {
        let indicator = self
            .indicator(id)
            .ok_or_else(|| EngineError::UnknownIndicator(id.to_string()))?;
        history::project(indicator, series, ctx, days.max(1))
    }
}

impl Default for DashboardEngine {
    fn default() -> Self {
        Self::new(WeightTable::default(), RecommendationScale::default())
    }
}
