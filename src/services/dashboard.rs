//! Wires providers, cache and engine into dashboard requests.

use super::cache::Cache;
use super::price_history::{FallbackChain, JsonFileProvider, PriceHistoryProvider, SourcedSeries};
use super::signals::{DashboardEngine, EvaluationContext};
use super::snapshots::{self, MarketSnapshotProvider, StaticSnapshotProvider};
use crate::config::{Config, ModelConstants};
use crate::error::EngineError;
use crate::types::{DashboardResult, HistorySeries, IndicatorId, MarketSnapshot, PriceSeries};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Serves dashboards and indicator histories for one asset.
pub struct DashboardService {
    asset: String,
    history_start: NaiveDate,
    chain: FallbackChain,
    snapshots: Arc<dyn MarketSnapshotProvider>,
    cache: Cache<SourcedSeries>,
    engine: DashboardEngine,
    constants: ModelConstants,
}

impl DashboardService {
    pub fn new(
        config: &Config,
        chain: FallbackChain,
        snapshots: Arc<dyn MarketSnapshotProvider>,
        cache: Cache<SourcedSeries>,
    ) -> Self {
        Self {
            asset: config.asset.clone(),
            history_start: config.history_start,
            chain,
            snapshots,
            cache,
            engine: DashboardEngine::new(config.weights.clone(), config.recommendation_scale),
            constants: config.constants.clone(),
        }
    }

    /// Build the service with the providers named in `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut providers: Vec<Arc<dyn PriceHistoryProvider>> = Vec::new();
        if let Some(path) = &config.history_file {
            providers.push(Arc::new(JsonFileProvider::new(path.clone())));
        }

        let chain = FallbackChain::new(providers, config.synthetic.clone());
        info!(
            "History providers for {}: {:?} (synthetic fallback)",
            config.asset,
            chain.provider_names()
        );

        Self::new(
            config,
            chain,
            Arc::new(StaticSnapshotProvider::new(config.snapshot.clone())),
            Cache::new(config.series_cache_ttl),
        )
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn engine(&self) -> &DashboardEngine {
        &self.engine
    }

    async fn sourced_series(&self, today: NaiveDate) -> Result<SourcedSeries, EngineError> {
        self.cache
            .get_or_refresh(&self.asset, || self.chain.fetch(self.history_start, today))
            .await
    }

    /// Cached series with the latest close replaced by the live spot price.
    async fn inputs(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<(SourcedSeries, PriceSeries, MarketSnapshot), EngineError> {
        let sourced = self.sourced_series(as_of.date_naive()).await?;
        let snapshot = snapshots::collect(self.snapshots.as_ref()).await;

        let series = match snapshot.spot_price() {
            Some(spot) => match sourced.series.with_latest_price(spot) {
                Ok(series) => series,
                Err(e) => {
                    warn!("Ignoring spot price {}: {}", spot, e);
                    sourced.series.clone()
                }
            },
            None => sourced.series.clone(),
        };

        Ok((sourced, series, snapshot))
    }

    pub async fn dashboard(&self) -> Result<DashboardResult, EngineError> {
        self.dashboard_at(Utc::now()).await
    }

    /// Dashboard as of a given instant.
    pub async fn dashboard_at(&self, as_of: DateTime<Utc>) -> Result<DashboardResult, EngineError> {
        let (sourced, series, snapshot) = self.inputs(as_of).await?;
        let ctx = EvaluationContext::new(as_of, &snapshot, &self.constants);

        let mut dashboard = self.engine.compute_dashboard(&series, &ctx);
        dashboard.warnings = sourced.warnings();
        dashboard.source = sourced.source;
        Ok(dashboard)
    }

    pub async fn history(&self, id: IndicatorId, days: usize) -> Result<HistorySeries, EngineError> {
        self.history_at(id, days, Utc::now()).await
    }

    /// Indicator history over the same inputs a dashboard at `as_of` uses.
    pub async fn history_at(
        &self,
        id: IndicatorId,
        days: usize,
        as_of: DateTime<Utc>,
    ) -> Result<HistorySeries, EngineError> {
        let (_, series, snapshot) = self.inputs(as_of).await?;
        let ctx = EvaluationContext::new(as_of, &snapshot, &self.constants);
        self.engine.indicator_history(id, &series, days, &ctx)
    }
}
