//! Price history providers and the ordered fallback chain.

use crate::config::{SyntheticConfig, MAX_SYNTHETIC_LENGTH};
use crate::error::EngineError;
use crate::types::{PricePoint, PriceSeries};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Anything that can supply daily price history.
pub trait PriceHistoryProvider: Send + Sync {
    /// Short name reported as the dashboard source.
    fn name(&self) -> &str;

    /// Fetch history from `start` onwards.
    fn fetch<'a>(
        &'a self,
        start: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, EngineError>> + Send + 'a>>;
}

/// Reads a local `[[unix_ms, price], ...]` history file.
///
/// Several observations on one UTC day collapse to the last one.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse the file format into a series starting at `start`.
    pub fn parse(raw: &str, start: NaiveDate) -> Result<PriceSeries, EngineError> {
        let mut rows: Vec<(i64, f64)> = serde_json::from_str(raw)
            .map_err(|e| EngineError::DataUnavailable(format!("malformed history: {}", e)))?;
        rows.sort_by_key(|(ms, _)| *ms);

        let mut points: Vec<PricePoint> = Vec::with_capacity(rows.len());
        for (ms, price) in rows {
            let date = Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| EngineError::DataUnavailable(format!("bad timestamp {}", ms)))?
                .date_naive();
            if date < start {
                continue;
            }
            match points.last_mut() {
                Some(last) if last.date == date => last.price = price,
                _ => points.push(PricePoint { date, price }),
            }
        }

        if points.is_empty() {
            return Err(EngineError::DataUnavailable(format!(
                "no observations on or after {}",
                start
            )));
        }
        PriceSeries::new(points)
    }
}

impl PriceHistoryProvider for JsonFileProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch<'a>(
        &'a self,
        start: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                EngineError::DataUnavailable(format!("{}: {}", self.path.display(), e))
            })?;
            let series = Self::parse(&raw, start)?;
            debug!(
                "Loaded {} observations from {}",
                series.len(),
                self.path.display()
            );
            Ok(series)
        })
    }
}

/// Deterministic stand-in series used when every provider fails.
///
/// Exponential trend with a yearly cycle and bounded noise, scaled so the
/// final price equals the anchor.
pub struct SyntheticSeries;

impl SyntheticSeries {
    pub fn generate(config: &SyntheticConfig, end: NaiveDate) -> Result<PriceSeries, EngineError> {
        if config.length == 0 {
            return Err(EngineError::InvalidSeries(
                "synthetic length must be positive".to_string(),
            ));
        }
        if config.length > MAX_SYNTHETIC_LENGTH {
            return Err(EngineError::InvalidSeries(format!(
                "synthetic length {} exceeds {}",
                config.length, MAX_SYNTHETIC_LENGTH
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let raw: Vec<f64> = (0..config.length)
            .map(|day| {
                let d = day as f64;
                let trend = 7_000.0 * 1.002f64.powf(d);
                let cycle = (d / 365.0 * 2.0 * PI).sin() * 0.3;
                let noise = rng.gen_range(-0.03..0.03);
                trend * (1.0 + cycle + noise)
            })
            .collect();

        let scale = config.anchor_price / raw[raw.len() - 1];
        let prices = raw.into_iter().map(|p| p * scale).collect();
        let start = end
            .checked_sub_signed(Duration::days(config.length as i64 - 1))
            .ok_or_else(|| EngineError::InvalidSeries("synthetic start out of range".to_string()))?;

        PriceSeries::daily(start, prices)
    }
}

/// A series together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedSeries {
    pub series: PriceSeries,
    /// Name of the provider that produced the series.
    pub source: String,
    /// One entry per provider that failed before the source succeeded.
    pub failures: Vec<String>,
    pub synthetic: bool,
}

impl SourcedSeries {
    /// Notices to surface on the dashboard.
    pub fn warnings(&self) -> Vec<String> {
        if self.synthetic {
            vec![format!(
                "{}; showing synthetic demo data",
                EngineError::AllSourcesExhausted(self.failures.clone())
            )]
        } else {
            Vec::new()
        }
    }
}

/// Ordered list of providers; the first success wins.
pub struct FallbackChain {
    providers: Vec<Arc<dyn PriceHistoryProvider>>,
    synthetic: SyntheticConfig,
}

impl FallbackChain {
    pub fn new(providers: Vec<Arc<dyn PriceHistoryProvider>>, synthetic: SyntheticConfig) -> Self {
        Self {
            providers,
            synthetic,
        }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Try each provider in order. When all fail, fall back to a synthetic
    /// series ending on `today` and log the collected failures.
    pub async fn fetch(
        &self,
        start: NaiveDate,
        today: NaiveDate,
    ) -> Result<SourcedSeries, EngineError> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            match provider.fetch(start).await {
                Ok(series) => {
                    info!(
                        "Fetched {} observations from {}",
                        series.len(),
                        provider.name()
                    );
                    return Ok(SourcedSeries {
                        series,
                        source: provider.name().to_string(),
                        failures,
                        synthetic: false,
                    });
                }
                Err(e) => {
                    debug!("History provider {} failed: {}", provider.name(), e);
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        warn!(
            "{}, generating synthetic series",
            EngineError::AllSourcesExhausted(failures.clone())
        );
        let series = SyntheticSeries::generate(&self.synthetic, today)?;

        Ok(SourcedSeries {
            series,
            source: "synthetic".to_string(),
            failures,
            synthetic: true,
        })
    }
}
