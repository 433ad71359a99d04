//! Live market snapshot providers.

use crate::config::SnapshotOverrides;
use crate::error::EngineError;
use crate::types::{MarketMetric, MarketSnapshot, OptionChain, OptionContract};
use futures_util::future::{join, join_all};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

/// Anything that can read market scalars and, optionally, option open
/// interest.
pub trait MarketSnapshotProvider: Send + Sync {
    fn fetch<'a>(
        &'a self,
        metric: MarketMetric,
    ) -> Pin<Box<dyn Future<Output = Result<f64, EngineError>> + Send + 'a>>;

    fn fetch_option_chain<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<OptionChain, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            Err(EngineError::DataUnavailable(
                "option chain not supported".to_string(),
            ))
        })
    }
}

/// One row of an exchange option book summary.
#[derive(Debug, Deserialize)]
struct BookSummary {
    instrument_name: String,
    open_interest: f64,
}

/// A bare list of rows, or the list wrapped in a `result` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BookSummaries {
    Bare(Vec<BookSummary>),
    Wrapped { result: Vec<BookSummary> },
}

/// Parse option book summaries. Rows that are not options are skipped.
pub fn parse_option_chain(raw: &str) -> Result<OptionChain, EngineError> {
    let summaries: BookSummaries = serde_json::from_str(raw)
        .map_err(|e| EngineError::DataUnavailable(format!("malformed option chain: {}", e)))?;
    let rows = match summaries {
        BookSummaries::Bare(rows) | BookSummaries::Wrapped { result: rows } => rows,
    };

    let mut contracts = Vec::with_capacity(rows.len());
    for row in rows {
        match OptionContract::from_instrument(&row.instrument_name, row.open_interest) {
            Ok(contract) => contracts.push(contract),
            Err(e) => debug!("Skipping book row: {}", e),
        }
    }
    Ok(OptionChain::new(contracts))
}

/// Serves fixed readings taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotProvider {
    overrides: SnapshotOverrides,
}

impl StaticSnapshotProvider {
    pub fn new(overrides: SnapshotOverrides) -> Self {
        Self { overrides }
    }

    fn reading(&self, metric: MarketMetric) -> Option<f64> {
        match metric {
            MarketMetric::FundingRate => self.overrides.funding_rate,
            MarketMetric::LongShortRatio => self.overrides.long_short_ratio,
            MarketMetric::FearGreedIndex => self.overrides.fear_greed_index,
            MarketMetric::BtcDominance => self.overrides.btc_dominance,
            MarketMetric::SpotPrice => self.overrides.spot_price,
            MarketMetric::EtfVolume => self.overrides.etf_volume,
            MarketMetric::CompanyHoldings => self.overrides.company_holdings,
        }
    }
}

impl MarketSnapshotProvider for StaticSnapshotProvider {
    fn fetch<'a>(
        &'a self,
        metric: MarketMetric,
    ) -> Pin<Box<dyn Future<Output = Result<f64, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            self.reading(metric).ok_or_else(|| {
                EngineError::DataUnavailable(format!("{} not configured", metric.as_str()))
            })
        })
    }

    fn fetch_option_chain<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<OptionChain, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let path = self.overrides.option_chain_file.as_ref().ok_or_else(|| {
                EngineError::DataUnavailable("option chain not configured".to_string())
            })?;
            let raw = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| EngineError::DataUnavailable(format!("{}: {}", path.display(), e)))?;
            let chain = parse_option_chain(&raw)?;
            debug!(
                "Loaded {} option contracts from {}",
                chain.contracts().len(),
                path.display()
            );
            Ok(chain)
        })
    }
}

fn reason(error: EngineError) -> String {
    match error {
        EngineError::DataUnavailable(reason) => reason,
        other => other.to_string(),
    }
}

/// Read every metric and the option chain concurrently. Failures are kept
/// as reasons.
pub async fn collect(provider: &dyn MarketSnapshotProvider) -> MarketSnapshot {
    let scalars = join_all(MarketMetric::ALL.iter().map(|&metric| async move {
        (metric, provider.fetch(metric).await)
    }));
    let (readings, chain) = join(scalars, provider.fetch_option_chain()).await;

    let mut snapshot = MarketSnapshot::new();
    for (metric, reading) in readings {
        if let Err(e) = &reading {
            debug!("Snapshot {} unavailable: {}", metric.as_str(), e);
        }
        snapshot.insert(metric, reading.map_err(reason));
    }
    if let Err(e) = &chain {
        debug!("Snapshot option chain unavailable: {}", e);
    }
    snapshot.set_option_chain(chain.map_err(reason));
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_static_readings() {
        let provider = StaticSnapshotProvider::new(SnapshotOverrides {
            funding_rate: Some(0.01),
            fear_greed_index: Some(20.0),
            ..SnapshotOverrides::default()
        });

        let snapshot = tokio_test::block_on(collect(&provider));

        assert_eq!(snapshot.get(MarketMetric::FundingRate), Ok(0.01));
        assert_eq!(snapshot.get(MarketMetric::FearGreedIndex), Ok(20.0));
        assert_eq!(
            snapshot.get(MarketMetric::BtcDominance),
            Err(EngineError::DataUnavailable(
                "btc_dominance not configured".to_string()
            ))
        );
        assert_eq!(snapshot.spot_price(), None);
        assert_eq!(
            snapshot.option_chain(),
            Err(EngineError::DataUnavailable(
                "option chain not configured".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_option_book_summaries() {
        let raw = r#"{"result": [
            {"instrument_name": "BTC-29MAR24-60000-C", "open_interest": 120.5},
            {"instrument_name": "BTC-29MAR24-50000-P", "open_interest": 0.0},
            {"instrument_name": "BTC-PERPETUAL", "open_interest": 9000.0}
        ]}"#;
        let chain = parse_option_chain(raw).unwrap();
        assert_eq!(chain.contracts().len(), 1);
        assert_eq!(chain.contracts()[0].strike, 60_000.0);

        let bare = r#"[{"instrument_name": "BTC-5APR24-70000-P", "open_interest": 3.0}]"#;
        assert_eq!(parse_option_chain(bare).unwrap().contracts().len(), 1);

        assert!(matches!(
            parse_option_chain("{\"rows\": 1}"),
            Err(EngineError::DataUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_option_chain_file_is_collected() {
        let path = std::env::temp_dir().join(format!("tidewatch-options-{}.json", std::process::id()));
        tokio::fs::write(
            &path,
            r#"[{"instrument_name": "BTC-29MAR24-60000-C", "open_interest": 10.0},
                {"instrument_name": "BTC-29MAR24-70000-P", "open_interest": 10.0}]"#,
        )
        .await
        .unwrap();

        let provider = StaticSnapshotProvider::new(SnapshotOverrides {
            option_chain_file: Some(path.clone()),
            etf_volume: Some(1.5),
            ..SnapshotOverrides::default()
        });
        let snapshot = collect(&provider).await;
        tokio::fs::remove_file(&path).await.ok();

        assert_eq!(snapshot.get(MarketMetric::EtfVolume), Ok(1.5));
        let pain = snapshot.option_chain().unwrap().max_pain().unwrap();
        assert_eq!(pain.expiry, "29MAR24");
        assert_eq!(pain.strike, 60_000.0);
    }
}
