//! Market readings consumed by the snapshot indicators.

use super::options::OptionChain;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A live scalar the engine can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketMetric {
    /// Percent per funding interval.
    FundingRate,
    LongShortRatio,
    /// 0 to 100.
    FearGreedIndex,
    /// Percent of total market capitalisation.
    BtcDominance,
    SpotPrice,
    /// Daily spot ETF trading volume, billions of USD.
    EtfVolume,
    /// Coins held on listed company balance sheets.
    CompanyHoldings,
}

impl MarketMetric {
    pub const ALL: [MarketMetric; 7] = [
        MarketMetric::FundingRate,
        MarketMetric::LongShortRatio,
        MarketMetric::FearGreedIndex,
        MarketMetric::BtcDominance,
        MarketMetric::SpotPrice,
        MarketMetric::EtfVolume,
        MarketMetric::CompanyHoldings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketMetric::FundingRate => "funding_rate",
            MarketMetric::LongShortRatio => "long_short_ratio",
            MarketMetric::FearGreedIndex => "fear_greed_index",
            MarketMetric::BtcDominance => "btc_dominance",
            MarketMetric::SpotPrice => "spot_price",
            MarketMetric::EtfVolume => "etf_volume",
            MarketMetric::CompanyHoldings => "company_holdings",
        }
    }
}

/// Readings collected for one dashboard computation.
///
/// A metric is either a finite reading or the reason it is missing. The
/// option chain follows the same rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    readings: HashMap<MarketMetric, Result<f64, String>>,
    options: Option<Result<OptionChain, String>>,
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a successful reading.
    pub fn with_reading(mut self, metric: MarketMetric, value: f64) -> Self {
        self.insert(metric, Ok(value));
        self
    }

    pub fn insert(&mut self, metric: MarketMetric, reading: Result<f64, String>) {
        let reading = reading.and_then(|v| {
            if v.is_finite() {
                Ok(v)
            } else {
                Err(format!("non-finite reading {}", v))
            }
        });
        self.readings.insert(metric, reading);
    }

    pub fn get(&self, metric: MarketMetric) -> Result<f64, EngineError> {
        match self.readings.get(&metric) {
            Some(Ok(v)) => Ok(*v),
            Some(Err(reason)) => Err(EngineError::DataUnavailable(reason.clone())),
            None => Err(EngineError::DataUnavailable("not collected".to_string())),
        }
    }

    pub fn spot_price(&self) -> Option<f64> {
        self.get(MarketMetric::SpotPrice).ok()
    }

    pub fn with_option_chain(mut self, chain: OptionChain) -> Self {
        self.set_option_chain(Ok(chain));
        self
    }

    pub fn set_option_chain(&mut self, chain: Result<OptionChain, String>) {
        self.options = Some(chain);
    }

    pub fn option_chain(&self) -> Result<&OptionChain, EngineError> {
        match &self.options {
            Some(Ok(chain)) => Ok(chain),
            Some(Err(reason)) => Err(EngineError::DataUnavailable(reason.clone())),
            None => Err(EngineError::DataUnavailable("not collected".to_string())),
        }
    }
}
