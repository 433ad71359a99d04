//! Indicator identifiers, result records and the weight table.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Stable identifier of every indicator the engine knows about.
///
/// Declaration order is the display order of a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorId {
    MayerMultiple,
    PiCycleTop,
    HalvingCycle,
    Ahr999,
    PowerLawCorridor,
    FearGreedIndex,
    FundingRate,
    LongShortRatio,
    MaxPain,
    BtcDominance,
    EtfActivity,
    CompanyHoldings,
    ExchangeReserve,
    RsiMultiTimeframe,
    TrendMultiTimeframe,
}

impl IndicatorId {
    pub const ALL: [IndicatorId; 15] = [
        IndicatorId::MayerMultiple,
        IndicatorId::PiCycleTop,
        IndicatorId::HalvingCycle,
        IndicatorId::Ahr999,
        IndicatorId::PowerLawCorridor,
        IndicatorId::FearGreedIndex,
        IndicatorId::FundingRate,
        IndicatorId::LongShortRatio,
        IndicatorId::MaxPain,
        IndicatorId::BtcDominance,
        IndicatorId::EtfActivity,
        IndicatorId::CompanyHoldings,
        IndicatorId::ExchangeReserve,
        IndicatorId::RsiMultiTimeframe,
        IndicatorId::TrendMultiTimeframe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorId::MayerMultiple => "mayer_multiple",
            IndicatorId::PiCycleTop => "pi_cycle_top",
            IndicatorId::HalvingCycle => "halving_cycle",
            IndicatorId::Ahr999 => "ahr999",
            IndicatorId::PowerLawCorridor => "power_law_corridor",
            IndicatorId::FearGreedIndex => "fear_greed_index",
            IndicatorId::FundingRate => "funding_rate",
            IndicatorId::LongShortRatio => "long_short_ratio",
            IndicatorId::MaxPain => "max_pain",
            IndicatorId::BtcDominance => "btc_dominance",
            IndicatorId::EtfActivity => "etf_activity",
            IndicatorId::CompanyHoldings => "company_holdings",
            IndicatorId::ExchangeReserve => "exchange_reserve",
            IndicatorId::RsiMultiTimeframe => "rsi_multi_timeframe",
            IndicatorId::TrendMultiTimeframe => "trend_multi_timeframe",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            IndicatorId::MayerMultiple => "Mayer Multiple",
            IndicatorId::PiCycleTop => "Pi Cycle Top",
            IndicatorId::HalvingCycle => "Halving Cycle",
            IndicatorId::Ahr999 => "AHR999 Index",
            IndicatorId::PowerLawCorridor => "Power Law Corridor",
            IndicatorId::FearGreedIndex => "Fear & Greed Index",
            IndicatorId::FundingRate => "Funding Rate",
            IndicatorId::LongShortRatio => "Long/Short Ratio",
            IndicatorId::MaxPain => "Options Max Pain",
            IndicatorId::BtcDominance => "BTC Dominance",
            IndicatorId::EtfActivity => "Spot ETF Activity",
            IndicatorId::CompanyHoldings => "Company Holdings",
            IndicatorId::ExchangeReserve => "Exchange Reserve",
            IndicatorId::RsiMultiTimeframe => "RSI Multi-Timeframe",
            IndicatorId::TrendMultiTimeframe => "Trend Multi-Timeframe",
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            IndicatorId::MayerMultiple | IndicatorId::PiCycleTop | IndicatorId::HalvingCycle => {
                Priority::Core
            }
            IndicatorId::Ahr999
            | IndicatorId::PowerLawCorridor
            | IndicatorId::FearGreedIndex
            | IndicatorId::FundingRate
            | IndicatorId::LongShortRatio
            | IndicatorId::MaxPain => Priority::Reference,
            IndicatorId::BtcDominance
            | IndicatorId::EtfActivity
            | IndicatorId::CompanyHoldings
            | IndicatorId::ExchangeReserve => Priority::Auxiliary,
            IndicatorId::RsiMultiTimeframe | IndicatorId::TrendMultiTimeframe => {
                Priority::ShortTerm
            }
        }
    }

    /// Weight used when configuration does not override it.
    pub fn default_weight(&self) -> f64 {
        match self {
            IndicatorId::MayerMultiple => 0.15,
            IndicatorId::PiCycleTop => 0.12,
            IndicatorId::HalvingCycle => 0.08,
            IndicatorId::Ahr999 => 0.10,
            IndicatorId::PowerLawCorridor => 0.10,
            IndicatorId::FearGreedIndex => 0.12,
            IndicatorId::FundingRate => 0.10,
            IndicatorId::LongShortRatio => 0.08,
            IndicatorId::MaxPain => 0.05,
            IndicatorId::BtcDominance => 0.05,
            IndicatorId::EtfActivity => 0.05,
            IndicatorId::CompanyHoldings => 0.03,
            IndicatorId::ExchangeReserve => 0.02,
            IndicatorId::RsiMultiTimeframe => 0.05,
            IndicatorId::TrendMultiTimeframe => 0.05,
        }
    }

    fn description(&self) -> &'static str {
        match self {
            IndicatorId::MayerMultiple => "Price relative to its 200-day moving average",
            IndicatorId::PiCycleTop => "Distance of the 111-day average below twice the 350-day average",
            IndicatorId::HalvingCycle => "Months elapsed since the most recent supply halving",
            IndicatorId::Ahr999 => "Accumulation index combining cost basis and growth-curve value",
            IndicatorId::PowerLawCorridor => "Position inside the long-run power-law price corridor",
            IndicatorId::FearGreedIndex => "Market sentiment index from 0 (fear) to 100 (greed)",
            IndicatorId::FundingRate => "Perpetual futures funding rate in percent",
            IndicatorId::LongShortRatio => "Ratio of long to short derivative accounts",
            IndicatorId::MaxPain => "Settlement price that pays option holders the least",
            IndicatorId::BtcDominance => "Share of total market capitalisation in percent",
            IndicatorId::EtfActivity => "Daily spot ETF trading volume in billions of USD",
            IndicatorId::CompanyHoldings => "Coins held on listed company balance sheets",
            IndicatorId::ExchangeReserve => "Coins held on exchange wallets",
            IndicatorId::RsiMultiTimeframe => "RSI(14) overbought/oversold vote across timeframes",
            IndicatorId::TrendMultiTimeframe => "20/50 moving-average trend vote across timeframes",
        }
    }

    fn method(&self) -> Option<&'static str> {
        match self {
            IndicatorId::MayerMultiple => Some("price / SMA(200)"),
            IndicatorId::PiCycleTop => Some("(2 * SMA(350) - SMA(111)) / (2 * SMA(350)) * 100"),
            IndicatorId::HalvingCycle => Some("days since halving / 30.44"),
            IndicatorId::MaxPain => {
                Some("strike of the busiest expiry minimising call and put intrinsic payout")
            }
            IndicatorId::Ahr999 => Some("(price / GMA(200)) * (price / power-law fair value)"),
            IndicatorId::PowerLawCorridor => {
                Some("linear position: lower band -1, fair value 0, upper band +1")
            }
            IndicatorId::RsiMultiTimeframe => Some("RSI(14) on 1d/3d/1w/1M/1y closes"),
            IndicatorId::TrendMultiTimeframe => Some("SMA(20) vs SMA(50) on 1d/3d/1w/1M/1y closes"),
            _ => None,
        }
    }

    fn url(&self) -> Option<&'static str> {
        match self {
            IndicatorId::MayerMultiple => Some("https://charts.bitbo.io/mayer-multiple/"),
            IndicatorId::PiCycleTop => Some("https://www.lookintobitcoin.com/charts/pi-cycle-top-indicator/"),
            IndicatorId::Ahr999 => Some("https://www.coinglass.com/pro/i/ahr999"),
            IndicatorId::FearGreedIndex => Some("https://alternative.me/crypto/fear-and-greed-index/"),
            IndicatorId::MaxPain => Some("https://www.deribit.com/statistics/BTC/options-open-interest"),
            IndicatorId::EtfActivity => Some("https://coinglass.com/bitcoin-etf"),
            IndicatorId::CompanyHoldings => Some("https://bitcointreasuries.net"),
            IndicatorId::ExchangeReserve => {
                Some("https://cryptoquant.com/asset/btc/chart/exchange-flows/exchange-reserve")
            }
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        IndicatorId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == needle)
            .ok_or_else(|| EngineError::UnknownIndicator(s.to_string()))
    }
}

/// Importance tier of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Core,
    Reference,
    Auxiliary,
    ShortTerm,
}

/// Display tone of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Green,
    Yellow,
    Red,
    Gray,
}

impl Tone {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.5 {
            Tone::Green
        } else if score <= -0.75 {
            Tone::Red
        } else {
            Tone::Yellow
        }
    }
}

/// One scored indicator reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub id: IndicatorId,
    pub name: String,
    /// Raw reading; `NaN` when the indicator could not be computed.
    #[serde(with = "nan_as_null")]
    pub value: f64,
    /// Normalized score in [-1, 1], +1 being the most bullish.
    pub score: f64,
    pub color: Tone,
    pub status: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl IndicatorResult {
    /// A computed reading. The score is clamped to [-1, 1].
    pub fn new(id: IndicatorId, value: f64, score: f64, status: impl Into<String>) -> Self {
        let score = if score.is_finite() {
            score.clamp(-1.0, 1.0)
        } else {
            0.0
        };

        Self {
            id,
            name: id.display_name().to_string(),
            value,
            score,
            color: Tone::from_score(score),
            status: status.into(),
            priority: id.priority(),
            description: Some(id.description().to_string()),
            method: id.method().map(str::to_string),
            url: id.url().map(str::to_string),
        }
    }

    /// A reading that could not be computed.
    pub fn unavailable(id: IndicatorId, error: &EngineError) -> Self {
        Self {
            value: f64::NAN,
            score: 0.0,
            color: Tone::Gray,
            status: error.status_text(),
            ..Self::new(id, f64::NAN, 0.0, "")
        }
    }

    pub fn is_available(&self) -> bool {
        self.value.is_finite()
    }
}

/// Relative weight per indicator. Weights need not sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    weights: BTreeMap<IndicatorId, f64>,
}

impl WeightTable {
    /// A table with no weights at all.
    pub fn empty() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }

    /// Builder-style insert. Negative or non-finite weights become zero.
    pub fn with(mut self, id: IndicatorId, weight: f64) -> Self {
        self.set(id, weight);
        self
    }

    pub fn set(&mut self, id: IndicatorId, weight: f64) {
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        self.weights.insert(id, weight);
    }

    pub fn get(&self, id: IndicatorId) -> Option<f64> {
        self.weights.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndicatorId, f64)> + '_ {
        self.weights.iter().map(|(id, w)| (*id, *w))
    }

    /// Apply `id=weight,id=weight` overrides.
    ///
    /// Returns the entries that were rejected (unknown id or unparsable
    /// weight) so the caller can log them.
    pub fn apply_overrides(&mut self, spec: &str) -> Vec<String> {
        let mut rejected = Vec::new();

        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let parsed = entry.split_once('=').and_then(|(id, weight)| {
                let id = id.parse::<IndicatorId>().ok()?;
                let weight = weight.trim().parse::<f64>().ok()?;
                Some((id, weight))
            });

            match parsed {
                Some((id, weight)) => self.set(id, weight),
                None => rejected.push(entry.to_string()),
            }
        }

        rejected
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        IndicatorId::ALL
            .iter()
            .fold(Self::empty(), |table, id| table.with(*id, id.default_weight()))
    }
}

/// Serialize non-finite floats as JSON `null` and read `null` back as NaN.
pub(crate) mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
