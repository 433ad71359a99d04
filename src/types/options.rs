//! Option open interest and the max-pain strike.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Right conveyed by an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

/// Open interest on one listed contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Exchange expiry code, e.g. `29MAR24`.
    pub expiry: String,
    pub strike: f64,
    pub kind: OptionKind,
    /// Outstanding contracts, in units of the underlying.
    pub open_interest: f64,
}

impl OptionContract {
    /// Parse an instrument name of the form `BTC-29MAR24-60000-C`.
    pub fn from_instrument(name: &str, open_interest: f64) -> Result<Self, EngineError> {
        let invalid = || EngineError::InvalidSeries(format!("not an option instrument: {}", name));

        let parts: Vec<&str> = name.split('-').collect();
        let [_, expiry, strike, kind] = parts.as_slice() else {
            return Err(invalid());
        };
        let strike: f64 = strike.parse().map_err(|_| invalid())?;
        let kind = match *kind {
            "C" => OptionKind::Call,
            "P" => OptionKind::Put,
            _ => return Err(invalid()),
        };
        if expiry.is_empty() || !strike.is_finite() || strike <= 0.0 {
            return Err(invalid());
        }

        Ok(Self {
            expiry: expiry.to_string(),
            strike,
            kind,
            open_interest,
        })
    }

    /// Intrinsic value paid to holders if the underlying settles at `price`.
    fn payout(&self, price: f64) -> f64 {
        let intrinsic = match self.kind {
            OptionKind::Call => price - self.strike,
            OptionKind::Put => self.strike - price,
        };
        intrinsic.max(0.0) * self.open_interest
    }
}

/// Strike at which option holders collect the least at expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct PainPoint {
    pub expiry: String,
    pub strike: f64,
    /// Total payout to holders when settling at `strike`.
    pub payout: f64,
}

/// Contracts with open interest, across every listed expiry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionChain {
    contracts: Vec<OptionContract>,
}

impl OptionChain {
    /// Contracts without positive, finite open interest are dropped.
    pub fn new(contracts: Vec<OptionContract>) -> Self {
        let contracts = contracts
            .into_iter()
            .filter(|c| c.open_interest.is_finite() && c.open_interest > 0.0)
            .collect();
        Self { contracts }
    }

    pub fn contracts(&self) -> &[OptionContract] {
        &self.contracts
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Expiry carrying the most open interest. Ties go to the first code in
    /// lexical order.
    pub fn busiest_expiry(&self) -> Option<&str> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for contract in &self.contracts {
            *totals.entry(contract.expiry.as_str()).or_insert(0.0) += contract.open_interest;
        }

        let mut busiest: Option<(&str, f64)> = None;
        for (expiry, total) in totals {
            if busiest.map_or(true, |(_, best)| total > best) {
                busiest = Some((expiry, total));
            }
        }
        busiest.map(|(expiry, _)| expiry)
    }

    /// Max-pain strike of the busiest expiry.
    ///
    /// Every listed strike of that expiry is a candidate settlement price;
    /// the one with the smallest total payout wins, the lowest strike on ties.
    pub fn max_pain(&self) -> Result<PainPoint, EngineError> {
        let expiry = self
            .busiest_expiry()
            .ok_or_else(|| EngineError::DataUnavailable("no open interest".to_string()))?;
        let contracts: Vec<&OptionContract> =
            self.contracts.iter().filter(|c| c.expiry == expiry).collect();

        let mut strikes: Vec<f64> = contracts.iter().map(|c| c.strike).collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup();

        let mut best: Option<(f64, f64)> = None;
        for strike in strikes {
            let payout: f64 = contracts.iter().map(|c| c.payout(strike)).sum();
            if best.map_or(true, |(_, lowest)| payout < lowest) {
                best = Some((strike, payout));
            }
        }

        let (strike, payout) = best.ok_or_else(|| {
            EngineError::ComputationDegenerate(format!("no strikes listed for {}", expiry))
        })?;
        Ok(PainPoint {
            expiry: expiry.to_string(),
            strike,
            payout,
        })
    }
}
