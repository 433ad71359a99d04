//! Dashboard and history documents.

use super::indicator::{IndicatorId, IndicatorResult, Tone};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Recommendation label derived from the weighted total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Accumulate,
    Hold,
    Reduce,
    Sell,
    StrongSell,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "strong buy",
            Recommendation::Buy => "buy",
            Recommendation::Accumulate => "accumulate",
            Recommendation::Hold => "hold",
            Recommendation::Reduce => "reduce",
            Recommendation::Sell => "sell",
            Recommendation::StrongSell => "strong sell",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Inclusive lower bounds, scanned from the top.
const GRADED_CUTOFFS: [(f64, Recommendation); 6] = [
    (0.8, Recommendation::StrongBuy),
    (0.4, Recommendation::Buy),
    (0.1, Recommendation::Accumulate),
    (-0.1, Recommendation::Hold),
    (-0.4, Recommendation::Reduce),
    (-0.8, Recommendation::Sell),
];

const CLASSIC_CUTOFFS: [(f64, Recommendation); 2] =
    [(0.5, Recommendation::Buy), (-0.3, Recommendation::Hold)];

/// Which cutoff table maps a total score to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationScale {
    /// Seven labels from strong buy to strong sell.
    #[default]
    Graded,
    /// Three labels: buy, hold, reduce.
    Classic,
}

impl RecommendationScale {
    pub fn classify(&self, score: f64) -> Recommendation {
        let (cutoffs, floor): (&[(f64, Recommendation)], Recommendation) = match self {
            RecommendationScale::Graded => (&GRADED_CUTOFFS, Recommendation::StrongSell),
            RecommendationScale::Classic => (&CLASSIC_CUTOFFS, Recommendation::Reduce),
        };

        cutoffs
            .iter()
            .find(|(bound, _)| score >= *bound)
            .map(|(_, rec)| *rec)
            .unwrap_or(floor)
    }
}

impl FromStr for RecommendationScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "graded" => Ok(RecommendationScale::Graded),
            "classic" => Ok(RecommendationScale::Classic),
            other => Err(format!("unknown recommendation scale: {}", other)),
        }
    }
}

/// Full dashboard for one asset at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResult {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub indicators: BTreeMap<IndicatorId, IndicatorResult>,
    pub total_score: f64,
    pub recommendation: Recommendation,
    pub source: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A horizontal guide line drawn on a history chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub value: f64,
    pub color: Tone,
    pub description: String,
}

impl Threshold {
    pub fn new(value: f64, color: Tone, description: &str) -> Self {
        Self {
            value,
            color,
            description: description.to_string(),
        }
    }
}

/// Trailing values of one indicator, ready to plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    pub indicator: IndicatorId,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    pub thresholds: BTreeMap<String, Threshold>,
}

impl HistorySeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graded_cutoffs_are_inclusive() {
        let scale = RecommendationScale::Graded;
        assert_eq!(scale.classify(0.8), Recommendation::StrongBuy);
        assert_eq!(scale.classify(0.79999), Recommendation::Buy);
        assert_eq!(scale.classify(0.4), Recommendation::Buy);
        assert_eq!(scale.classify(0.1), Recommendation::Accumulate);
        assert_eq!(scale.classify(0.0), Recommendation::Hold);
        assert_eq!(scale.classify(-0.1), Recommendation::Hold);
        assert_eq!(scale.classify(-0.4), Recommendation::Reduce);
        assert_eq!(scale.classify(-0.8), Recommendation::Sell);
        assert_eq!(scale.classify(-0.81), Recommendation::StrongSell);
    }

    #[test]
    fn test_classic_scale() {
        let scale = RecommendationScale::Classic;
        assert_eq!(scale.classify(0.5), Recommendation::Buy);
        assert_eq!(scale.classify(0.49), Recommendation::Hold);
        assert_eq!(scale.classify(-0.3), Recommendation::Hold);
        assert_eq!(scale.classify(-0.31), Recommendation::Reduce);
    }

    #[test]
    fn test_scale_from_str() {
        assert_eq!("Classic".parse(), Ok(RecommendationScale::Classic));
        assert_eq!("graded".parse(), Ok(RecommendationScale::Graded));
        assert!("loose".parse::<RecommendationScale>().is_err());
    }

    #[test]
    fn test_recommendation_label() {
        assert_eq!(Recommendation::StrongBuy.to_string(), "strong buy");
        assert_eq!(
            serde_json::to_string(&Recommendation::StrongSell).unwrap(),
            "\"strong_sell\""
        );
    }
}
