//! Weighted combination of indicator scores.

use crate::types::{IndicatorResult, Recommendation, RecommendationScale, WeightTable};

/// Combined score of a set of results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub total_score: f64,
    pub recommendation: Recommendation,
    /// Number of results that contributed.
    pub included: usize,
}

/// Renormalized weighted mean of the available scores.
///
/// Results with a NaN value or without a weight are left out entirely, so
/// missing data never pulls the total towards zero. With nothing left the
/// total is 0.
pub fn aggregate<'a, I>(results: I, weights: &WeightTable, scale: RecommendationScale) -> Aggregate
where
    I: IntoIterator<Item = &'a IndicatorResult>,
{
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    let mut included = 0;

    for result in results {
        if result.value.is_nan() {
            continue;
        }
        let Some(weight) = weights.get(result.id) else {
            continue;
        };
        weighted += weight * result.score;
        weight_sum += weight;
        included += 1;
    }

    let total_score = if weight_sum > 0.0 {
        weighted / weight_sum
    } else {
        0.0
    };

    Aggregate {
        total_score,
        recommendation: scale.classify(total_score),
        included,
    }
}
