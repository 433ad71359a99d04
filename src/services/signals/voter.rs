//! Multi-timeframe voting.
//!
//! One base formula is evaluated over several calendar resamplings of the
//! same series. Each timeframe casts a vote; the votes are tallied into a
//! single score.

use super::{EvaluationContext, Indicator};
use crate::error::EngineError;
use crate::types::{HistorySeries, IndicatorId, IndicatorResult, PriceSeries, Timeframe};
use std::fmt::Write as _;
use tracing::debug;

/// Direction of a single timeframe's reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lean {
    Bullish,
    Bearish,
    Neutral,
}

/// What a formula reports for one timeframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub lean: Lean,
    /// How far into its zone the reading is; non-negative.
    pub strength: f64,
}

/// A reading tagged with the timeframe that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vote {
    pub timeframe: Timeframe,
    pub reading: Reading,
}

/// A formula that can be evaluated on any timeframe's closes.
pub trait TimeframeFormula: Send + Sync {
    fn id(&self) -> IndicatorId;

    /// Closes needed for one reading.
    fn min_periods(&self) -> usize;

    fn read(&self, closes: &[f64]) -> Result<Reading, EngineError>;

    /// Word used for a lean in status text.
    fn label(&self, lean: Lean) -> &'static str;

    /// Trailing daily readings.
    fn project_daily(
        &self,
        _series: &PriceSeries,
        _days: usize,
    ) -> Result<HistorySeries, EngineError> {
        Err(EngineError::HistoryUnsupported(self.id().to_string()))
    }
}

/// How strongly the timeframes agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consensus {
    /// At least 80% of timeframes agree.
    Extreme(Lean),
    /// At least half agree.
    Moderate(Lean),
    /// A plurality below half.
    Mixed(Lean),
    /// No strict plurality.
    Divergence,
}

/// Result of tallying votes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub consensus: Consensus,
    pub score: f64,
    /// Size of the largest bucket.
    pub agreeing: usize,
    pub total: usize,
}

fn signed(lean: Lean, magnitude: f64) -> f64 {
    match lean {
        Lean::Bullish => magnitude,
        Lean::Bearish => -magnitude,
        Lean::Neutral => 0.0,
    }
}

/// Tally votes into a verdict. `None` when there are no votes.
pub fn tally(votes: &[Vote]) -> Option<Verdict> {
    if votes.is_empty() {
        return None;
    }

    let count = |lean: Lean| votes.iter().filter(|v| v.reading.lean == lean).count();
    let buckets = [
        (Lean::Bullish, count(Lean::Bullish)),
        (Lean::Bearish, count(Lean::Bearish)),
        (Lean::Neutral, count(Lean::Neutral)),
    ];
    let total = votes.len();
    let agreeing = buckets.iter().map(|(_, n)| *n).max().unwrap_or(0);

    let leaders: Vec<Lean> = buckets
        .iter()
        .filter(|(_, n)| *n == agreeing)
        .map(|(lean, _)| *lean)
        .collect();

    if leaders.len() > 1 {
        // Only the tied buckets compete; neutral votes carry no strength.
        let strength = |lean: Lean| -> f64 {
            if lean == Lean::Neutral {
                return 0.0;
            }
            votes
                .iter()
                .filter(|v| v.reading.lean == lean)
                .map(|v| v.reading.strength)
                .sum()
        };
        let mut ranked: Vec<(Lean, f64)> = leaders.iter().map(|&l| (l, strength(l))).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let score = match ranked.as_slice() {
            [(lean, top), (_, next), ..] if top > next => signed(*lean, 0.1),
            _ => 0.0,
        };

        return Some(Verdict {
            consensus: Consensus::Divergence,
            score,
            agreeing,
            total,
        });
    }

    let majority = leaders[0];
    let ratio = agreeing as f64 / total as f64;

    let (consensus, score) = if ratio >= 0.8 {
        (Consensus::Extreme(majority), signed(majority, 1.0))
    } else if ratio >= 0.5 {
        (Consensus::Moderate(majority), signed(majority, 0.5))
    } else {
        let bull = buckets[0].1;
        let bear = buckets[1].1;
        let side = if majority == Lean::Neutral {
            0.0
        } else if bull > bear {
            0.25
        } else if bear > bull {
            -0.25
        } else {
            0.0
        };
        (Consensus::Mixed(majority), side)
    };

    Some(Verdict {
        consensus,
        score,
        agreeing,
        total,
    })
}

/// Timeframes voted on unless configured otherwise, finest first.
pub const DEFAULT_TIMEFRAMES: [Timeframe; 5] = [
    Timeframe::Daily,
    Timeframe::ThreeDay,
    Timeframe::Weekly,
    Timeframe::Monthly,
    Timeframe::Yearly,
];

/// Evaluates a formula on several timeframes and votes.
pub struct MultiTimeframe<F> {
    formula: F,
    timeframes: Vec<Timeframe>,
}

impl<F: TimeframeFormula> MultiTimeframe<F> {
    pub fn new(formula: F) -> Self {
        Self {
            formula,
            timeframes: DEFAULT_TIMEFRAMES.to_vec(),
        }
    }

    /// Replace the timeframes, finest first.
    pub fn with_timeframes(mut self, timeframes: Vec<Timeframe>) -> Self {
        self.timeframes = timeframes;
        self
    }

    /// Votes of every timeframe with enough history.
    pub fn votes(&self, series: &PriceSeries) -> Vec<Vote> {
        self.timeframes
            .iter()
            .filter_map(|&timeframe| {
                let resampled = series.resample(timeframe);
                match self.formula.read(resampled.prices()) {
                    Ok(reading) => Some(Vote { timeframe, reading }),
                    Err(e) => {
                        debug!("{} skips {}: {}", self.formula.id(), timeframe.label(), e);
                        None
                    }
                }
            })
            .collect()
    }

    fn status(&self, verdict: &Verdict, votes: &[Vote]) -> String {
        let mut status = match verdict.consensus {
            Consensus::Extreme(Lean::Neutral) | Consensus::Moderate(Lean::Neutral) => {
                self.formula.label(Lean::Neutral).to_string()
            }
            Consensus::Extreme(lean) => format!("strongly {}", self.formula.label(lean)),
            Consensus::Moderate(lean) => self.formula.label(lean).to_string(),
            Consensus::Mixed(lean) => format!("mixed, mostly {}", self.formula.label(lean)),
            Consensus::Divergence => "divergence".to_string(),
        };

        let _ = write!(status, " ({}/{}:", verdict.agreeing, verdict.total);
        for vote in votes {
            let _ = write!(status, " {} {:.1}", vote.timeframe.label(), vote.reading.value);
        }
        status.push(')');
        status
    }
}

impl<F: TimeframeFormula> Indicator for MultiTimeframe<F> {
    fn id(&self) -> IndicatorId {
        self.formula.id()
    }

    fn min_periods(&self) -> usize {
        self.formula.min_periods()
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        _ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let votes = self.votes(series);
        let verdict = tally(&votes)
            .ok_or_else(|| EngineError::insufficient(self.formula.min_periods(), series.len()))?;

        Ok(IndicatorResult::new(
            self.id(),
            votes[0].reading.value,
            verdict.score,
            self.status(&verdict, &votes),
        ))
    }

    fn project(
        &self,
        series: &PriceSeries,
        _ctx: &EvaluationContext<'_>,
        days: usize,
    ) -> Result<HistorySeries, EngineError> {
        self.formula.project_daily(series, days)
    }
}
