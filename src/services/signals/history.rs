//! Trailing history of an indicator's raw reading, with chart guide lines.

use super::{EvaluationContext, Indicator};
use crate::error::EngineError;
use crate::types::{HistorySeries, IndicatorId, PriceSeries, Threshold, Tone};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Apply a kernel at each of the last `days` observations.
///
/// The kernel receives the observation's index and date and reads whatever
/// rolling state it was built over. Observations without a full `window`, or
/// where the kernel fails, are dropped.
pub fn project_trailing<F>(
    indicator: IndicatorId,
    series: &PriceSeries,
    days: usize,
    window: usize,
    kernel: F,
) -> Result<HistorySeries, EngineError>
where
    F: Fn(usize, NaiveDate) -> Result<f64, EngineError>,
{
    let prices = series.prices();
    let dates = series.dates();

    if window == 0 || prices.len() < window {
        return Err(EngineError::insufficient(window, prices.len()));
    }

    let start = prices.len().saturating_sub(days).max(window - 1);
    let mut out_dates = Vec::with_capacity(prices.len() - start);
    let mut out_values = Vec::with_capacity(prices.len() - start);

    for i in start..prices.len() {
        match kernel(i, dates[i]) {
            Ok(value) => {
                out_dates.push(dates[i]);
                out_values.push(value);
            }
            Err(e) => debug!("{} skipped {}: {}", indicator, dates[i], e),
        }
    }

    if out_values.is_empty() {
        return Err(EngineError::ComputationDegenerate(format!(
            "no projectable point for {}",
            indicator
        )));
    }

    Ok(HistorySeries {
        indicator,
        dates: out_dates,
        values: out_values,
        thresholds: BTreeMap::new(),
    })
}

/// Project an indicator and attach its chart thresholds.
pub fn project(
    indicator: &dyn Indicator,
    series: &PriceSeries,
    ctx: &EvaluationContext<'_>,
    days: usize,
) -> Result<HistorySeries, EngineError> {
    let mut history = indicator.project(series, ctx, days)?;
    history.thresholds = thresholds(indicator.id());
    Ok(history)
}

/// Guide lines drawn on an indicator's history chart.
pub fn thresholds(id: IndicatorId) -> BTreeMap<String, Threshold> {
    let lines: &[(&str, f64, Tone, &str)] = match id {
        IndicatorId::MayerMultiple => &[
            ("deep_value", 0.6, Tone::Green, "Deep value"),
            ("value", 1.1, Tone::Green, "Below fair range"),
            ("elevated", 1.8, Tone::Yellow, "Elevated"),
            ("overheated", 2.4, Tone::Red, "Overheated"),
        ],
        IndicatorId::PiCycleTop => &[
            ("danger", 0.0, Tone::Red, "Averages crossed"),
            ("warning", 10.0, Tone::Yellow, "Approaching cross"),
            ("safe", 30.0, Tone::Green, "Safe distance"),
        ],
        IndicatorId::Ahr999 => &[
            ("buy", 0.45, Tone::Green, "Bottom-fishing line"),
            ("dca", 1.2, Tone::Yellow, "Accumulation ceiling"),
            ("sell", 5.0, Tone::Red, "Take-profit line"),
        ],
        IndicatorId::PowerLawCorridor => &[
            ("lower", -1.0, Tone::Green, "Lower band"),
            ("fair", 0.0, Tone::Yellow, "Fair value"),
            ("upper", 1.0, Tone::Red, "Upper band"),
        ],
        IndicatorId::RsiMultiTimeframe => &[
            ("oversold", 30.0, Tone::Green, "Oversold"),
            ("neutral", 50.0, Tone::Yellow, "Neutral"),
            ("overbought", 70.0, Tone::Red, "Overbought"),
        ],
        _ => &[],
    };

    lines
        .iter()
        .map(|(label, value, color, description)| {
            (label.to_string(), Threshold::new(*value, *color, description))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::rolling::PrefixSums;

    fn series(prices: Vec<f64>) -> PriceSeries {
        PriceSeries::daily(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), prices).unwrap()
    }

    #[test]
    fn test_projection_drops_points_without_window() {
        let s = series((1..=10).map(|i| i as f64).collect());
        let sums = PrefixSums::new(s.prices());
        let history = project_trailing(IndicatorId::MayerMultiple, &s, 30, 4, |i, _| {
            sums.window_mean(i, 4)
        })
        .unwrap();

        // Only indices 3..10 have a full window of four.
        assert_eq!(history.len(), 7);
        assert_eq!(history.values[0], 2.5);
        assert_eq!(history.last_value(), Some(8.5));
        assert_eq!(history.dates.last(), Some(&s.last_date()));
    }

    #[test]
    fn test_projection_limits_to_days() {
        let s = series((1..=50).map(|i| i as f64).collect());
        let sums = PrefixSums::new(s.prices());
        let history =
            project_trailing(IndicatorId::MayerMultiple, &s, 7, 3, |i, _| sums.window_mean(i, 3))
                .unwrap();
        assert_eq!(history.len(), 7);
        assert_eq!(history.values[0], 43.0);
        assert_eq!(history.last_value(), Some(49.0));
    }

    #[test]
    fn test_projection_needs_one_window() {
        let s = series(vec![1.0, 2.0]);
        let sums = PrefixSums::new(s.prices());
        let result =
            project_trailing(IndicatorId::MayerMultiple, &s, 30, 5, |i, _| sums.window_mean(i, 5));
        assert_eq!(result, Err(EngineError::insufficient(5, 2)));
    }

    #[test]
    fn test_thresholds_follow_chart_bands() {
        let t = thresholds(IndicatorId::Ahr999);
        assert_eq!(t["buy"].value, 0.45);
        assert_eq!(t["dca"].value, 1.2);
        assert_eq!(t["sell"].value, 5.0);

        let t = thresholds(IndicatorId::PiCycleTop);
        assert_eq!(t["danger"].color, Tone::Red);
        assert!(thresholds(IndicatorId::FundingRate).is_empty());
    }
}
