//! Power-law corridor position.

use crate::config::ModelConstants;
use crate::error::EngineError;
use crate::services::signals::history::project_trailing;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{HistorySeries, IndicatorId, IndicatorResult, PriceSeries};
use chrono::NaiveDate;

/// Corridor around the long-run power-law fair value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    pub lower: f64,
    pub fair: f64,
    pub upper: f64,
}

impl Corridor {
    pub fn at(constants: &ModelConstants, date: NaiveDate) -> Result<Self, EngineError> {
        let days = constants.days_since_origin(date);
        if days <= 0.0 {
            return Err(EngineError::ComputationDegenerate(format!(
                "{} is not after the model origin",
                date
            )));
        }

        let params = constants.power_law;
        let log_fair = params.b * days.log10() + params.a;
        let corridor = Self {
            lower: 10f64.powf(log_fair - constants.band_offset),
            fair: 10f64.powf(log_fair),
            upper: 10f64.powf(log_fair + constants.band_offset),
        };

        if !(corridor.lower > 0.0 && corridor.upper.is_finite() && corridor.lower < corridor.upper)
        {
            return Err(EngineError::ComputationDegenerate(
                "collapsed power-law corridor".to_string(),
            ));
        }
        Ok(corridor)
    }

    /// -1 at the lower band, 0 at fair value, +1 at the upper band; linear
    /// in price within each half and unbounded outside the bands.
    pub fn position(&self, price: f64) -> f64 {
        if price < self.fair {
            (price - self.lower) / (self.fair - self.lower) - 1.0
        } else {
            (price - self.fair) / (self.upper - self.fair)
        }
    }
}

/// Where the latest price sits inside the power-law corridor.
#[derive(Default)]
pub struct PowerLawCorridor;

impl Indicator for PowerLawCorridor {
    fn id(&self) -> IndicatorId {
        IndicatorId::PowerLawCorridor
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        let price = series.last_price();
        let corridor = Corridor::at(ctx.constants, series.last_date())?;
        let position = corridor.position(price);

        let (score, status) = if price < corridor.lower {
            (1.0, format!("below lower band ({:.0} < {:.0})", price, corridor.lower))
        } else if price > corridor.upper {
            (-1.0, format!("above upper band ({:.0} > {:.0})", price, corridor.upper))
        } else {
            (0.0, format!("inside corridor (fair {:.0})", corridor.fair))
        };

        Ok(IndicatorResult::new(self.id(), position, score, status))
    }

    fn project(
        &self,
        series: &PriceSeries,
        ctx: &EvaluationContext<'_>,
        days: usize,
    ) -> Result<HistorySeries, EngineError> {
        let constants = ctx.constants;
        let prices = series.prices();
        project_trailing(self.id(), series, days, 1, |i, date| {
            Ok(Corridor::at(constants, date)?.position(prices[i]))
        })
    }
}
