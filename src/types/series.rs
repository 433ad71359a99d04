//! Immutable, date-ordered price series and calendar resampling.

use crate::error::EngineError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Price history for one asset.
///
/// Dates are strictly increasing and every price is finite and positive.
/// The only way to obtain a series is through a validating constructor, and
/// every derived series (resampled, spot-adjusted) is a fresh copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from dated observations.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, EngineError> {
        let (dates, prices) = points.into_iter().map(|p| (p.date, p.price)).unzip();
        Self::from_parts(dates, prices)
    }

    /// Build a series from parallel date and price vectors.
    pub fn from_parts(dates: Vec<NaiveDate>, prices: Vec<f64>) -> Result<Self, EngineError> {
        if dates.len() != prices.len() {
            return Err(EngineError::InvalidSeries(format!(
                "{} dates but {} prices",
                dates.len(),
                prices.len()
            )));
        }
        if dates.is_empty() {
            return Err(EngineError::InvalidSeries("empty series".to_string()));
        }

        for (i, price) in prices.iter().enumerate() {
            if !price.is_finite() || *price <= 0.0 {
                return Err(EngineError::InvalidSeries(format!(
                    "non-positive price {} on {}",
                    price, dates[i]
                )));
            }
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(EngineError::InvalidSeries(format!(
                    "date {} does not follow {}",
                    pair[1], pair[0]
                )));
            }
        }

        Ok(Self { dates, prices })
    }

    /// Consecutive daily observations starting at `start`.
    pub fn daily(start: NaiveDate, prices: Vec<f64>) -> Result<Self, EngineError> {
        let dates = (0..prices.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Self::from_parts(dates, prices)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn last_price(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    /// Iterate over the observations in date order.
    pub fn points(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.dates
            .iter()
            .zip(&self.prices)
            .map(|(&date, &price)| PricePoint { date, price })
    }

    /// Copy of this series with the latest price replaced by a live quote.
    pub fn with_latest_price(&self, price: f64) -> Result<Self, EngineError> {
        let mut prices = self.prices.clone();
        let last = prices.len() - 1;
        prices[last] = price;
        Self::from_parts(self.dates.clone(), prices)
    }

    /// Resample into calendar buckets, keeping the last observation of each.
    ///
    /// The in-progress bucket at the end of the series is included.
    pub fn resample(&self, timeframe: Timeframe) -> Self {
        if timeframe == Timeframe::Daily {
            return self.clone();
        }

        let mut dates: Vec<NaiveDate> = Vec::new();
        let mut prices: Vec<f64> = Vec::new();
        let mut current_key: Option<i64> = None;

        for (&date, &price) in self.dates.iter().zip(&self.prices) {
            let key = timeframe.bucket_key(date);
            if current_key == Some(key) {
                let last = dates.len() - 1;
                dates[last] = date;
                prices[last] = price;
            } else {
                dates.push(date);
                prices.push(price);
                current_key = Some(key);
            }
        }

        // Bucket closes inherit the ordering and positivity of the source.
        Self { dates, prices }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = EngineError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points().collect()
    }
}

/// Resampling granularity for multi-timeframe evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "3d")]
    ThreeDay,
    #[serde(rename = "1w")]
    Weekly,
    #[serde(rename = "1M")]
    Monthly,
    #[serde(rename = "1Q")]
    Quarterly,
    #[serde(rename = "1y")]
    Yearly,
}

impl Timeframe {
    /// Short label for this timeframe.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Daily => "1d",
            Timeframe::ThreeDay => "3d",
            Timeframe::Weekly => "1w",
            Timeframe::Monthly => "1M",
            Timeframe::Quarterly => "1Q",
            Timeframe::Yearly => "1y",
        }
    }

    /// Identifier of the calendar bucket a date falls into.
    fn bucket_key(&self, date: NaiveDate) -> i64 {
        match self {
            Timeframe::Daily => date.num_days_from_ce() as i64,
            Timeframe::ThreeDay => (date.num_days_from_ce() as i64).div_euclid(3),
            Timeframe::Weekly => {
                let week = date.iso_week();
                week.year() as i64 * 100 + week.week() as i64
            }
            Timeframe::Monthly => date.year() as i64 * 12 + date.month0() as i64,
            Timeframe::Quarterly => date.year() as i64 * 4 + (date.month0() / 3) as i64,
            Timeframe::Yearly => date.year() as i64,
        }
    }
}
