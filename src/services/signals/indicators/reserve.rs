//! Exchange reserve.

use crate::error::EngineError;
use crate::services::signals::{EvaluationContext, Indicator};
use crate::types::{IndicatorId, IndicatorResult, PriceSeries};

/// Coins held on exchange wallets. No free feed publishes it, so the
/// reading is always unavailable and the result links to the chart.
#[derive(Default)]
pub struct ExchangeReserve;

impl Indicator for ExchangeReserve {
    fn id(&self) -> IndicatorId {
        IndicatorId::ExchangeReserve
    }

    fn evaluate(
        &self,
        _series: &PriceSeries,
        _ctx: &EvaluationContext<'_>,
    ) -> Result<IndicatorResult, EngineError> {
        Err(EngineError::DataUnavailable("see linked chart".to_string()))
    }
}
