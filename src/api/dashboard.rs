//! Dashboard and indicator history endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use tidewatch::config::clamp_history_days;
use tidewatch::error::Result;
use tidewatch::types::{DashboardResult, HistorySeries, IndicatorId};

/// API response wrapper.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Serialize)]
pub struct ApiMeta {
    pub asset: String,
}

impl<T> ApiResponse<T> {
    fn new(data: T, asset: &str) -> Self {
        Self {
            success: true,
            data,
            meta: ApiMeta {
                asset: asset.to_string(),
            },
        }
    }
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Trailing days, clamped to the accepted window.
    pub days: Option<usize>,
}

/// Create the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/history/:indicator", get(get_history))
}

/// Current dashboard for the configured asset.
async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardResult>>> {
    let dashboard = state.dashboard.dashboard().await?;
    Ok(Json(ApiResponse::new(dashboard, state.dashboard.asset())))
}

/// Trailing history of one indicator.
async fn get_history(
    State(state): State<AppState>,
    Path(indicator): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistorySeries>>> {
    let id: IndicatorId = indicator.parse()?;
    let days = clamp_history_days(query.days);

    let history = state.dashboard.history(id, days).await?;
    Ok(Json(ApiResponse::new(history, state.dashboard.asset())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch::config::Config;
    use tidewatch::error::AppError;
    use tidewatch::EngineError;

    fn state() -> AppState {
        AppState::new(Config::default())
    }

    #[tokio::test]
    async fn test_dashboard_handler_serves_synthetic_fallback() {
        let Json(response) = get_dashboard(State(state())).await.unwrap();

        assert!(response.success);
        assert_eq!(response.meta.asset, "BTC");
        assert_eq!(response.data.source, "synthetic");
        assert_eq!(response.data.indicators.len(), IndicatorId::ALL.len());
        assert!(!response.data.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_history_days_are_clamped() {
        let Json(response) = get_history(
            State(state()),
            Path("mayer_multiple".to_string()),
            Query(HistoryQuery { days: Some(1000) }),
        )
        .await
        .unwrap();

        assert_eq!(response.data.indicator, IndicatorId::MayerMultiple);
        assert_eq!(response.data.len(), 90);
        assert!(!response.data.thresholds.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_indicator_is_rejected() {
        let result = get_history(
            State(state()),
            Path("moon_phase".to_string()),
            Query(HistoryQuery { days: None }),
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::Engine(EngineError::UnknownIndicator(_)))
        ));
    }

    #[test]
    fn test_api_response_serialization() {
        let json = serde_json::to_value(ApiResponse::new(1.5, "BTC")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 1.5);
        assert_eq!(json["meta"]["asset"], "BTC");
    }
}
