use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy of the indicator engine and its fetch boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("insufficient data: need {required} periods, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("computation degenerate: {0}")]
    ComputationDegenerate(String),

    #[error("all sources exhausted: {}", .0.join("; "))]
    AllSourcesExhausted(Vec<String>),

    #[error("invalid series: {0}")]
    InvalidSeries(String),

    #[error("no history projection for {0}")]
    HistoryUnsupported(String),

    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),
}

impl EngineError {
    /// Shorthand for a window check failure.
    pub fn insufficient(required: usize, available: usize) -> Self {
        EngineError::InsufficientHistory {
            required,
            available,
        }
    }

    /// Status text shown on an indicator that could not be computed.
    pub fn status_text(&self) -> String {
        match self {
            EngineError::InsufficientHistory { .. } => "insufficient data".to_string(),
            EngineError::DataUnavailable(reason) => format!("unavailable ({})", reason),
            other => other.to_string(),
        }
    }
}

/// Error returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Engine(e) => match e {
                EngineError::UnknownIndicator(_) | EngineError::HistoryUnsupported(_) => {
                    StatusCode::NOT_FOUND
                }
                EngineError::DataUnavailable(_) | EngineError::AllSourcesExhausted(_) => {
                    StatusCode::BAD_GATEWAY
                }
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_status_text() {
        let err = EngineError::insufficient(200, 12);
        assert_eq!(err.status_text(), "insufficient data");
        assert_eq!(
            err.to_string(),
            "insufficient data: need 200 periods, have 12"
        );
    }

    #[test]
    fn test_exhausted_lists_every_reason() {
        let err = EngineError::AllSourcesExhausted(vec![
            "file: missing".to_string(),
            "mirror: empty".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "all sources exhausted: file: missing; mirror: empty"
        );
    }

    #[test]
    fn test_unknown_indicator_maps_to_not_found() {
        let response = AppError::from(EngineError::UnknownIndicator("nope".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_engine_failures_map_to_status_codes() {
        let cases = [
            (
                EngineError::DataUnavailable("feed down".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                EngineError::AllSourcesExhausted(vec!["file: missing".into()]),
                StatusCode::BAD_GATEWAY,
            ),
            (
                EngineError::HistoryUnsupported("funding_rate".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::insufficient(350, 20),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body_carries_message_and_status() {
        let response =
            AppError::from(EngineError::DataUnavailable("feed down".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], 502);
        assert_eq!(body["error"], "data unavailable: feed down");
    }
}
