use analytics::{AnalyticsError, ErrorKind};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("Malformed request body: {0}")]
    Payload(#[from] JsonRejection),
}

impl AppError {
    /// Client mistakes are 4xx, broken upstream data and server faults are 5xx.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Analytics(err) => match err.kind() {
                ErrorKind::InvalidInput | ErrorKind::InvalidHorizon => StatusCode::BAD_REQUEST,
                ErrorKind::InsufficientData => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::InvariantViolation | ErrorKind::Configuration => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Payload(rejection) => rejection.status(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Analytics(err) => err.kind().as_str(),
            AppError::Payload(_) => "invalid_payload",
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        let error_message = match &self {
            AppError::Analytics(AnalyticsError::InvariantViolation(_)) => {
                tracing::error!(error = %self, "Underlying data violates an invariant.");
                self.to_string()
            }
            AppError::Analytics(AnalyticsError::Configuration(config_err)) => {
                tracing::error!(error = ?config_err, "Configuration error.");
                "A server configuration error occurred".to_string()
            }
            _ => {
                tracing::warn!(error = %self, %status, "Request rejected.");
                self.to_string()
            }
        };

        let body = Json(json!({ "error": error_message, "kind": kind }));
        (status, body).into_response()
    }
}
