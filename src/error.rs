use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::json;
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Network failure or non-2xx on the upload call. The message is shown to the user as-is.
    #[error("{0}")]
    Upload(String),
    /// Non-2xx or network failure on a status check. Ends the polling run, never retried.
    #[error("Status check failed: {0}")]
    PollTransport(String),
    /// The analysis service reported `status: "error"`.
    #[error("Analysis error: {0}")]
    Analysis(String),
    #[error("Analysis time exceeded")]
    AnalysisTimeout,
    /// A newer upload replaced this one before its session could start.
    #[error("Upload superseded by a newer upload")]
    Superseded,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(_) => StatusCode::BAD_GATEWAY,
            AppError::PollTransport(_) => StatusCode::BAD_GATEWAY,
            AppError::Analysis(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AnalysisTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Superseded => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_error_keeps_server_detail_verbatim() {
        let err = AppError::Upload("Solo se permiten archivos CSV o Excel".to_string());
        assert_eq!(err.to_string(), "Solo se permiten archivos CSV o Excel");
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let response = AppError::InvalidInput("No file provided".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn superseded_upload_is_a_conflict() {
        let err = AppError::Superseded;
        assert_eq!(err.to_string(), "Upload superseded by a newer upload");
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
