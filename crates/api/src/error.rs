//! JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rentledger_core::LedgerError;
use serde_json::json;
use tracing::{debug, error};

/// A failed request, rendered as `{"error": code, "message": text}`.
#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl ApiError {
    /// Shorthand for an `invalid_payload` error.
    pub fn invalid_payload(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self(LedgerError::invalid_payload(field, reason))
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_payload("body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_payload("path", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_payload("query", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if let LedgerError::Internal(detail) = &self.0 {
            error!(error = %detail, "Request failed");
            "An internal error occurred".to_string()
        } else {
            debug!(error = %self.0, status = status.as_u16(), "Request rejected");
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rentledger_shared::types::Cents;
    use rstest::rstest;

    #[rstest]
    #[case(LedgerError::not_found("invoice", 4_i64), 404, "not_found")]
    #[case(LedgerError::invalid_payload("lines", "empty"), 400, "invalid_payload")]
    #[case(
        LedgerError::Unbalanced { debit: Cents::new(100), credit: Cents::new(99) },
        400,
        "unbalanced"
    )]
    #[case(LedgerError::Cancelled, 499, "cancelled")]
    #[case(LedgerError::DeadlineExceeded, 504, "deadline_exceeded")]
    #[tokio::test]
    async fn test_error_response_shape(
        #[case] err: LedgerError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        let response = ApiError(err).into_response();
        assert_eq!(response.status().as_u16(), status);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], code);
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response =
            ApiError(LedgerError::Internal("connection reset by peer".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("connection reset"));
    }
}
