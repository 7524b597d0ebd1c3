//! HTTP mapping for application errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orderdesk_core::errors::{ApplicationError, DomainError, InterfaceError};
use orderdesk_db::RepositoryError;
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

/// Error returned by handlers; renders as the HTTP response for its kind.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self(error.into_interface(Uuid::new_v4().to_string()))
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        ApplicationError::from(error).into()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::from(error).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let correlation_id = self.0.correlation_id();
        match &self.0 {
            InterfaceError::Conflict { message, .. } => {
                warn!(
                    event_name = "http.request.conflict",
                    correlation_id = %correlation_id,
                    detail = %message,
                    "request rejected with conflict"
                );
                (status, Json(json!({ "error": self.0.user_message() }))).into_response()
            }
            InterfaceError::NotFound { message, .. } => {
                warn!(
                    event_name = "http.request.not_found",
                    correlation_id = %correlation_id,
                    detail = %message,
                    "requested resource was not found"
                );
                status.into_response()
            }
            InterfaceError::Internal { message, .. } => {
                error!(
                    event_name = "http.request.failed",
                    correlation_id = %correlation_id,
                    detail = %message,
                    "request failed"
                );
                let body = json!({
                    "error": self.0.user_message(),
                    "correlation_id": correlation_id,
                });
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use orderdesk_core::errors::DomainError;
    use orderdesk_db::RepositoryError;
    use serde_json::Value;

    use super::ApiError;

    #[tokio::test]
    async fn duplicate_email_renders_fixed_conflict_body() {
        let response = ApiError::from(DomainError::DuplicateEmail {
            email: "ada@example.com".to_string(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            body,
            serde_json::json!({ "error": "Customer with this email already exists" })
        );
    }

    #[tokio::test]
    async fn not_found_has_empty_body() {
        let response =
            ApiError::from(DomainError::CustomerNotFound("c-1".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert!(bytes.is_empty());
    }

    #[test]
    fn untranslated_duplicate_key_is_an_internal_error() {
        let error = ApiError::from(RepositoryError::DuplicateKey("customer.email".to_string()));

        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn internal_error_body_echoes_the_logged_correlation_id() {
        let error = ApiError::from(RepositoryError::Decode("amount".to_string()));
        let expected = error.0.correlation_id().to_string();

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["correlation_id"], expected.as_str());
        assert_eq!(body["error"], "An unexpected internal error occurred.");
        assert!(uuid::Uuid::parse_str(&expected).is_ok());
    }
}
