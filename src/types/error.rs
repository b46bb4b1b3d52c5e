//! Error types for the edge functions
//!
//! Every handler converts failures into an [`ApiError`] at the top level.
//! The variant decides the HTTP status and the reduced body the client sees;
//! the full detail only goes to the server log.

use hyper::StatusCode;
use serde_json::json;

/// Main error type for edge function requests
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid bearer credential
    #[error("Unauthorized: {0}")]
    Unauthenticated(String),

    /// Action name outside the known set
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Request body or a required field failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The data store rejected the insert
    #[error("Store error: {0}")]
    Store(String),

    /// A required credential or endpoint is not configured
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The speech provider answered with a non-success status
    #[error("Provider error {status}: {message}")]
    Provider { status: u16, message: String },

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidAction(_) => StatusCode::BAD_REQUEST,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable kind, used in logs and usage events
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::InvalidAction(_) => "invalid_action",
            Self::InvalidInput(_) => "invalid_input",
            Self::Store(_) => "store_error",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Provider { .. } => "provider_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Client-facing JSON body
    ///
    /// Credentials and provider response bodies never leave the server.
    pub fn to_body(&self) -> serde_json::Value {
        match self {
            Self::Unauthenticated(_) => json!({ "error": "Unauthorized" }),
            Self::InvalidAction(action) => json!({ "error": format!("Invalid action: {}", action) }),
            Self::InvalidInput(msg)
            | Self::Store(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => json!({ "error": msg }),
            Self::Provider { status, .. } => json!({
                "error": "Speech provider error",
                "status": status,
            }),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("Invalid JSON: {}", err))
    }
}

/// Result type alias for edge function operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthenticated("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidAction("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Store("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_provider_status_passes_through() {
        let err = ApiError::Provider {
            status: 429,
            message: "quota exceeded".into(),
        };
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);

        let body = err.to_body();
        assert_eq!(body["status"], 429);
        assert!(body.to_string().find("quota").is_none());
    }

    #[test]
    fn test_unauthenticated_body_hides_detail() {
        let body = ApiError::Unauthenticated("JWT error: ExpiredSignature".into()).to_body();
        assert_eq!(body["error"], "Unauthorized");
    }

    #[test]
    fn test_store_body_carries_message() {
        let body = ApiError::Store("null value in column \"title\"".into()).to_body();
        assert_eq!(body["error"], "null value in column \"title\"");
    }
}
