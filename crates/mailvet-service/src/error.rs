//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use mailvet_core::VetError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Free-plan user has no credits left.
    #[error("insufficient credits: balance={credits}")]
    InsufficientCredits {
        /// Remaining balance.
        credits: i64,
    },

    /// All rotator keys are busy; the caller should retry later.
    #[error("key rotator saturated")]
    Wait {
        /// Retry hint forwarded from the rotator, when present.
        retry_after_ms: Option<u64>,
    },

    /// An upstream dependency (rotator, provider) failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

/// Wait response body: `{"status":"wait","retryAfterMs":1500}`.
#[derive(Debug, Serialize)]
struct WaitResponse {
    status: &'static str,
    #[serde(rename = "retryAfterMs", skip_serializing_if = "Option::is_none")]
    retry_after_ms: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The wait case has a body shape of its own, distinct from the
        // error envelope.
        if let Self::Wait { retry_after_ms } = self {
            let body = WaitResponse {
                status: "wait",
                retry_after_ms,
            };
            return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        }

        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::InsufficientCredits { credits } => (
                StatusCode::FORBIDDEN,
                "insufficient_credits",
                self.to_string(),
                Some(serde_json::json!({ "balance": credits })),
            ),
            Self::Wait { .. } => unreachable!("handled above"),
            Self::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream dependency failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "Verification temporarily unavailable".to_string(),
                    None,
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<VetError> for ApiError {
    fn from(err: VetError) -> Self {
        match err {
            VetError::InsufficientCredits { credits } => Self::InsufficientCredits { credits },
            VetError::KeyRotatorBusy { retry_after_ms, .. } => Self::Wait { retry_after_ms },
            VetError::KeyRotatorUnavailable { .. }
            | VetError::EmptyKeyFromRotator
            | VetError::ProviderRequestFailed { .. } => Self::Upstream(err.to_string()),
            VetError::AccountNotFound { user_id } => {
                Self::NotFound(format!("account not found: {user_id}"))
            }
            VetError::AuditPersistenceFailed(msg) | VetError::Storage(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_error_maps_to_wait_with_hint() {
        let err = ApiError::from(VetError::KeyRotatorBusy {
            retry_after_ms: Some(1500),
            details: serde_json::Value::Null,
        });
        assert!(matches!(
            err,
            ApiError::Wait {
                retry_after_ms: Some(1500)
            }
        ));
    }

    #[test]
    fn empty_key_is_an_upstream_error_not_wait() {
        let err = ApiError::from(VetError::EmptyKeyFromRotator);
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
