//! Request and response types for the mailvet client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mailvet_core::RiskLevel;

/// Verify-email request body.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailRequest {
    /// The email address to verify.
    pub email: String,
}

/// Verdict returned by a successful verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailResponse {
    /// The normalized email that was verified.
    pub email: String,
    /// Provider deliverability code.
    pub code: String,
    /// Provider verdict message.
    #[serde(default)]
    pub message: Option<String>,
    /// Domain accepts mail for any local part.
    pub catch_all: bool,
    /// Domain is a known disposable provider.
    pub disposable: bool,
    /// Local part is a generic role prefix.
    pub role_based: bool,
    /// Domain has usable MX records.
    pub mx_records: bool,
    /// Overall risk level.
    pub risk_level: RiskLevel,
}

/// Recent-activity response.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityResponse {
    /// Recent verification attempts, newest first.
    pub activity: Vec<ActivityEntry>,
}

/// One historical verification attempt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Record identifier.
    pub id: String,
    /// The verified email.
    pub email: String,
    /// The email's domain.
    pub domain: String,
    /// Provider deliverability code.
    pub code: String,
    /// Provider verdict message.
    #[serde(default)]
    pub message: Option<String>,
    /// Domain accepts mail for any local part.
    pub catch_all: bool,
    /// Domain is a known disposable provider.
    pub disposable: bool,
    /// Local part is a generic role prefix.
    pub role_based: bool,
    /// Domain has usable MX records.
    pub mx_records: bool,
    /// Overall risk level.
    pub risk_level: RiskLevel,
    /// Credits consumed by the attempt.
    pub credits_consumed: i64,
    /// Pipeline latency in milliseconds.
    pub latency_ms: u64,
    /// When the verification ran.
    pub created_at: DateTime<Utc>,
}

/// Body of a 429 response: `{"status":"wait","retryAfterMs":1500}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WaitResponse {
    /// Always `"wait"`.
    pub status: String,
    /// Retry hint in milliseconds.
    #[serde(rename = "retryAfterMs", default)]
    pub retry_after_ms: Option<u64>,
}

/// API error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Additional details.
    pub details: Option<serde_json::Value>,
}
