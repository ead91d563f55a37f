//! Verification handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mailvet_core::{AuditRecord, RiskLevel};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for the activity query.
const DEFAULT_ACTIVITY_LIMIT: usize = 50;

/// Verify-email request body. The address has been syntax-checked by the
/// frontend; the handler only rejects blank input.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    /// The email address to verify.
    pub email: String,
}

/// Verify-email response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailResponse {
    /// The normalized email that was verified.
    pub email: String,
    /// Provider deliverability code.
    pub code: String,
    /// Provider verdict message.
    #[serde(skip_serializing_if = "Option::is_none")]
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

/// Verify one email address, charging one credit for free-plan users.
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<VerifyEmailResponse>, ApiError> {
    if body.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email is required".into()));
    }

    tracing::debug!(user_id = %auth.user_id, "Processing verification request");

    let report = state.verifier.verify_email(auth.user_id, &body.email).await?;

    Ok(Json(VerifyEmailResponse {
        email: report.email,
        code: report.code,
        message: report.message,
        catch_all: report.classification.catch_all,
        disposable: report.classification.disposable,
        role_based: report.classification.role_based,
        mx_records: report.classification.mx_records,
        risk_level: report.classification.risk_level,
    }))
}

/// Activity query parameters.
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    /// Page size; defaults to 50, capped by the store at 200.
    pub limit: Option<usize>,
}

/// Activity response.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    /// Recent verification attempts, newest first.
    pub activity: Vec<ActivityEntry>,
}

/// One audit record as exposed to the user. Raw upstream payloads and the
/// subscription id stay server-side.
#[derive(Debug, Serialize)]
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
    #[serde(skip_serializing_if = "Option::is_none")]
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

impl From<AuditRecord> for ActivityEntry {
    fn from(record: AuditRecord) -> Self {
        Self {
            id: record.id.to_string(),
            email: record.email,
            domain: record.domain,
            code: record.code,
            message: record.message,
            catch_all: record.classification.catch_all,
            disposable: record.classification.disposable,
            role_based: record.classification.role_based,
            mx_records: record.classification.mx_records,
            risk_level: record.classification.risk_level,
            credits_consumed: record.credits_consumed,
            latency_ms: record.latency_ms,
            created_at: record.created_at,
        }
    }
}

/// Fetch the caller's recent verification history, newest first.
#[allow(clippy::unused_async)] // Axum handlers are async for consistency
pub async fn activity(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).max(1);

    let records = state.verifier.recent_activity(auth.user_id, limit)?;

    Ok(Json(ActivityResponse {
        activity: records.into_iter().map(ActivityEntry::from).collect(),
    }))
}
