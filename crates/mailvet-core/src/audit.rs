//! Audit trail types.
//!
//! Every verification attempt that produces a provider result is recorded
//! exactly once. Records are append-only: nothing in this subsystem updates
//! or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::Classification;
use crate::{AuditId, UserId};

/// Verification provider constant stored on every record.
pub const PROVIDER_NAME: &str = "mailtester";

/// A persisted record of one verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Record identifier.
    pub id: AuditId,

    /// The user who requested the verification.
    pub user_id: UserId,

    /// The normalized email that was verified.
    pub email: String,

    /// The email's domain.
    pub domain: String,

    /// Verification provider (always [`PROVIDER_NAME`]).
    pub provider: String,

    /// Rotator subscription id the call was made with.
    pub subscription_id: String,

    /// Plan of the rotator key (not the user's plan).
    pub key_plan: Option<String>,

    /// Provider deliverability code.
    pub code: String,

    /// Provider verdict message.
    pub message: Option<String>,

    /// Derived risk flags.
    pub classification: Classification,

    /// Credits consumed by this attempt: 1 for metered users, 0 otherwise.
    pub credits_consumed: i64,

    /// Wall-clock pipeline latency in milliseconds, measured from credit
    /// reservation to just before persistence.
    pub latency_ms: u64,

    /// Raw payloads from both external calls, for debugging. Never exposed
    /// to API callers.
    pub raw: serde_json::Value,

    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Assemble a record for a completed pipeline run.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        user_id: UserId,
        email: String,
        domain: String,
        subscription_id: String,
        key_plan: Option<String>,
        code: String,
        message: Option<String>,
        classification: Classification,
        credits_consumed: i64,
        latency_ms: u64,
        raw: serde_json::Value,
    ) -> Self {
        Self {
            id: AuditId::generate(),
            user_id,
            email,
            domain,
            provider: PROVIDER_NAME.to_string(),
            subscription_id,
            key_plan,
            code,
            message,
            classification,
            credits_consumed,
            latency_ms,
            raw,
            created_at: Utc::now(),
        }
    }
}
