//! Error types for the verification pipeline.
//!
//! One tagged variant per failure class (see the taxonomy below) so callers
//! branch on the variant instead of inspecting bolted-on fields. Every
//! variant that can occur after a successful credit reservation is routed
//! through the pipeline's single refund funnel before it reaches the HTTP
//! layer.

/// Result type for verification operations.
pub type Result<T> = std::result::Result<T, VetError>;

/// Errors that can occur during a verification attempt.
#[derive(Debug, thiserror::Error)]
pub enum VetError {
    /// Free-plan user has no credits left. Nothing was reserved.
    #[error("insufficient credits: balance={credits}")]
    InsufficientCredits {
        /// Balance at the time of the failed reservation.
        credits: i64,
    },

    /// All rotator keys are rate-limited; the caller should retry later.
    #[error("key rotator busy, retry in {retry_after_ms:?} ms")]
    KeyRotatorBusy {
        /// Retry hint from the rotator, when present and finite.
        retry_after_ms: Option<u64>,
        /// Upstream response body.
        details: serde_json::Value,
    },

    /// The rotator failed in a way that is not a busy signal.
    #[error("key rotator unavailable: upstream status {status}")]
    KeyRotatorUnavailable {
        /// Upstream HTTP status (502 for transport-level failures).
        status: u16,
        /// Upstream response body, parsed or raw.
        details: serde_json::Value,
    },

    /// The rotator answered 2xx but the key or subscription id was empty
    /// after stripping wrapping braces. A data-integrity fault upstream,
    /// distinct from the busy condition.
    #[error("key rotator returned an empty key")]
    EmptyKeyFromRotator,

    /// The verification provider request failed.
    #[error("provider request failed: upstream status {status:?}")]
    ProviderRequestFailed {
        /// Upstream HTTP status, if a response was received.
        status: Option<u16>,
        /// Upstream response body, parsed or raw.
        details: serde_json::Value,
    },

    /// The audit record could not be persisted after a successful provider
    /// call.
    #[error("audit persistence failed: {0}")]
    AuditPersistenceFailed(String),

    /// No account exists for the user.
    #[error("account not found: {user_id}")]
    AccountNotFound {
        /// The user ID that was not found.
        user_id: String,
    },

    /// Storage error outside the audit path.
    #[error("storage error: {0}")]
    Storage(String),
}

impl VetError {
    /// Whether this failure class refunds a reserved credit.
    ///
    /// `InsufficientCredits` is the only pipeline failure that cannot have
    /// a reservation behind it.
    #[must_use]
    pub const fn refunds_reservation(&self) -> bool {
        !matches!(self, Self::InsufficientCredits { .. })
    }
}
