//! The verification pipeline.
//!
//! [`Verifier`] sequences one verification attempt:
//!
//! ```text
//! Start -> CreditReserved -> KeyAcquired -> ProviderCalled
//!       -> Classified -> Persisted
//! ```
//!
//! Invariant: a credit is consumed if and only if the run reaches
//! persistence for a metered user. Every failure after the reservation
//! exits through one refund funnel, so the ledger refunds exactly the
//! credit that was reserved, exactly once. This includes audit-persistence
//! failures: a verification the user cannot see in their history is not
//! charged.

use std::sync::Arc;
use std::time::Instant;

use mailvet_core::{classify, email, AuditRecord, Classification, UserId, VetError};
use mailvet_store::{Store, StoreError};

use crate::provider::MailtesterClient;
use crate::rotator::{KeyReservation, KeyRotatorClient};

/// Caller-visible result of one verification.
///
/// Never carries raw upstream payloads, the acquired key, or the
/// subscription id.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    /// The normalized email that was verified.
    pub email: String,

    /// Provider deliverability code.
    pub code: String,

    /// Provider verdict message.
    pub message: Option<String>,

    /// Derived risk flags.
    pub classification: Classification,
}

/// The verification orchestrator.
///
/// Holds its collaborators by explicit injection; constructed once at
/// startup by [`crate::AppState`].
pub struct Verifier {
    store: Arc<dyn Store>,
    rotator: KeyRotatorClient,
    provider: MailtesterClient,
}

impl Verifier {
    /// Create a verifier from its collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, rotator: KeyRotatorClient, provider: MailtesterClient) -> Self {
        Self {
            store,
            rotator,
            provider,
        }
    }

    /// Verify one email address for a user, charging one credit for
    /// metered plans.
    ///
    /// # Errors
    ///
    /// Propagates the failure taxonomy in [`VetError`]; any failure after
    /// a successful reservation has already refunded the credit by the
    /// time it reaches the caller.
    pub async fn verify_email(
        &self,
        user_id: UserId,
        email: &str,
    ) -> Result<VerifyReport, VetError> {
        let address = email::normalize(email);
        let (_, domain) = email::split_parts(&address);
        let domain = domain.to_string();

        let started = Instant::now();

        let reservation = self
            .store
            .reserve_credit_if_needed(&user_id)
            .map_err(|e| reserve_error(e, user_id))?;
        let reserved = reservation.reserved;

        tracing::debug!(
            user_id = %user_id,
            email = %address,
            reserved,
            "Credit reservation complete"
        );

        match self
            .charge_through(user_id, &address, &domain, reserved, started)
            .await
        {
            Ok(report) => Ok(report),
            Err(err) => {
                if reserved {
                    match self.store.refund_credit(&user_id) {
                        Ok(balance) => {
                            tracing::info!(user_id = %user_id, balance, "Refunded reserved credit");
                        }
                        Err(refund_err) => {
                            // The original failure still wins; the stuck
                            // credit is recoverable from logs.
                            tracing::error!(
                                user_id = %user_id,
                                error = %refund_err,
                                "Failed to refund reserved credit"
                            );
                        }
                    }
                }
                Err(err)
            }
        }
    }

    /// Steps 2-5: everything that must refund on failure.
    async fn charge_through(
        &self,
        user_id: UserId,
        address: &str,
        domain: &str,
        reserved: bool,
        started: Instant,
    ) -> Result<VerifyReport, VetError> {
        let key = self.rotator.acquire().await?;
        let result = self.provider.verify(address, &key.api_key).await?;

        let classification = classify(address, domain, &result);

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = started.elapsed().as_millis() as u64;

        let record = build_record(
            user_id,
            address,
            domain,
            &key,
            &result.code,
            result.message.clone(),
            classification,
            reserved,
            latency_ms,
            serde_json::json!({ "rotator": key.raw.clone(), "provider": result.raw }),
        );

        self.store
            .insert_audit(&record)
            .map_err(|e| VetError::AuditPersistenceFailed(e.to_string()))?;

        tracing::info!(
            user_id = %user_id,
            email = %address,
            code = %result.code,
            risk = ?classification.risk_level,
            credits_consumed = record.credits_consumed,
            latency_ms,
            "Verification complete"
        );

        Ok(VerifyReport {
            email: address.to_string(),
            code: result.code,
            message: result.message,
            classification,
        })
    }

    /// Read a user's recent verification history, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn recent_activity(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<AuditRecord>, VetError> {
        self.store
            .recent_activity(&user_id, limit)
            .map_err(|e| VetError::Storage(e.to_string()))
    }
}

fn reserve_error(err: StoreError, user_id: UserId) -> VetError {
    match err {
        StoreError::InsufficientCredits { credits } => VetError::InsufficientCredits { credits },
        StoreError::NotFound => VetError::AccountNotFound {
            user_id: user_id.to_string(),
        },
        other => VetError::Storage(other.to_string()),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_record(
    user_id: UserId,
    address: &str,
    domain: &str,
    key: &KeyReservation,
    code: &str,
    message: Option<String>,
    classification: Classification,
    reserved: bool,
    latency_ms: u64,
    raw: serde_json::Value,
) -> AuditRecord {
    AuditRecord::new(
        user_id,
        address.to_string(),
        domain.to_string(),
        key.subscription_id.clone(),
        key.plan.clone(),
        code.to_string(),
        message,
        classification,
        i64::from(reserved),
        latency_ms,
        raw,
    )
}
