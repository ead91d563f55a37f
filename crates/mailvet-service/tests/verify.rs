//! Verification pipeline integration tests.
//!
//! Each test stands up the full router with a fresh in-memory store and
//! wiremock upstreams, then checks the response shape and the ledger state
//! after the call.

mod common;

use std::sync::Arc;

use common::TestHarness;
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use mailvet_core::{AuditRecord, Plan, UserAccount, UserId};
use mailvet_store::{MemoryStore, Reservation, Store, StoreError};

// ============================================================================
// End-to-end success paths
// ============================================================================

#[tokio::test]
async fn disposable_domain_verification_succeeds_and_charges_one_credit() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 1);
    harness.mock_rotator_key("abc123").await;
    harness
        .mock_provider_verdict(json!({
            "code": "ok",
            "message": "Valid",
            "mx": "mx.mailinator.com",
            "catch_all": false
        }))
        .await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "test@mailinator.com" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], "test@mailinator.com");
    assert_eq!(body["code"], "ok");
    assert_eq!(body["disposable"], true);
    assert_eq!(body["roleBased"], false);
    assert_eq!(body["catchAll"], false);
    assert_eq!(body["mxRecords"], true);
    assert_eq!(body["riskLevel"], "high");

    // The key and raw payloads never leak to the caller.
    assert!(body.get("subscriptionId").is_none());
    assert!(body.get("raw").is_none());

    assert_eq!(harness.credits(), 0);
}

#[tokio::test]
async fn mailbox_doubt_is_medium_risk() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 5);
    harness.mock_rotator_key("sub_1").await;
    harness
        .mock_provider_verdict(json!({
            "code": "mb",
            "message": "Cannot verify mailbox",
            "mx": "mx.normal.com"
        }))
        .await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["riskLevel"], "medium");
    assert_eq!(harness.credits(), 4);
}

#[tokio::test]
async fn email_is_normalized_before_verification() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 1);
    harness.mock_rotator_key("sub_1").await;
    harness
        .mock_provider_verdict(json!({
            "code": "ok",
            "message": "valid",
            "mx": "mx.normal.com"
        }))
        .await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "  Jane.Doe@Normal.COM " }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], "jane.doe@normal.com");
}

#[tokio::test]
async fn legacy_alias_routes_to_the_same_handler() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 1);
    harness.mock_rotator_key("sub_1").await;
    harness
        .mock_provider_verdict(json!({
            "code": "ok",
            "message": "valid",
            "mx": "mx.normal.com"
        }))
        .await;

    let response = harness
        .server
        .post("/validate")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status_ok();
    assert_eq!(harness.credits(), 0);
}

// ============================================================================
// Metering
// ============================================================================

#[tokio::test]
async fn exhausted_balance_is_forbidden_without_touching_upstreams() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 0);

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status(axum::http::StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_credits");

    // Neither upstream was contacted.
    assert!(harness.rotator.received_requests().await.unwrap().is_empty());
    assert!(harness.provider.received_requests().await.unwrap().is_empty());
    assert_eq!(harness.credits(), 0);
}

#[tokio::test]
async fn paid_plan_is_unmetered() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Ultimate, 0);
    harness.mock_rotator_key("sub_1").await;
    harness
        .mock_provider_verdict(json!({
            "code": "ok",
            "message": "valid",
            "mx": "mx.normal.com"
        }))
        .await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status_ok();
    assert_eq!(harness.credits(), 0);

    // The audit trail shows no credit was consumed.
    let page = harness
        .store
        .recent_activity(&harness.test_user_id, 10)
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].credits_consumed, 0);
}

#[tokio::test]
async fn concurrent_requests_cannot_overspend_the_last_credit() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 1);
    harness.mock_rotator_key("sub_1").await;
    harness
        .mock_provider_verdict(json!({
            "code": "ok",
            "message": "valid",
            "mx": "mx.normal.com"
        }))
        .await;

    let request = |email: &'static str| {
        harness
            .server
            .post("/v1/validation/verify-email")
            .add_header("authorization", harness.user_auth_header())
            .json(&json!({ "email": email }))
    };

    let (a, b) = tokio::join!(request("a@normal.com"), request("b@normal.com"));

    let codes = [a.status_code().as_u16(), b.status_code().as_u16()];
    assert_eq!(codes.iter().filter(|&&c| c == 200).count(), 1);
    assert_eq!(codes.iter().filter(|&&c| c == 403).count(), 1);
    assert_eq!(harness.credits(), 0);
}

// ============================================================================
// Refund completeness per failure stage
// ============================================================================

#[tokio::test]
async fn rotator_busy_signals_wait_and_refunds() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 1);
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({
                "error": "busy",
                "retryAfterMs": 1500
            })),
        )
        .mount(&harness.rotator)
        .await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status(axum::http::StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "wait");
    assert_eq!(body["retryAfterMs"], 1500);

    assert_eq!(harness.credits(), 1);
}

#[tokio::test]
async fn empty_rotator_key_is_a_gateway_error_and_refunds() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 1);
    harness.mock_rotator_key("").await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "upstream_error");
    // Distinct from the wait shape.
    assert!(body.get("status").is_none());

    assert_eq!(harness.credits(), 1);
}

#[tokio::test]
async fn rotator_outage_refunds() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 1);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&harness.rotator)
        .await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    assert_eq!(harness.credits(), 1);
}

#[tokio::test]
async fn provider_failure_refunds() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 1);
    harness.mock_rotator_key("sub_1").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&harness.provider)
        .await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    assert_eq!(harness.credits(), 1);
}

// ============================================================================
// Audit persistence failure
// ============================================================================

/// Store wrapper that delegates everything to a `MemoryStore` except audit
/// inserts, which always fail.
struct FailingAuditStore {
    inner: MemoryStore,
}

impl Store for FailingAuditStore {
    fn put_account(&self, account: &UserAccount) -> Result<(), StoreError> {
        self.inner.put_account(account)
    }

    fn get_account(&self, user_id: &UserId) -> Result<Option<UserAccount>, StoreError> {
        self.inner.get_account(user_id)
    }

    fn reserve_credit_if_needed(&self, user_id: &UserId) -> Result<Reservation, StoreError> {
        self.inner.reserve_credit_if_needed(user_id)
    }

    fn refund_credit(&self, user_id: &UserId) -> Result<i64, StoreError> {
        self.inner.refund_credit(user_id)
    }

    fn insert_audit(&self, _record: &AuditRecord) -> Result<(), StoreError> {
        Err(StoreError::Database("disk full".into()))
    }

    fn recent_activity(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        self.inner.recent_activity(user_id, limit)
    }
}

#[tokio::test]
async fn audit_persistence_failure_refunds_the_credit() {
    let store = Arc::new(FailingAuditStore {
        inner: MemoryStore::new(),
    });
    let harness = TestHarness::with_store(store).await;
    // The harness seeds and reads the injected store directly.
    harness.seed_account(Plan::Free, 1);

    harness.mock_rotator_key("sub_1").await;
    harness
        .mock_provider_verdict(json!({
            "code": "ok",
            "message": "valid",
            "mx": "mx.normal.com"
        }))
        .await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.credits(), 1);
}

// ============================================================================
// Request validation and auth
// ============================================================================

#[tokio::test]
async fn blank_email_is_rejected() {
    let harness = TestHarness::new().await;
    harness.seed_account(Plan::Free, 1);

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "email": "   " }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(harness.credits(), 1);
}

#[tokio::test]
async fn missing_auth_is_unauthorized() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/v1/validation/verify-email")
        .json(&json!({ "email": "user@normal.com" }))
        .await;

    response.assert_status_unauthorized();
}
