//! Common test utilities for mailvet integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use mailvet_core::{Plan, UserAccount, UserId};
use mailvet_service::{create_router, AppState, ServiceConfig};
use mailvet_store::{MemoryStore, Store};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store backing the server, for seeding and assertions.
    pub store: Arc<dyn Store>,
    /// Mock key rotator.
    pub rotator: MockServer,
    /// Mock verification provider.
    pub provider: MockServer,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh in-memory store and mock
    /// upstreams.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    /// Build a harness around an externally constructed store (e.g. a
    /// fault-injecting wrapper). `harness.store` is that same store, so
    /// seeding and assertions hit the backend the server runs on.
    pub async fn with_store(store: Arc<dyn Store>) -> Self {
        let rotator = MockServer::start().await;
        let provider = MockServer::start().await;

        let state = AppState::new(Arc::clone(&store), Self::config(&rotator, &provider));
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            rotator,
            provider,
            test_user_id: UserId::generate(),
        }
    }

    fn config(rotator: &MockServer, provider: &MockServer) -> ServiceConfig {
        ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: "/tmp/mailvet-test".into(),
            auth_secret: "test-secret".into(),
            rotator_base_url: rotator.uri(),
            provider_base_url: provider.uri(),
            outbound_timeout_seconds: 2,
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 10,
        }
    }

    /// Seed the test user with a plan and balance.
    pub fn seed_account(&self, plan: Plan, credits: i64) {
        self.store
            .put_account(&UserAccount::with_credits(self.test_user_id, plan, credits))
            .expect("seed account");
    }

    /// Current balance of the test user.
    pub fn credits(&self) -> i64 {
        self.store
            .get_account(&self.test_user_id)
            .expect("get account")
            .expect("account exists")
            .credits
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> String {
        let other_user = UserId::generate();
        format!("Bearer test-token:{other_user}")
    }

    /// Mount a rotator mock that hands out the given subscription.
    pub async fn mock_rotator_key(&self, subscription_id: &str) {
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "subscriptionId": subscription_id })),
            )
            .mount(&self.rotator)
            .await;
    }

    /// Mount a provider mock returning the given verdict body.
    pub async fn mock_provider_verdict(&self, body: serde_json::Value) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.provider)
            .await;
    }
}
