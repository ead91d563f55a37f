//! Application state.

use std::sync::Arc;
use std::time::Duration;

use mailvet_store::Store;

use crate::config::ServiceConfig;
use crate::pipeline::Verifier;
use crate::provider::MailtesterClient;
use crate::rotator::KeyRotatorClient;

/// Application state shared across handlers.
///
/// The composition root: both outbound clients are constructed exactly
/// once here and injected into the verifier, with lifecycle tied to
/// process startup rather than ambient global state.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// The verification pipeline.
    pub verifier: Arc<Verifier>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let timeout = Duration::from_secs(config.outbound_timeout_seconds);

        let rotator = KeyRotatorClient::new(config.rotator_base_url.clone(), timeout);
        let provider = MailtesterClient::new(config.provider_base_url.clone(), timeout);

        tracing::info!(
            rotator_url = %config.rotator_base_url,
            provider_url = %config.provider_base_url,
            timeout_seconds = config.outbound_timeout_seconds,
            "Outbound clients configured"
        );

        let verifier = Arc::new(Verifier::new(Arc::clone(&store), rotator, provider));

        Self {
            store,
            config,
            verifier,
        }
    }
}
