//! Verification provider client.
//!
//! Thin HTTP client for the Mailtester mailbox-verification API. The
//! provider is queried with the email and an acquired rotator key; its
//! verdict comes back as a loose JSON payload parsed into
//! [`ProviderResult`].

use std::time::Duration;

use reqwest::Client;

use mailvet_core::{ProviderResult, VetError};

/// HTTP client for the Mailtester verification API.
#[derive(Debug, Clone)]
pub struct MailtesterClient {
    client: Client,
    base_url: String,
}

impl MailtesterClient {
    /// Create a new provider client with a bounded request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Verify one email address with the given key.
    ///
    /// A 2xx response with an unparseable body is not an error: it becomes
    /// a [`ProviderResult`] wrapping the raw text, so malformed-but-200
    /// responses stay observable in the audit trail.
    ///
    /// # Errors
    ///
    /// Returns [`VetError::ProviderRequestFailed`] on non-2xx responses
    /// and transport failures.
    pub async fn verify(&self, email: &str, api_key: &str) -> Result<ProviderResult, VetError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("email", email), ("key", api_key)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let details: serde_json::Value =
                serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "raw": text }));
            return Err(VetError::ProviderRequestFailed {
                status: Some(status.as_u16()),
                details,
            });
        }

        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => {
                let mut result: ProviderResult = serde_json::from_value(value.clone())
                    .unwrap_or_else(|_| ProviderResult::from_unparseable(&text));
                result.raw = value;
                Ok(result)
            }
            Err(_) => Ok(ProviderResult::from_unparseable(&text)),
        }
    }
}

fn transport_error(err: reqwest::Error) -> VetError {
    VetError::ProviderRequestFailed {
        status: None,
        details: serde_json::json!({ "error": err.to_string() }),
    }
}
