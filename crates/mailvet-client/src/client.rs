//! MailVet HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    ActivityResponse, ApiErrorResponse, VerifyEmailRequest, VerifyEmailResponse, WaitResponse,
};

/// MailVet API client.
///
/// Provides methods for verifying email addresses and reading verification
/// history on behalf of an authenticated user.
#[derive(Debug, Clone)]
pub struct MailVetClient {
    client: Client,
    base_url: String,
}

impl MailVetClient {
    /// Create a new mailvet client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the mailvet service (e.g., `"http://mailvet:8080"`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new mailvet client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with default settings).
    #[must_use]
    pub fn with_options(base_url: impl Into<String>, options: ClientOptions) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Verify one email address as the given user.
    ///
    /// Charges one credit on metered plans; a failed verification is not
    /// charged.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn verify_email(
        &self,
        user_jwt: &str,
        email: impl Into<String>,
    ) -> Result<VerifyEmailResponse, ClientError> {
        let url = format!("{}/v1/validation/verify-email", self.base_url);
        let request = VerifyEmailRequest {
            email: email.into(),
        };

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Fetch the user's recent verification history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn recent_activity(
        &self,
        user_jwt: &str,
        limit: Option<usize>,
    ) -> Result<ActivityResponse, ClientError> {
        let url = format!("{}/v1/validation/activity", self.base_url);

        let mut builder = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"));
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }

        let response = builder.send().await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // 429 carries a wait body instead of the error envelope.
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .json::<WaitResponse>()
                .await
                .ok()
                .and_then(|wait| wait.retry_after_ms);
            return Err(ClientError::Busy { retry_after_ms });
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;

                // Map specific error codes to typed errors
                match code {
                    "insufficient_credits" => {
                        let credits = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("balance"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);

                        Err(ClientError::InsufficientCredits { credits })
                    }
                    "not_found" if message.contains("account") => {
                        Err(ClientError::AccountNotFound {
                            user_id: message.replace("account not found: ", ""),
                        })
                    }
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}
