//! Client error types.

/// Errors that can occur when using the mailvet client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The account has no credits left.
    #[error("insufficient credits: balance={credits}")]
    InsufficientCredits {
        /// Remaining balance.
        credits: i64,
    },

    /// The service is saturated; retry after the hinted delay.
    #[error("service busy, retry after {retry_after_ms:?} ms")]
    Busy {
        /// Retry hint in milliseconds, when the server provided one.
        retry_after_ms: Option<u64>,
    },

    /// Account not found.
    #[error("account not found: {user_id}")]
    AccountNotFound {
        /// The user ID.
        user_id: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
