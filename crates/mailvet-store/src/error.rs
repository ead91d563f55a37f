//! Error types for MailVet storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// Metered account has no credits left.
    #[error("insufficient credits: balance={credits}")]
    InsufficientCredits {
        /// Balance at the time of the failed reservation.
        credits: i64,
    },
}
