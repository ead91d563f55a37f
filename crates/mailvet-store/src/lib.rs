//! Storage layer for MailVet.
//!
//! This crate provides persistent storage for user accounts (the credit
//! ledger) and the append-only verification audit trail.
//!
//! # Backends
//!
//! - [`MemoryStore`]: the default backend, used by tests and single-node
//!   deployments.
//! - `RocksStore` (feature `rocksdb-backend`): RocksDB with column families
//!   for accounts, audit records, and a per-user recency index.
//!
//! # Atomicity
//!
//! The ledger contract requires "decrement where balance > 0" as a single
//! atomic storage operation, never a read-then-write across the trait
//! boundary. Both backends execute the conditional decrement inside one
//! exclusive critical section, so concurrent reservations against a user's
//! last credit admit exactly one winner.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;

#[cfg(feature = "rocksdb-backend")]
pub mod keys;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use mailvet_core::{AuditRecord, UserAccount, UserId};

/// Hard cap on `recent_activity` page size.
pub const MAX_ACTIVITY_LIMIT: usize = 200;

/// Outcome of a credit reservation attempt.
#[derive(Debug, Clone)]
pub struct Reservation {
    /// Whether a credit was actually decremented. Always false for
    /// unmetered plans.
    pub reserved: bool,

    /// The account as of the reservation (post-decrement when `reserved`).
    pub account: UserAccount,
}

/// The storage trait defining ledger and audit operations.
///
/// This trait abstracts the storage layer, allowing different backends
/// (RocksDB, in-memory for testing).
pub trait Store: Send + Sync {
    /// Insert or replace an account record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn put_account(&self, account: &UserAccount) -> Result<()>;

    /// Fetch an account by user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_account(&self, user_id: &UserId) -> Result<Option<UserAccount>>;

    /// Reserve one verification credit if the user's plan is metered.
    ///
    /// Unmetered plans return `reserved: false` without touching the
    /// balance. Metered plans perform an atomic decrement-if-positive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InsufficientCredits`] when a metered account
    /// has no credits left, [`StoreError::NotFound`] when the account does
    /// not exist, or a backend error.
    fn reserve_credit_if_needed(&self, user_id: &UserId) -> Result<Reservation>;

    /// Return one previously reserved credit. Callers invoke this at most
    /// once per reservation, and only on failure paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing or the backend fails.
    fn refund_credit(&self, user_id: &UserId) -> Result<i64>;

    /// Append a verification audit record. Append-only: records are never
    /// updated or deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_audit(&self, record: &AuditRecord) -> Result<()>;

    /// Fetch a user's most recent audit records, newest first.
    ///
    /// `limit` is clamped to [`MAX_ACTIVITY_LIMIT`]. The result is a plain
    /// finite page; re-querying restarts from the newest record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn recent_activity(&self, user_id: &UserId, limit: usize) -> Result<Vec<AuditRecord>>;
}
