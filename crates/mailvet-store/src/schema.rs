//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User account records (the credit ledger), keyed by `user_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Audit records, keyed by `audit_id`.
    pub const AUDITS: &str = "audits";

    /// Index: audits by user, keyed by
    /// `user_id || reversed-millis || audit_id`. Value is empty (index
    /// only); the reversed timestamp makes a forward scan yield newest
    /// records first.
    pub const AUDITS_BY_USER: &str = "audits_by_user";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::ACCOUNTS, cf::AUDITS, cf::AUDITS_BY_USER]
}
