//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families.

use chrono::{DateTime, Utc};
use mailvet_core::{AuditId, UserId};

/// Create an account key from a user ID.
#[must_use]
pub fn account_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create an audit key from an audit ID.
#[must_use]
pub fn audit_key(audit_id: &AuditId) -> Vec<u8> {
    audit_id.as_bytes().to_vec()
}

/// Create a user-audit index key.
///
/// Format: `user_id (16 bytes) || reversed millis (8 bytes, big-endian) ||
/// audit_id (16 bytes)`
///
/// The timestamp is stored as `u64::MAX - millis`, so a forward iteration
/// over a user's prefix visits records newest first.
#[must_use]
pub fn user_audit_key(user_id: &UserId, created_at: DateTime<Utc>, audit_id: &AuditId) -> Vec<u8> {
    #[allow(clippy::cast_sign_loss)]
    let millis = created_at.timestamp_millis().max(0) as u64;
    let mut key = Vec::with_capacity(40);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&(u64::MAX - millis).to_be_bytes());
    key.extend_from_slice(audit_id.as_bytes());
    key
}

/// Create a prefix for iterating all audits for a user.
#[must_use]
pub fn user_audits_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the audit ID from a user-audit index key.
///
/// # Panics
///
/// Panics if the key is not at least 40 bytes.
#[must_use]
pub fn extract_audit_id_from_user_key(key: &[u8]) -> AuditId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[24..40]);
    AuditId::from_uuid(uuid::Uuid::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_length() {
        let user_id = UserId::generate();
        assert_eq!(account_key(&user_id).len(), 16);
    }

    #[test]
    fn user_audit_key_format() {
        let user_id = UserId::generate();
        let audit_id = AuditId::generate();
        let key = user_audit_key(&user_id, Utc::now(), &audit_id);

        assert_eq!(key.len(), 40);
        assert_eq!(&key[..16], user_id.as_bytes());
        assert_eq!(&key[24..], audit_id.as_bytes());
    }

    #[test]
    fn newer_records_sort_first() {
        let user_id = UserId::generate();
        let audit_id = AuditId::generate();
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::seconds(5);

        let early_key = user_audit_key(&user_id, earlier, &audit_id);
        let late_key = user_audit_key(&user_id, later, &audit_id);
        assert!(late_key < early_key);
    }

    #[test]
    fn extract_audit_id_roundtrip() {
        let user_id = UserId::generate();
        let audit_id = AuditId::generate();
        let key = user_audit_key(&user_id, Utc::now(), &audit_id);

        assert_eq!(extract_audit_id_from_user_key(&key), audit_id);
    }
}
