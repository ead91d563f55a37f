//! In-memory storage implementation.
//!
//! The default backend: a pair of lock-guarded maps. The conditional
//! decrement runs entirely inside one write-lock critical section, which
//! gives it the same decrement-if-positive atomicity the contract requires
//! of every backend.

use std::collections::HashMap;
use std::sync::RwLock;

use mailvet_core::{AuditRecord, UserAccount, UserId};

use crate::error::{Result, StoreError};
use crate::{Reservation, Store, MAX_ACTIVITY_LIMIT};

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<UserId, UserAccount>>,
    // Append-only; newest records at the tail.
    audits: RwLock<Vec<AuditRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn put_account(&self, account: &UserAccount) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        accounts.insert(account.user_id, account.clone());
        Ok(())
    }

    fn get_account(&self, user_id: &UserId) -> Result<Option<UserAccount>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(accounts.get(user_id).cloned())
    }

    fn reserve_credit_if_needed(&self, user_id: &UserId) -> Result<Reservation> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let account = accounts.get_mut(user_id).ok_or(StoreError::NotFound)?;

        if !account.is_metered() {
            return Ok(Reservation {
                reserved: false,
                account: account.clone(),
            });
        }

        if account.credits <= 0 {
            return Err(StoreError::InsufficientCredits {
                credits: account.credits,
            });
        }

        account.credits -= 1;
        account.updated_at = chrono::Utc::now();

        Ok(Reservation {
            reserved: true,
            account: account.clone(),
        })
    }

    fn refund_credit(&self, user_id: &UserId) -> Result<i64> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let account = accounts.get_mut(user_id).ok_or(StoreError::NotFound)?;

        account.credits += 1;
        account.updated_at = chrono::Utc::now();
        Ok(account.credits)
    }

    fn insert_audit(&self, record: &AuditRecord) -> Result<()> {
        let mut audits = self
            .audits
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        audits.push(record.clone());
        Ok(())
    }

    fn recent_activity(&self, user_id: &UserId, limit: usize) -> Result<Vec<AuditRecord>> {
        let limit = limit.min(MAX_ACTIVITY_LIMIT);
        let audits = self
            .audits
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(audits
            .iter()
            .rev()
            .filter(|r| r.user_id == *user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
