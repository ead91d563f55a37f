//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the [`Store`]
//! trait. RocksDB has no conditional-update primitive, so all credit
//! mutations are serialized through an internal mutex; the get/check/put
//! inside that critical section is what makes the ledger's
//! decrement-if-positive atomic.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use mailvet_core::{AuditRecord, UserAccount, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{Reservation, Store, MAX_ACTIVITY_LIMIT};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    // Guards all ledger mutations; see module docs.
    ledger_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            ledger_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn load_account(&self, user_id: &UserId) -> Result<Option<UserAccount>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn store_account(&self, account: &UserAccount) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(&account.user_id);
        let value = Self::serialize(account)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_audit(&self, key: &[u8]) -> Result<Option<AuditRecord>> {
        let cf = self.cf(cf::AUDITS)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}

impl Store for RocksStore {
    fn put_account(&self, account: &UserAccount) -> Result<()> {
        let _guard = self
            .ledger_lock
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        self.store_account(account)
    }

    fn get_account(&self, user_id: &UserId) -> Result<Option<UserAccount>> {
        self.load_account(user_id)
    }

    fn reserve_credit_if_needed(&self, user_id: &UserId) -> Result<Reservation> {
        let _guard = self
            .ledger_lock
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut account = self.load_account(user_id)?.ok_or(StoreError::NotFound)?;

        if !account.is_metered() {
            return Ok(Reservation {
                reserved: false,
                account,
            });
        }

        if account.credits <= 0 {
            return Err(StoreError::InsufficientCredits {
                credits: account.credits,
            });
        }

        account.credits -= 1;
        account.updated_at = chrono::Utc::now();
        self.store_account(&account)?;

        Ok(Reservation {
            reserved: true,
            account,
        })
    }

    fn refund_credit(&self, user_id: &UserId) -> Result<i64> {
        let _guard = self
            .ledger_lock
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut account = self.load_account(user_id)?.ok_or(StoreError::NotFound)?;
        account.credits += 1;
        account.updated_at = chrono::Utc::now();
        self.store_account(&account)?;

        Ok(account.credits)
    }

    fn insert_audit(&self, record: &AuditRecord) -> Result<()> {
        let cf_audits = self.cf(cf::AUDITS)?;
        let cf_by_user = self.cf(cf::AUDITS_BY_USER)?;

        let audit_key = keys::audit_key(&record.id);
        let user_key = keys::user_audit_key(&record.user_id, record.created_at, &record.id);
        let value = Self::serialize(record)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_audits, &audit_key, &value);
        batch.put_cf(&cf_by_user, &user_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn recent_activity(&self, user_id: &UserId, limit: usize) -> Result<Vec<AuditRecord>> {
        let limit = limit.min(MAX_ACTIVITY_LIMIT);
        let cf_by_user = self.cf(cf::AUDITS_BY_USER)?;
        let prefix = keys::user_audits_prefix(user_id);

        let mut records = Vec::new();

        // The index key embeds a reversed timestamp, so a forward scan from
        // the prefix visits the user's records newest first.
        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }
            if records.len() >= limit {
                break;
            }

            let audit_id = keys::extract_audit_id_from_user_key(&key);
            if let Some(record) = self.get_audit(&keys::audit_key(&audit_id))? {
                records.push(record);
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailvet_core::{Classification, Plan, RiskLevel};
    use tempfile::TempDir;

    fn open_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let store = RocksStore::open(dir.path()).expect("open store");
        (store, dir)
    }

    fn audit_for(user_id: UserId, email: &str, created_at: chrono::DateTime<chrono::Utc>) -> AuditRecord {
        let mut record = AuditRecord::new(
            user_id,
            email.to_string(),
            "example.com".to_string(),
            "sub_1".to_string(),
            Some("PRO".to_string()),
            "ok".to_string(),
            Some("valid".to_string()),
            Classification {
                disposable: false,
                role_based: false,
                catch_all: false,
                mx_records: true,
                risk_level: RiskLevel::Low,
            },
            1,
            12,
            serde_json::Value::Null,
        );
        record.created_at = created_at;
        record
    }

    #[test]
    fn account_roundtrip() {
        let (store, _dir) = open_store();
        let user_id = UserId::generate();
        store
            .put_account(&UserAccount::with_credits(user_id, Plan::Free, 5))
            .unwrap();

        let account = store.get_account(&user_id).unwrap().unwrap();
        assert_eq!(account.credits, 5);
        assert_eq!(account.plan, Plan::Free);
    }

    #[test]
    fn reserve_and_refund() {
        let (store, _dir) = open_store();
        let user_id = UserId::generate();
        store
            .put_account(&UserAccount::with_credits(user_id, Plan::Free, 1))
            .unwrap();

        let reservation = store.reserve_credit_if_needed(&user_id).unwrap();
        assert!(reservation.reserved);
        assert_eq!(reservation.account.credits, 0);

        let err = store.reserve_credit_if_needed(&user_id).unwrap_err();
        assert!(matches!(err, StoreError::InsufficientCredits { .. }));

        assert_eq!(store.refund_credit(&user_id).unwrap(), 1);
    }

    #[test]
    fn activity_scan_is_newest_first() {
        let (store, _dir) = open_store();
        let user_id = UserId::generate();
        let base = chrono::Utc::now();

        for i in 0..4 {
            let created = base + chrono::Duration::milliseconds(i64::from(i));
            store
                .insert_audit(&audit_for(user_id, &format!("u{i}@example.com"), created))
                .unwrap();
        }

        let page = store.recent_activity(&user_id, 10).unwrap();
        assert_eq!(page.len(), 4);
        assert_eq!(page[0].email, "u3@example.com");
        assert_eq!(page[3].email, "u0@example.com");
    }

    #[test]
    fn activity_does_not_cross_users() {
        let (store, _dir) = open_store();
        let user_a = UserId::generate();
        let user_b = UserId::generate();
        let now = chrono::Utc::now();

        store.insert_audit(&audit_for(user_a, "a@example.com", now)).unwrap();
        store.insert_audit(&audit_for(user_b, "b@example.com", now)).unwrap();

        let page = store.recent_activity(&user_a, 10).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].email, "a@example.com");
    }
}
