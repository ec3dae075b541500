//! The store: account registry, token table, per-account data, and
//! snapshot transactions.

use crate::account::{AccountData, AccountId, AccountRecord, TokenRecord};
use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use taakl_model::Timestamp;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreInner {
    next_account: u64,
    accounts: Vec<AccountRecord>,
    tokens: Vec<TokenRecord>,
    data: BTreeMap<AccountId, AccountData>,
}

/// The central store.
///
/// Holds every account's record tree plus the account/token registry, and
/// serializes all writers behind one lock: each sync batch or full import
/// runs as a single transaction against one account's data, with snapshot
/// rollback on fault.
///
/// The store is handed to collaborators explicitly (constructor injection);
/// there is no global handle.
///
/// # Example
///
/// ```
/// use taakl_store::Store;
/// use taakl_model::Timestamp;
///
/// let store = Store::in_memory();
/// let account = store
///     .create_account("mara", "uuid-1", "sha256$ab$cd", None, Timestamp::now())
///     .unwrap();
/// store
///     .read(account.id, |data| assert!(data.clients.is_empty()))
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct Store {
    inner: RwLock<StoreInner>,
}

impl Store {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads a store from a JSON file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = fs::read_to_string(path)?;
        let inner: StoreInner = serde_json::from_str(&text)?;
        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    /// Loads a store from a JSON file, or creates an empty one if the file
    /// does not exist yet.
    pub fn load_or_default(path: &Path) -> StoreResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::in_memory())
        }
    }

    /// Writes the whole store to a JSON file.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let inner = self.inner.read();
        let text = serde_json::to_string_pretty(&*inner)?;
        fs::write(path, text)?;
        Ok(())
    }

    // ---- account registry ----

    /// Registers a new account.
    ///
    /// Fails with [`StoreError::UsernameTaken`] if the username exists.
    pub fn create_account(
        &self,
        username: &str,
        uuid: &str,
        password_digest: &str,
        email: Option<String>,
        now: Timestamp,
    ) -> StoreResult<AccountRecord> {
        let mut inner = self.inner.write();
        if inner.accounts.iter().any(|a| a.username == username) {
            return Err(StoreError::UsernameTaken {
                username: username.to_string(),
            });
        }

        inner.next_account += 1;
        let record = AccountRecord {
            id: AccountId::new(inner.next_account),
            uuid: uuid.to_string(),
            username: username.to_string(),
            password_digest: password_digest.to_string(),
            email,
            created_at: now,
        };
        inner.accounts.push(record.clone());
        inner.data.insert(record.id, AccountData::default());
        Ok(record)
    }

    /// Looks up an account by username.
    pub fn account_by_username(&self, username: &str) -> Option<AccountRecord> {
        self.inner
            .read()
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned()
    }

    /// Looks up an account by internal id.
    pub fn account_by_id(&self, id: AccountId) -> Option<AccountRecord> {
        self.inner
            .read()
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.inner.read().accounts.len()
    }

    /// All registered accounts.
    pub fn accounts(&self) -> Vec<AccountRecord> {
        self.inner.read().accounts.clone()
    }

    // ---- token registry ----

    /// Records an issued token digest.
    pub fn insert_token(&self, digest: &str, account: AccountId, expires_at: Timestamp) {
        self.inner.write().tokens.push(TokenRecord {
            digest: digest.to_string(),
            account,
            expires_at,
        });
    }

    /// Resolves a token digest to its account, if the token is live.
    pub fn account_for_token(&self, digest: &str, now: Timestamp) -> Option<AccountRecord> {
        let inner = self.inner.read();
        let token = inner
            .tokens
            .iter()
            .find(|t| t.digest == digest && t.expires_at > now)?;
        let account = token.account;
        inner.accounts.iter().find(|a| a.id == account).cloned()
    }

    /// Deletes a token digest. Returns whether anything was removed.
    pub fn revoke_token(&self, digest: &str) -> bool {
        let mut inner = self.inner.write();
        let before = inner.tokens.len();
        inner.tokens.retain(|t| t.digest != digest);
        inner.tokens.len() < before
    }

    /// Removes expired tokens, returning how many were dropped.
    pub fn purge_expired_tokens(&self, now: Timestamp) -> usize {
        let mut inner = self.inner.write();
        let before = inner.tokens.len();
        inner.tokens.retain(|t| t.expires_at > now);
        before - inner.tokens.len()
    }

    // ---- per-account data ----

    /// Runs a read-only closure against one account's data.
    pub fn read<T>(
        &self,
        account: AccountId,
        f: impl FnOnce(&AccountData) -> T,
    ) -> StoreResult<T> {
        let inner = self.inner.read();
        let data = inner
            .data
            .get(&account)
            .ok_or(StoreError::UnknownAccount { account })?;
        Ok(f(data))
    }

    /// Runs a closure against one account's data as a single transaction.
    ///
    /// The account's data is snapshotted first; if the closure returns an
    /// error the snapshot is restored, so a fault rolls back every change
    /// the closure made. Validation rejections are plain return values
    /// inside `Ok` and do not roll back.
    ///
    /// The write lock is held for the duration, which is what serializes
    /// concurrent sync calls touching the same store.
    pub fn transaction<T, E>(
        &self,
        account: AccountId,
        f: impl FnOnce(&mut AccountData) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut inner = self.inner.write();
        let data = inner
            .data
            .get_mut(&account)
            .ok_or(StoreError::UnknownAccount { account })?;
        let snapshot = data.clone();
        match f(data) {
            Ok(value) => Ok(value),
            Err(e) => {
                *data = snapshot;
                Err(e)
            }
        }
    }
}
