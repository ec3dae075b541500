//! Accounts and bearer tokens.
//!
//! Tokens are 32 random bytes, hex-encoded for transport; the store keeps
//! only their SHA-256 digest, so a leaked store file does not leak live
//! credentials. Passwords are stored as `sha256$<salt>$<digest>` with a
//! random per-account salt.

use crate::error::{ServerError, ServerResult};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use taakl_model::Timestamp;
use taakl_store::{AccountRecord, Store, StoreError};
use uuid::Uuid;

/// A freshly authenticated session: the account plus its transport token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The account the token authenticates.
    pub account: AccountRecord,
    /// The bearer token, hex-encoded. Shown once; only its digest is kept.
    pub token: String,
}

/// Registers, logs in, and authenticates accounts.
#[derive(Debug, Clone)]
pub struct Authenticator {
    store: Arc<Store>,
    token_expiry_days: i64,
}

impl Authenticator {
    /// Creates an authenticator over the given store.
    pub fn new(store: Arc<Store>, token_expiry_days: i64) -> Self {
        Self {
            store,
            token_expiry_days,
        }
    }

    /// Registers a new account and issues its first token.
    ///
    /// Usernames are 3–50 characters of letters, digits, underscores, and
    /// hyphens; passwords at least 8 characters.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
    ) -> ServerResult<AuthSession> {
        let username = username.trim();
        if username.len() < 3 || username.len() > 50 {
            return Err(ServerError::InvalidRequest(
                "username must be between 3 and 50 characters".into(),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ServerError::InvalidRequest(
                "username can only contain letters, numbers, underscores, and hyphens".into(),
            ));
        }
        if password.len() < 8 {
            return Err(ServerError::InvalidRequest(
                "password must be at least 8 characters".into(),
            ));
        }
        let email = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        if let Some(e) = &email {
            if !e.contains('@') {
                return Err(ServerError::InvalidRequest("invalid email address".into()));
            }
        }

        let account = self
            .store
            .create_account(
                username,
                &Uuid::new_v4().to_string(),
                &hash_password(password),
                email,
                Timestamp::now(),
            )
            .map_err(|e| match e {
                StoreError::UsernameTaken { username } => ServerError::UsernameTaken(username),
                other => ServerError::Store(other),
            })?;

        let token = self.issue_token(&account);
        Ok(AuthSession { account, token })
    }

    /// Logs into an existing account, issuing a fresh token.
    ///
    /// Unknown username and wrong password fail the same way.
    pub fn login(&self, username: &str, password: &str) -> ServerResult<AuthSession> {
        let account = self
            .store
            .account_by_username(username.trim())
            .filter(|a| verify_password(password, &a.password_digest))
            .ok_or_else(|| {
                ServerError::AuthenticationFailed("invalid username or password".into())
            })?;

        let token = self.issue_token(&account);
        Ok(AuthSession { account, token })
    }

    /// Resolves a bearer token to its account.
    pub fn authenticate(&self, token: &str) -> ServerResult<AccountRecord> {
        self.store
            .account_for_token(&digest_hex(token.as_bytes()), Timestamp::now())
            .ok_or_else(|| ServerError::AuthenticationFailed("invalid or expired token".into()))
    }

    /// Revokes a token. Unknown tokens are a no-op.
    pub fn logout(&self, token: &str) -> bool {
        self.store.revoke_token(&digest_hex(token.as_bytes()))
    }

    /// Drops expired tokens, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired_tokens(Timestamp::now())
    }

    fn issue_token(&self, account: &AccountRecord) -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = hex_encode(&bytes);

        self.store.insert_token(
            &digest_hex(token.as_bytes()),
            account.id,
            Timestamp::now().plus_days(self.token_expiry_days),
        );
        token
    }
}

/// Hashes a password with a fresh random salt.
pub(crate) fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    let salt = hex_encode(&salt);
    let digest = digest_hex(format!("{salt}{password}").as_bytes());
    format!("sha256${salt}${digest}")
}

/// Verifies a password against a stored `sha256$<salt>$<digest>` value.
pub(crate) fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some("sha256"), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    digest_hex(format!("{salt}{password}").as_bytes()) == digest
}

fn digest_hex(data: &[u8]) -> String {
    hex_encode(&Sha256::digest(data))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
