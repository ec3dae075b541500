//! Error types for the store.

use crate::account::AccountId;
use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
///
/// These are faults, not sync rejections: a duplicate identifier or a stale
/// timestamp is a normal non-accepted outcome handled above this layer and
/// never surfaces here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error while reading or writing the store file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store file does not parse.
    #[error("invalid store format: {0}")]
    Format(#[from] serde_json::Error),

    /// The referenced account has no data entry.
    #[error("unknown account: {account}")]
    UnknownAccount {
        /// The account that failed to resolve.
        account: AccountId,
    },

    /// An account with this username already exists.
    #[error("username already taken: {username}")]
    UsernameTaken {
        /// The conflicting username.
        username: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::UnknownAccount {
            account: AccountId::new(7),
        };
        assert!(err.to_string().contains('7'));

        let err = StoreError::UsernameTaken {
            username: "mara".into(),
        };
        assert!(err.to_string().contains("mara"));
    }
}
