// SPDX-License-Identifier: MIT
//! User-record persistence — the key/value collaborator behind every command.
//!
//! The contract is deliberately small: `get` by user id, `save` a whole
//! record. Persistence is last-write-wins with no versioning; a missing
//! record is not an error (the service lazily creates one). Two backends:
//! [`SqliteStore`] for real deployments and [`MemoryStore`] for tests and
//! throwaway sessions.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::user::UserRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),

    /// The stored list column could not be encoded or decoded.
    #[error("record codec error for user '{user_id}': {source}")]
    Codec {
        user_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The operation exceeded the configured query timeout.
    #[error("store query timed out after {0}s")]
    Timeout(u64),
}

impl StoreError {
    /// Whether a bounded retry is worth attempting. Codec failures are
    /// deterministic; backend and timeout failures may be transient
    /// (locked database, slow disk).
    pub fn is_transient(&self) -> bool {
        !matches!(self, StoreError::Codec { .. })
    }
}

/// The persistence collaborator consumed by the bot core.
///
/// `save` writes the whole record and returns its id.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn save(&self, user: &UserRecord) -> Result<String, StoreError>;
}

/// Fetch a user's record, falling back to a fresh one when the store has
/// never seen this user. Returns the record and whether it was just created
/// (callers skip the save when an unchanged fresh record is all they have).
pub async fn fetch_or_create(
    store: &dyn UserStore,
    user_id: &str,
) -> Result<(UserRecord, bool), StoreError> {
    match store.get(user_id).await? {
        Some(user) => Ok((user, false)),
        None => Ok((UserRecord::new(user_id), true)),
    }
}
