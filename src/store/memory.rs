// SPDX-License-Identifier: MIT
//! In-memory user store — a HashMap behind an async RwLock.
//!
//! Used by the test suite and by `grocerd --memory` sessions where nothing
//! should outlive the process. Same contract as [`SqliteStore`], including
//! last-write-wins saves.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, UserStore};
use crate::user::UserRecord;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held. Test helper.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn save(&self, user: &UserRecord) -> Result<String, StoreError> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(user.id.clone())
    }
}
