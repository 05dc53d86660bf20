// SPDX-License-Identifier: MIT
//! Per-user record — the single unit of persistence.

use serde::{Deserialize, Serialize};

/// Everything the bot knows about one user: an opaque transport-supplied
/// identifier, an optional nickname, and the grocery list itself.
///
/// The list is insertion-ordered and holds no duplicates under exact
/// (case-sensitive) string equality. A user with no stored record is
/// indistinguishable from one with an empty list — [`UserRecord::new`]
/// is the lazy-create path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    /// Display nickname set via "call me X". Never touched by list operations.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub list: Vec<String>,
}

impl UserRecord {
    /// Fresh record for a user the store has never seen.
    pub fn new(id: impl Into<String>) -> Self {
        UserRecord {
            id: id.into(),
            name: None,
            list: Vec::new(),
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.list.iter().any(|e| e == item)
    }
}
