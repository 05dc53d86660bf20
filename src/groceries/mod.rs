// SPDX-License-Identifier: MIT
//! Grocery-list operations — the whole reason this bot exists.
//!
//! Every operation is one fetch → mutate → persist cycle against a single
//! user's record. The list invariant maintained here: insertion order is
//! preserved, and no two entries are equal under exact string match.

pub mod reply;

use tracing::info;

use crate::store::{fetch_or_create, StoreError, UserStore};

/// Items arrive as one captured string, comma-and-space separated:
/// "milk, eggs, bread".
pub const ITEM_DELIMITER: &str = ", ";

/// Split a raw capture into candidate item names, preserving order and
/// dropping empty segments ("milk, , eggs" yields two candidates).
pub fn split_items(raw: &str) -> Vec<String> {
    raw.split(ITEM_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// What an `add` call did: which candidates went in, which were already
/// present, and the final list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AddOutcome {
    pub added: Vec<String>,
    pub repeats: Vec<String>,
    pub list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum RemoveOutcome {
    /// Every entry equal to `item` was deleted (more than one only after an
    /// external data anomaly — the add path never stores duplicates).
    Removed {
        item: String,
        occurrences: usize,
        list: Vec<String>,
    },
    /// The item was not on the list. The record is left untouched.
    NotFound { item: String, list: Vec<String> },
    /// The list was already empty; nothing to remove, nothing mutated.
    EmptyList,
}

/// Add one or more items. Candidates already on the list — including earlier
/// candidates from the same call — are reported as repeats, not added twice.
pub async fn add(
    store: &dyn UserStore,
    user_id: &str,
    raw: &str,
) -> Result<AddOutcome, StoreError> {
    let candidates = split_items(raw);
    let (mut user, _created) = fetch_or_create(store, user_id).await?;

    let mut added = Vec::new();
    let mut repeats = Vec::new();
    for item in candidates {
        if user.contains(&item) {
            repeats.push(item);
        } else {
            user.list.push(item.clone());
            added.push(item);
        }
    }

    store.save(&user).await?;
    info!(
        user = user_id,
        added = added.len(),
        repeats = repeats.len(),
        total = user.list.len(),
        "list add"
    );
    Ok(AddOutcome {
        added,
        repeats,
        list: user.list,
    })
}

/// Remove every entry exactly equal to `item`, preserving the order of the
/// survivors. Removing from an empty list or removing an absent item does
/// not touch the store.
pub async fn remove(
    store: &dyn UserStore,
    user_id: &str,
    item: &str,
) -> Result<RemoveOutcome, StoreError> {
    let (mut user, _created) = fetch_or_create(store, user_id).await?;
    if user.list.is_empty() {
        return Ok(RemoveOutcome::EmptyList);
    }

    let before = user.list.len();
    user.list.retain(|e| e != item);
    let occurrences = before - user.list.len();

    if occurrences == 0 {
        return Ok(RemoveOutcome::NotFound {
            item: item.to_string(),
            list: user.list,
        });
    }

    store.save(&user).await?;
    info!(user = user_id, item, occurrences, "list remove");
    Ok(RemoveOutcome::Removed {
        item: item.to_string(),
        occurrences,
        list: user.list,
    })
}

/// Empty the user's list unconditionally.
pub async fn clear(store: &dyn UserStore, user_id: &str) -> Result<(), StoreError> {
    let (mut user, _created) = fetch_or_create(store, user_id).await?;
    user.list.clear();
    store.save(&user).await?;
    info!(user = user_id, "list cleared");
    Ok(())
}

/// Read the current list. The only save is the lazy creation of a
/// never-seen user's record; an existing record is left untouched.
pub async fn print(store: &dyn UserStore, user_id: &str) -> Result<Vec<String>, StoreError> {
    let (user, created) = fetch_or_create(store, user_id).await?;
    if created {
        store.save(&user).await?;
    }
    Ok(user.list)
}
