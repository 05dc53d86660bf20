// SPDX-License-Identifier: MIT
//! Nickname operations ("call me X" / "who am I").
//!
//! Kept separate from list operations: they share the record but never
//! touch the list field.

use tracing::info;

use crate::store::{fetch_or_create, StoreError, UserStore};

/// Store a nickname and return it as persisted.
pub async fn set_name(
    store: &dyn UserStore,
    user_id: &str,
    name: &str,
) -> Result<String, StoreError> {
    let (mut user, _created) = fetch_or_create(store, user_id).await?;
    user.name = Some(name.to_string());
    store.save(&user).await?;
    info!(user = user_id, name, "nickname stored");
    Ok(name.to_string())
}

/// Look up a nickname. `None` signals "unknown" to the caller, which opens
/// the clarifying dialogue.
pub async fn get_name(
    store: &dyn UserStore,
    user_id: &str,
) -> Result<Option<String>, StoreError> {
    Ok(store.get(user_id).await?.and_then(|u| u.name))
}
