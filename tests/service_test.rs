// SPDX-License-Identifier: MIT
//! End-to-end tests for the composed bot service: real router, real list
//! operations, real stores (tempdir-backed SQLite and in-memory).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use grocerd::retry::RetryConfig;
use grocerd::store::{MemoryStore, SqliteStore, StoreError, UserStore};
use grocerd::user::UserRecord;
use grocerd::{Action, BotService};

async fn sqlite_service() -> (BotService, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path()).await.unwrap();
    let service =
        BotService::new(Arc::new(store), "grocer").with_retry(RetryConfig::instant());
    (service, dir)
}

async fn say(service: &BotService, user: &str, line: &str) -> String {
    service
        .handle(user, line)
        .await
        .unwrap()
        .expect("expected a reply")
        .text
}

// The six reference scenarios, end to end against SQLite.

#[tokio::test]
async fn fresh_user_add_reports_both_items() {
    let (svc, _dir) = sqlite_service().await;
    assert_eq!(
        say(&svc, "U1", "add milk, eggs").await,
        "Got it. I have added milk, eggs to your list.\nYour list is: milk, eggs."
    );
}

#[tokio::test]
async fn second_add_splits_added_and_repeats() {
    let (svc, _dir) = sqlite_service().await;
    say(&svc, "U1", "add milk, eggs").await;
    assert_eq!(
        say(&svc, "U1", "add milk, bread").await,
        "Got it. I have added bread to your list. Your list already includes: milk.\n\
         Your list is: milk, eggs, bread."
    );
}

#[tokio::test]
async fn remove_names_the_item_and_shows_survivors() {
    let (svc, _dir) = sqlite_service().await;
    say(&svc, "U1", "add milk, eggs").await;
    say(&svc, "U1", "add bread").await;
    assert_eq!(
        say(&svc, "U1", "remove eggs").await,
        "Got it. I have removed eggs from your list.\nYour list is: milk, bread."
    );
}

#[tokio::test]
async fn remove_of_absent_item_reports_not_found() {
    let (svc, _dir) = sqlite_service().await;
    say(&svc, "U1", "add milk, bread").await;
    assert_eq!(
        say(&svc, "U1", "remove bananas").await,
        "I could not find bananas on your list.\nYour list is: milk, bread."
    );
    // And the list is untouched.
    assert_eq!(
        say(&svc, "U1", "print list").await,
        "Your list is: milk, bread."
    );
}

#[tokio::test]
async fn clear_then_print_reports_empty() {
    let (svc, _dir) = sqlite_service().await;
    say(&svc, "U1", "add milk, eggs, bread").await;
    assert_eq!(say(&svc, "U1", "empty list").await, "Got it. Your list is empty.");
    assert_eq!(say(&svc, "U1", "print list").await, "Your list is empty.");
}

#[tokio::test]
async fn print_for_never_seen_user_reports_empty() {
    let (svc, _dir) = sqlite_service().await;
    assert_eq!(say(&svc, "U-new", "my list").await, "Your list is empty.");
}

// Isolation and persistence.

#[tokio::test]
async fn operations_on_one_user_never_touch_another() {
    let (svc, _dir) = sqlite_service().await;
    say(&svc, "U-a", "add milk, eggs").await;
    say(&svc, "U-b", "add coffee").await;

    say(&svc, "U-a", "remove milk").await;
    say(&svc, "U-a", "empty list").await;

    assert_eq!(say(&svc, "U-b", "print list").await, "Your list is: coffee.");
}

#[tokio::test]
async fn lists_survive_a_service_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = SqliteStore::new(dir.path()).await.unwrap();
        let svc = BotService::new(Arc::new(store), "grocer");
        say(&svc, "U1", "add milk, eggs").await;
        say(&svc, "U1", "call me Ada").await;
    }
    let store = SqliteStore::new(dir.path()).await.unwrap();
    let svc = BotService::new(Arc::new(store), "grocer");
    assert_eq!(say(&svc, "U1", "print list").await, "Your list is: milk, eggs.");
    assert_eq!(say(&svc, "U1", "who am i").await, "Your name is Ada");
}

#[tokio::test]
async fn concurrent_adds_for_the_same_user_both_land() {
    let (svc, _dir) = sqlite_service().await;
    let svc = Arc::new(svc);

    let a = tokio::spawn({
        let svc = svc.clone();
        async move { svc.handle("U1", "add milk").await.unwrap() }
    });
    let b = tokio::spawn({
        let svc = svc.clone();
        async move { svc.handle("U1", "add eggs").await.unwrap() }
    });
    a.await.unwrap();
    b.await.unwrap();

    let printed = say(&svc, "U1", "print list").await;
    assert!(printed.contains("milk"), "lost an update: {printed}");
    assert!(printed.contains("eggs"), "lost an update: {printed}");
}

// Failure behavior.

/// Store wrapper that fails the first `failures` calls with a transient
/// error, then delegates.
struct FlakyStore {
    inner: MemoryStore,
    remaining: AtomicU32,
}

impl FlakyStore {
    fn new(failures: u32) -> Self {
        FlakyStore {
            inner: MemoryStore::new(),
            remaining: AtomicU32::new(failures),
        }
    }

    fn trip(&self) -> Result<(), StoreError> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left > 0 {
            self.remaining.store(left - 1, Ordering::SeqCst);
            return Err(StoreError::Timeout(30));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for FlakyStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.trip()?;
        self.inner.get(user_id).await
    }

    async fn save(&self, user: &UserRecord) -> Result<String, StoreError> {
        self.trip()?;
        self.inner.save(user).await
    }
}

#[tokio::test]
async fn transient_store_failures_are_retried() {
    let store = Arc::new(FlakyStore::new(2));
    let svc = BotService::new(store, "grocer").with_retry(RetryConfig::instant());
    assert_eq!(
        say(&svc, "U1", "add milk").await,
        "Got it. I have added milk to your list.\nYour list is: milk."
    );
}

#[tokio::test]
async fn persistent_store_failure_surfaces_as_command_error() {
    let store = Arc::new(FlakyStore::new(u32::MAX));
    let svc = BotService::new(store, "grocer").with_retry(RetryConfig::no_retry());
    let err = svc.handle("U1", "add milk").await.unwrap_err();
    assert!(err.to_string().contains("adding items failed"));
}

#[tokio::test]
async fn store_failure_for_one_user_leaves_others_usable() {
    let store = Arc::new(FlakyStore::new(1));
    let svc = BotService::new(store, "grocer").with_retry(RetryConfig::no_retry());

    assert!(svc.handle("U-a", "add milk").await.is_err());
    // The store recovered; a different user's command goes through.
    assert_eq!(
        say(&svc, "U-b", "add coffee").await,
        "Got it. I have added coffee to your list.\nYour list is: coffee."
    );
}

// Dialogue end to end.

#[tokio::test]
async fn nickname_dialogue_persists_the_confirmed_name() {
    let (svc, _dir) = sqlite_service().await;
    say(&svc, "U1", "who am i").await;
    say(&svc, "U1", "Grace").await;
    assert_eq!(
        say(&svc, "U1", "yes").await,
        "OK! I will update my dossier...\nGot it. I will call you Grace from now on."
    );
    assert_eq!(say(&svc, "U1", "hello").await, "Hello Grace!!");
}

#[tokio::test]
async fn shutdown_flow_returns_the_shutdown_action() {
    let (svc, _dir) = sqlite_service().await;
    say(&svc, "U1", "shutdown").await;
    let reply = svc.handle("U1", "yes").await.unwrap().unwrap();
    assert_eq!(reply.action, Some(Action::Shutdown));
}
