// SPDX-License-Identifier: MIT
//! SQLite-backed user store.
//!
//! One row per user; the list rides in a JSON text column so a record is
//! read and written at single-row granularity, matching the key/value
//! contract. WAL journal mode keeps saves crash-safe without blocking
//! concurrent reads.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::debug;

use super::{StoreError, UserStore};
use crate::user::UserRecord;

/// Upper bound on any single query. Prevents a hung database from
/// wedging the command that issued it.
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Execute a store future with the standard query timeout.
async fn with_timeout<T>(
    fut: impl std::future::Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(QUERY_TIMEOUT.as_secs())),
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: Option<String>,
    /// JSON array of item names, e.g. `["milk","eggs"]`.
    list: String,
    #[allow(dead_code)]
    created_at: String,
    #[allow(dead_code)]
    updated_at: String,
}

impl UserRow {
    fn into_record(self) -> Result<UserRecord, StoreError> {
        let list = serde_json::from_str(&self.list).map_err(|source| StoreError::Codec {
            user_id: self.id.clone(),
            source,
        })?;
        Ok(UserRecord {
            id: self.id,
            name: self.name,
            list,
        })
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(data_dir: &Path) -> Result<Self, StoreError> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Open (or create) the store with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding
    /// it are logged at WARN level. Set to 0 to disable.
    pub async fn new_with_slow_query(
        data_dir: &Path,
        slow_query_ms: u64,
    ) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| StoreError::Backend(sqlx::Error::Io(e)))?;
        let db_path = data_dir.join("grocerd.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))
                .map_err(StoreError::Backend)?
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        debug!(db = %db_path.display(), "user store ready");
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
        // Idempotent bootstrap: a single table, safe to run on every start.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                 id TEXT PRIMARY KEY,
                 name TEXT,
                 list TEXT NOT NULL DEFAULT '[]',
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        with_timeout(async {
            let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            row.map(UserRow::into_record).transpose()
        })
        .await
    }

    async fn save(&self, user: &UserRecord) -> Result<String, StoreError> {
        let list = serde_json::to_string(&user.list).map_err(|source| StoreError::Codec {
            user_id: user.id.clone(),
            source,
        })?;
        with_timeout(async {
            let now = Utc::now().to_rfc3339();
            sqlx::query(
                "INSERT INTO users (id, name, list, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                   name = excluded.name,
                   list = excluded.list,
                   updated_at = excluded.updated_at",
            )
            .bind(&user.id)
            .bind(&user.name)
            .bind(&list)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await?;
            Ok(user.id.clone())
        })
        .await
    }
}
