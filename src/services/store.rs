use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::models::Snapshot;

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

const PAIRINGS_KEY: &str = "pairings";
const QUEUE_KEY: &str = "queue";

/// Durable persistence for the two pieces of engine state that must survive
/// restart: the pairing map and the waiting queue.
///
/// Each collection lives under its own key in the `chat_state` table as a
/// JSON document. The two writes are not one transaction; the engine
/// tolerates one record being a step newer than the other, since no
/// operation depends on cross-record atomicity.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Overwrite both persisted records with the given snapshot. Called
    /// after every state-mutating engine operation.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let pairings_json = serde_json::to_string(&snapshot.pairings)?;
        let queue_json = serde_json::to_string(&snapshot.queue)?;

        sqlx::query("INSERT INTO chat_state (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value")
            .bind(PAIRINGS_KEY)
            .bind(&pairings_json)
            .execute(&self.pool)
            .await?;

        sqlx::query("INSERT INTO chat_state (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value")
            .bind(QUEUE_KEY)
            .bind(&queue_json)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            pairings = snapshot.pairings.len(),
            queued = snapshot.queue.len(),
            "snapshot saved"
        );

        Ok(())
    }

    /// Read the persisted snapshot. A missing or unparseable record reads
    /// as empty with a warning; corruption is repaired downstream by the
    /// engine, never propagated as a crash.
    pub async fn load(&self) -> Result<Snapshot, StoreError> {
        let rows = sqlx::query("SELECT key, value FROM chat_state")
            .fetch_all(&self.pool)
            .await?;

        let mut snapshot = Snapshot::default();
        for row in &rows {
            let key: String = row.get("key");
            let value: String = row.get("value");
            match key.as_str() {
                PAIRINGS_KEY => match serde_json::from_str(&value) {
                    Ok(pairings) => snapshot.pairings = pairings,
                    Err(e) => {
                        tracing::warn!(error = %e, "unreadable pairings record, starting empty")
                    }
                },
                QUEUE_KEY => match serde_json::from_str(&value) {
                    Ok(queue) => snapshot.queue = queue,
                    Err(e) => {
                        tracing::warn!(error = %e, "unreadable queue record, starting empty")
                    }
                },
                other => tracing::debug!(key = other, "ignoring unknown chat_state record"),
            }
        }

        Ok(snapshot)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
