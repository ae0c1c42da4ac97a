use crate::config::EvictionPolicy;
use crate::error::StoreError;
use crate::feedback::{FeedbackItem, FeedbackKind};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// SQLite-backed durable store owning the History sequence.
///
/// Head of History = highest `seq`. Every mutation runs in a single
/// transaction, so readers always see a complete sequence, never a partial
/// write. All other components go through this contract; nobody holds a
/// private copy of the sequence.
pub struct HistoryStore {
    pool: SqlitePool,
    max_items: usize,
    policy: EvictionPolicy,
}

impl HistoryStore {
    /// Open (or create) the history database at `path`.
    pub async fn open(
        path: &Path,
        max_items: usize,
        policy: EvictionPolicy,
    ) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Open(e.to_string()))?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&url)
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        Self::init_schema(&pool).await?;
        Ok(Self {
            pool,
            max_items,
            policy,
        })
    }

    /// Open an in-memory store (useful for tests).
    pub async fn in_memory(max_items: usize, policy: EvictionPolicy) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;
        Self::init_schema(&pool).await?;
        Ok(Self {
            pool,
            max_items,
            policy,
        })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS feedback_history (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                id         TEXT NOT NULL UNIQUE,
                kind       TEXT NOT NULL,
                text       TEXT NOT NULL,
                timestamp  TEXT NOT NULL,
                pending    INTEGER NOT NULL,
                user_agent TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_feedback_pending
                ON feedback_history(pending);",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Insert `item` at the head of History and trim the tail back to
    /// capacity, atomically.
    pub async fn append(&self, item: &FeedbackItem) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO feedback_history (id, kind, text, timestamp, pending, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(item.id.to_string())
        .bind(item.kind.to_string())
        .bind(&item.text)
        .bind(item.timestamp.to_rfc3339())
        .bind(i64::from(item.pending))
        .bind(item.user_agent.as_deref())
        .execute(&mut *tx)
        .await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM feedback_history")
            .fetch_one(&mut *tx)
            .await?;
        let excess = (count as usize).saturating_sub(self.max_items);

        if excess > 0 {
            let evicted = match self.policy {
                EvictionPolicy::Oldest => 0,
                EvictionPolicy::DeliveredFirst => {
                    // Prefer dropping already-delivered tail items.
                    let result = sqlx::query(
                        "DELETE FROM feedback_history WHERE seq IN (
                             SELECT seq FROM feedback_history
                             WHERE pending = 0 ORDER BY seq ASC LIMIT ?1
                         )",
                    )
                    .bind(excess as i64)
                    .execute(&mut *tx)
                    .await?;
                    result.rows_affected() as usize
                }
            };

            let remaining = excess - evicted;
            if remaining > 0 {
                // Positional eviction: oldest first, pending or not.
                sqlx::query(
                    "DELETE FROM feedback_history WHERE seq IN (
                         SELECT seq FROM feedback_history ORDER BY seq ASC LIMIT ?1
                     )",
                )
                .bind(remaining as i64)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Immutable snapshot of the full History, newest first. Side-effect
    /// free; repeated calls without intervening mutation return equal
    /// sequences.
    pub async fn read_all(&self) -> Result<Vec<FeedbackItem>, StoreError> {
        self.read_where("").await
    }

    /// Snapshot of the undelivered subset, newest first (scheduler scan).
    pub async fn read_pending(&self) -> Result<Vec<FeedbackItem>, StoreError> {
        self.read_where("WHERE pending = 1").await
    }

    async fn read_where(&self, filter: &str) -> Result<Vec<FeedbackItem>, StoreError> {
        let sql = format!(
            "SELECT id, kind, text, timestamp, pending, user_agent
             FROM feedback_history {filter} ORDER BY seq DESC"
        );
        let rows: Vec<(String, String, String, String, i64, Option<String>)> =
            sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(row_to_item).collect()
    }

    /// Remove the item with the given identity from the current persisted
    /// state. Returns whether a row was removed. Identity-keyed so a
    /// concurrent head-insert cannot shift which item gets removed.
    pub async fn remove(&self, id: &Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM feedback_history WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Explicit reset (reinstall semantics).
    pub async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM feedback_history")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_item(
    (id, kind, text, timestamp, pending, user_agent): (
        String,
        String,
        String,
        String,
        i64,
        Option<String>,
    ),
) -> Result<FeedbackItem, StoreError> {
    let corrupt = |message: String| StoreError::CorruptRow {
        id: id.clone(),
        message,
    };

    let kind = FeedbackKind::from_str(&kind)
        .map_err(|_| corrupt(format!("unknown kind {kind:?}")))?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| corrupt(format!("bad timestamp: {e}")))?
        .with_timezone(&Utc);
    let parsed_id = Uuid::parse_str(&id).map_err(|e| corrupt(format!("bad id: {e}")))?;

    Ok(FeedbackItem {
        id: parsed_id,
        kind,
        emoji: kind.emoji().to_string(),
        text,
        timestamp,
        pending: pending != 0,
        user_agent,
    })
}
