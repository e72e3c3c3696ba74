use chrono::Utc;
use exam_core::model::SessionId;
use sqlx::Row;

use super::SqliteSnapshotStore;
use crate::repository::{SessionSnapshot, SnapshotRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl SnapshotRepository for SqliteSnapshotStore {
    async fn save(
        &self,
        session_id: &SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), StorageError> {
        let payload = serde_json::to_string(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        sqlx::query(
            r"
                INSERT INTO session_snapshots (session_id, payload, saved_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(session_id) DO UPDATE SET
                    payload = excluded.payload,
                    saved_at = excluded.saved_at
            ",
        )
        .bind(session_id.as_str())
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn load(&self, session_id: &SessionId) -> Result<Option<SessionSnapshot>, StorageError> {
        let row = sqlx::query("SELECT payload FROM session_snapshots WHERE session_id = ?1")
            .bind(session_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.try_get("payload").map_err(conn)?;

        // A corrupt payload degrades to absent rather than failing the caller.
        Ok(serde_json::from_str(&payload).ok())
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session_snapshots WHERE session_id = ?1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
