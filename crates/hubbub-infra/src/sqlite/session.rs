//! SQLite session repository.
//!
//! Implements `SessionRepository` from `hubbub-core`: one row per session
//! id holding the full JSON record, upserted on every save. A row whose
//! JSON no longer parses is reported as `CorruptRecord` so the memory
//! store can fail open instead of refusing the session.

use chrono::Utc;
use sqlx::Row;

use hubbub_core::memory::repository::SessionRepository;
use hubbub_types::chat::SessionRecord;
use hubbub_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for SqliteSessionRepository {
    async fn load(&self, session_id: &str) -> Result<Option<SessionRecord>, RepositoryError> {
        let row = sqlx::query("SELECT record FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let record_json: String = row
            .try_get("record")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let record: SessionRecord = serde_json::from_str(&record_json)
            .map_err(|e| RepositoryError::CorruptRecord(e.to_string()))?;

        Ok(Some(record))
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), RepositoryError> {
        let record_json = serde_json::to_string(record)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize record: {e}")))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO sessions (session_id, record, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (session_id) DO UPDATE SET record = excluded.record, updated_at = excluded.updated_at"#,
        )
        .bind(&record.session_id)
        .bind(&record_json)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
