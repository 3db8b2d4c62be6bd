//! SessionRepository trait definition.
//!
//! One persisted record per session id. Implementations live in
//! hubbub-infra (e.g., `SqliteSessionRepository`).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use hubbub_types::chat::SessionRecord;
use hubbub_types::error::RepositoryError;

/// Repository trait for session record persistence.
pub trait SessionRepository: Send + Sync {
    /// Load the record for a session id. Returns `None` when the session
    /// has never been persisted. A stored-but-unparseable record is
    /// reported as [`RepositoryError::CorruptRecord`] so the caller can
    /// fail open.
    fn load(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<SessionRecord>, RepositoryError>> + Send;

    /// Persist the record (upsert by session id).
    fn save(
        &self,
        record: &SessionRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
