//! Session memory store: bounded FIFO history with write-through
//! persistence.
//!
//! Each session id maps to exactly one in-memory record guarded by its own
//! `tokio::sync::Mutex`, so the read-trim-write sequence for a session is
//! serialized while different sessions proceed fully in parallel. The
//! id -> record map is a `DashMap`; entry creation is atomic, so two
//! concurrent first-requests for the same id converge on one record.
//!
//! Every mutation trims to the cap and persists before returning. Loading
//! a missing or corrupt persisted record never raises: the store starts
//! from an empty history and logs the condition.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use hubbub_types::chat::{MessageRole, SessionRecord, StoredMessage};
use hubbub_types::error::{MemoryError, RepositoryError};

use super::repository::SessionRepository;

/// Messages shown per line by [`SessionMemoryStore::summary`].
const SUMMARY_WINDOW: usize = 4;

/// Content preview length in summaries.
const SUMMARY_PREVIEW_CHARS: usize = 50;

/// Bounded, ordered, persisted message history keyed by session id.
pub struct SessionMemoryStore<R: SessionRepository> {
    repo: R,
    max_messages: usize,
    sessions: DashMap<String, Arc<Mutex<SessionRecord>>>,
}

impl<R: SessionRepository> SessionMemoryStore<R> {
    /// Create a store over the given repository with a per-session cap.
    pub fn new(repo: R, max_messages: usize) -> Self {
        Self {
            repo,
            max_messages,
            sessions: DashMap::new(),
        }
    }

    /// The per-session message cap.
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Get the handle for a session, lazily creating it on first reference.
    ///
    /// Loads the persisted record if one exists; a corrupt record is
    /// logged and replaced with an empty history (fail-open). The DashMap
    /// entry API makes handle creation atomic: when two requests race on a
    /// new id, one insert wins and both use the same record.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionRecord>> {
        if let Some(existing) = self.sessions.get(session_id) {
            return existing.clone();
        }

        let loaded = match self.repo.load(session_id).await {
            Ok(Some(record)) => {
                debug!(session_id, messages = record.messages.len(), "Session loaded");
                record
            }
            Ok(None) => SessionRecord::empty(session_id),
            Err(RepositoryError::CorruptRecord(reason)) => {
                warn!(session_id, %reason, "Corrupt session record, starting empty");
                SessionRecord::empty(session_id)
            }
            Err(err) => {
                warn!(session_id, error = %err, "Failed to load session, starting empty");
                SessionRecord::empty(session_id)
            }
        };

        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(loaded)))
            .clone()
    }

    /// Append one message, trim to the cap, and persist before returning.
    pub async fn append(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), MemoryError> {
        let handle = self.get_or_create(session_id).await;
        let mut record = handle.lock().await;

        record.messages.push(StoredMessage {
            role,
            content: content.to_string(),
        });
        let len = record.messages.len();
        if len > self.max_messages {
            record.messages.drain(..len - self.max_messages);
        }
        record.last_updated = Utc::now();

        self.repo.save(&record).await?;
        Ok(())
    }

    /// The most recent `n` messages, oldest first.
    pub async fn recent(&self, session_id: &str, n: usize) -> Vec<StoredMessage> {
        let handle = self.get_or_create(session_id).await;
        let record = handle.lock().await;
        let start = record.messages.len().saturating_sub(n);
        record.messages[start..].to_vec()
    }

    /// Current number of stored messages for a session.
    pub async fn len(&self, session_id: &str) -> usize {
        let handle = self.get_or_create(session_id).await;
        handle.lock().await.messages.len()
    }

    /// Reset a session to an empty history and persist the empty record.
    pub async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        let handle = self.get_or_create(session_id).await;
        let mut record = handle.lock().await;
        record.messages.clear();
        record.last_updated = Utc::now();
        self.repo.save(&record).await?;
        Ok(())
    }

    /// A short human-readable summary of the recent conversation.
    pub async fn summary(&self, session_id: &str) -> String {
        let recent = self.recent(session_id, SUMMARY_WINDOW).await;
        if recent.is_empty() {
            return "No conversation history.".to_string();
        }

        let mut lines = vec![format!("Recent conversation ({} messages):", recent.len())];
        for msg in &recent {
            let who = match msg.role {
                MessageRole::User => "You",
                MessageRole::Assistant => "Assistant",
            };
            let preview: String = if msg.content.chars().count() > SUMMARY_PREVIEW_CHARS {
                let head: String = msg.content.chars().take(SUMMARY_PREVIEW_CHARS).collect();
                format!("{head}...")
            } else {
                msg.content.clone()
            };
            lines.push(format!("• {who}: {preview}"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    /// In-memory repository; `fail_load` simulates a corrupt stored record.
    #[derive(Default)]
    struct InMemoryRepo {
        records: StdMutex<HashMap<String, SessionRecord>>,
        fail_load: bool,
    }

    impl InMemoryRepo {
        fn corrupt() -> Self {
            Self {
                records: StdMutex::new(HashMap::new()),
                fail_load: true,
            }
        }
    }

    impl SessionRepository for InMemoryRepo {
        async fn load(&self, session_id: &str) -> Result<Option<SessionRecord>, RepositoryError> {
            if self.fail_load {
                return Err(RepositoryError::CorruptRecord("bad json".to_string()));
            }
            Ok(self.records.lock().unwrap().get(session_id).cloned())
        }

        async fn save(&self, record: &SessionRecord) -> Result<(), RepositoryError> {
            self.records
                .lock()
                .unwrap()
                .insert(record.session_id.clone(), record.clone());
            Ok(())
        }
    }

    fn store(cap: usize) -> SessionMemoryStore<InMemoryRepo> {
        SessionMemoryStore::new(InMemoryRepo::default(), cap)
    }

    #[tokio::test]
    async fn test_append_and_recent_order() {
        let store = store(20);
        store
            .append("s1", MessageRole::User, "first")
            .await
            .unwrap();
        store
            .append("s1", MessageRole::Assistant, "second")
            .await
            .unwrap();

        let recent = store.recent("s1", 10).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "first");
        assert_eq!(recent[1].content, "second");
    }

    #[tokio::test]
    async fn test_fifo_trim_keeps_most_recent_tail() {
        let cap = 5;
        let store = store(cap);
        for i in 0..12 {
            store
                .append("s1", MessageRole::User, &format!("msg-{i}"))
                .await
                .unwrap();
        }

        assert_eq!(store.len("s1").await, cap);
        let recent = store.recent("s1", cap).await;
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["msg-7", "msg-8", "msg-9", "msg-10", "msg-11"]);
    }

    #[tokio::test]
    async fn test_length_is_min_of_appends_and_cap() {
        let store = store(10);
        for i in 0..3 {
            store
                .append("s1", MessageRole::User, &format!("m{i}"))
                .await
                .unwrap();
        }
        assert_eq!(store.len("s1").await, 3);
    }

    #[tokio::test]
    async fn test_recent_caps_at_n() {
        let store = store(20);
        for i in 0..8 {
            store
                .append("s1", MessageRole::User, &format!("m{i}"))
                .await
                .unwrap();
        }
        let recent = store.recent("s1", 3).await;
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "m5");
        assert_eq!(recent[2].content, "m7");
    }

    #[tokio::test]
    async fn test_persist_then_reload_roundtrip() {
        let repo = InMemoryRepo::default();
        {
            let store = SessionMemoryStore::new(repo, 20);
            store.append("s1", MessageRole::User, "hello").await.unwrap();
            store
                .append("s1", MessageRole::Assistant, "hi there")
                .await
                .unwrap();

            // Simulate a restart: a fresh store over the same repository.
            let persisted = store.repo.records.lock().unwrap().clone();
            let fresh = SessionMemoryStore::new(
                InMemoryRepo {
                    records: StdMutex::new(persisted),
                    fail_load: false,
                },
                20,
            );
            let recent = fresh.recent("s1", 10).await;
            assert_eq!(recent.len(), 2);
            assert_eq!(recent[0].content, "hello");
            assert_eq!(recent[1].content, "hi there");
        }
    }

    #[tokio::test]
    async fn test_corrupt_record_fails_open() {
        let store = SessionMemoryStore::new(InMemoryRepo::corrupt(), 20);
        // Must not error; starts from empty.
        let recent = store.recent("s1", 10).await;
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_clear_resets_and_persists_empty() {
        let store = store(20);
        store.append("s1", MessageRole::User, "hello").await.unwrap();
        store.clear("s1").await.unwrap();

        assert_eq!(store.len("s1").await, 0);
        let persisted = store
            .repo
            .records
            .lock()
            .unwrap()
            .get("s1")
            .cloned()
            .unwrap();
        assert!(persisted.messages.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = store(20);
        store.append("a", MessageRole::User, "for a").await.unwrap();
        store.append("b", MessageRole::User, "for b").await.unwrap();

        assert_eq!(store.recent("a", 10).await[0].content, "for a");
        assert_eq!(store.recent("b", 10).await[0].content, "for b");
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_lose_updates() {
        let store = Arc::new(store(100));
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append("shared", MessageRole::User, &format!("m{i}"))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.len("shared").await, 20);
    }

    #[tokio::test]
    async fn test_summary_previews_recent_messages() {
        let store = store(20);
        assert_eq!(store.summary("s1").await, "No conversation history.");

        store
            .append("s1", MessageRole::User, "What events are happening this weekend in the city center?")
            .await
            .unwrap();
        store
            .append("s1", MessageRole::Assistant, "Three concerts and a food festival.")
            .await
            .unwrap();

        let summary = store.summary("s1").await;
        assert!(summary.contains("2 messages"));
        assert!(summary.contains("• You:"));
        assert!(summary.contains("• Assistant:"));
        // Long user message is truncated with an ellipsis.
        assert!(summary.contains("..."));
    }
}
