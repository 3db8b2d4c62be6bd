//! Retrieval orchestrator: combines the local knowledge base and the
//! remote event search under independent failure.
//!
//! Invariant: failure of one source never suppresses a successful result
//! from the other. In combined mode both sources are queried concurrently
//! and each contributes a labeled block only when it produced non-empty
//! content; `sources_used` reflects contribution, not attempts.

use tracing::{debug, warn};

use hubbub_types::error::EventServiceError;
use hubbub_types::event::ServiceHealth;
use hubbub_types::retrieval::{
    RetrievalMode, RetrievalResult, RetrievalSource, RetrievedContext, SourceOutcome,
};

use crate::events::client::EventSearchClient;
use crate::events::format::format_events;

use super::knowledge::format_chunks;
use super::source::{ContextSource, KnowledgeRetriever};

/// Fixed string when the local knowledge base cannot be consulted.
pub const KNOWLEDGE_UNAVAILABLE: &str = "Local knowledge base is not available.";

/// Fixed string when the event service is down or unhealthy.
pub const EVENTS_UNAVAILABLE: &str = "Event search service is not available.";

/// Fixed sentinel when no source produced any content in combined mode.
///
/// Deliberately distinct from each source's own empty-result sentinel.
pub const NO_CONTEXT_ANY_SOURCE: &str = "No relevant context found from any source.";

/// Visible separator between source blocks in combined output.
pub const BLOCK_SEPARATOR: &str =
    "\n\n──────────────────────────────────────────────────\n\n";

const KNOWLEDGE_LABEL: &str = "📚 **Knowledge Base:**";
const EVENTS_LABEL: &str = "🎉 **Current Events:**";

/// Combines local and remote retrieval by selectable mode.
///
/// `local` is `None` when the knowledge index failed to initialize at
/// startup; that degrades the local source to permanently unavailable
/// without taking the rest of the pipeline down.
pub struct RetrievalOrchestrator<K: KnowledgeRetriever, E: EventSearchClient> {
    local: Option<K>,
    events: E,
    user_id: String,
}

impl<K: KnowledgeRetriever, E: EventSearchClient> RetrievalOrchestrator<K, E> {
    pub fn new(local: Option<K>, events: E) -> Self {
        Self {
            local,
            events,
            user_id: "default".to_string(),
        }
    }

    /// Override the user id forwarded to event searches.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Retrieve context for a query under the given mode.
    pub async fn retrieve(
        &self,
        mode: RetrievalMode,
        query: &str,
        n: usize,
    ) -> RetrievedContext {
        match mode {
            RetrievalMode::None => RetrievedContext::empty(),
            RetrievalMode::Local => self.local_only(query, n).await,
            RetrievalMode::Events => self.events_only(query).await,
            RetrievalMode::Combined => self.combined(query, n).await,
        }
    }

    async fn local_only(&self, query: &str, n: usize) -> RetrievedContext {
        match self.consult_local(query, n).await.outcome {
            SourceOutcome::Content(text) => RetrievedContext {
                text,
                sources_used: vec![RetrievalSource::KnowledgeBase],
            },
            SourceOutcome::Empty => RetrievedContext {
                text: format_chunks(&[]),
                sources_used: Vec::new(),
            },
            SourceOutcome::Unavailable(_) => RetrievedContext {
                text: KNOWLEDGE_UNAVAILABLE.to_string(),
                sources_used: Vec::new(),
            },
        }
    }

    async fn events_only(&self, query: &str) -> RetrievedContext {
        if !self.events.health_check().await.is_healthy() {
            return RetrievedContext {
                text: EVENTS_UNAVAILABLE.to_string(),
                sources_used: Vec::new(),
            };
        }

        match self.events.search(query, &self.user_id).await {
            Ok(result) => {
                let text = format_events(&result);
                let sources_used = if result.events.is_empty() {
                    Vec::new()
                } else {
                    vec![RetrievalSource::CurrentEvents]
                };
                RetrievedContext { text, sources_used }
            }
            Err(err) => RetrievedContext {
                text: format!("Error retrieving events: {err}"),
                sources_used: Vec::new(),
            },
        }
    }

    async fn combined(&self, query: &str, n: usize) -> RetrievedContext {
        // Concurrent fan-out; neither call can block or corrupt the other.
        let (local, events) = tokio::join!(self.consult_local(query, n), self.consult_events(query));

        let mut blocks = Vec::new();
        let mut sources_used = Vec::new();

        for result in [local, events] {
            match result.outcome {
                SourceOutcome::Content(text) => {
                    let label = match result.source {
                        RetrievalSource::KnowledgeBase => KNOWLEDGE_LABEL,
                        RetrievalSource::CurrentEvents => EVENTS_LABEL,
                    };
                    blocks.push(format!("{label}\n{text}"));
                    sources_used.push(result.source);
                }
                SourceOutcome::Empty => {
                    debug!(source = %result.source, "Source returned no content");
                }
                SourceOutcome::Unavailable(reason) => {
                    warn!(source = %result.source, %reason, "Source unavailable, skipping");
                }
            }
        }

        if blocks.is_empty() {
            return RetrievedContext {
                text: NO_CONTEXT_ANY_SOURCE.to_string(),
                sources_used: Vec::new(),
            };
        }

        RetrievedContext {
            text: blocks.join(BLOCK_SEPARATOR),
            sources_used,
        }
    }

    async fn consult_local(&self, query: &str, n: usize) -> RetrievalResult {
        let source = RetrievalSource::KnowledgeBase;
        let Some(retriever) = &self.local else {
            return RetrievalResult {
                source,
                outcome: SourceOutcome::Unavailable("retriever not initialized".to_string()),
            };
        };

        let outcome = match retriever.similarity_search(query, n).await {
            Ok(chunks) if chunks.is_empty() => SourceOutcome::Empty,
            Ok(chunks) => SourceOutcome::Content(format_chunks(&chunks)),
            Err(err) => SourceOutcome::Unavailable(err.to_string()),
        };
        RetrievalResult { source, outcome }
    }

    async fn consult_events(&self, query: &str) -> RetrievalResult {
        let source = RetrievalSource::CurrentEvents;
        match self.events.health_check().await {
            ServiceHealth::Unhealthy => {
                return RetrievalResult {
                    source,
                    outcome: SourceOutcome::Unavailable("health probe failed".to_string()),
                };
            }
            ServiceHealth::Healthy => {}
        }

        let outcome = match self.events.search(query, &self.user_id).await {
            Ok(result) if result.events.is_empty() => SourceOutcome::Empty,
            Ok(result) => SourceOutcome::Content(format_events(&result)),
            Err(err) => SourceOutcome::Unavailable(err.to_string()),
        };
        RetrievalResult { source, outcome }
    }
}

/// The orchestrator itself is a [`ContextSource`]: plugging it into the
/// controller yields combined-mode retrieval.
impl<K: KnowledgeRetriever, E: EventSearchClient> ContextSource for RetrievalOrchestrator<K, E> {
    async fn formatted_context(&self, query: &str, n: usize) -> String {
        self.combined(query, n).await.text
    }
}
