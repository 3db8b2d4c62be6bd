//! Conversation controller: the per-turn pipeline.
//!
//! history -> retrieval -> prompt assembly -> generation -> persistence.
//!
//! This is the system's outermost failure-containment point. A failure in
//! retrieval, prompting, or generation becomes a capped user-safe string
//! BEFORE persistence, so the session log always records a coherent
//! user/assistant pair and callers never see an error for a well-formed
//! request.

use tracing::warn;

use hubbub_types::chat::MessageRole;
use hubbub_types::retrieval::{RetrievalMode, RetrievalSource};

use crate::events::client::EventSearchClient;
use crate::llm::failover::GenerationProvider;
use crate::memory::repository::SessionRepository;
use crate::memory::store::SessionMemoryStore;
use crate::retrieval::orchestrator::RetrievalOrchestrator;
use crate::retrieval::source::KnowledgeRetriever;

use super::prompt::PromptBuilder;

/// Error-detail cap in user-safe replies.
const ERROR_PREVIEW_CHARS: usize = 100;

/// The outcome of one chat turn.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: String,
    pub sources_used: Vec<RetrievalSource>,
}

/// Errors from the blocking convenience wrapper.
#[derive(Debug, thiserror::Error)]
pub enum BlockingCallError {
    #[error(
        "respond_blocking called from within an async runtime; use respond() on the request path"
    )]
    InsideRuntime,

    #[error("failed to build blocking runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Drives one chat turn end to end.
pub struct ConversationController<R, K, E, P>
where
    R: SessionRepository,
    K: KnowledgeRetriever,
    E: EventSearchClient,
    P: PromptBuilder,
{
    memory: SessionMemoryStore<R>,
    orchestrator: RetrievalOrchestrator<K, E>,
    generation: GenerationProvider,
    prompts: P,
    history_window: usize,
    chunks_per_query: usize,
}

impl<R, K, E, P> ConversationController<R, K, E, P>
where
    R: SessionRepository,
    K: KnowledgeRetriever,
    E: EventSearchClient,
    P: PromptBuilder,
{
    pub fn new(
        memory: SessionMemoryStore<R>,
        orchestrator: RetrievalOrchestrator<K, E>,
        generation: GenerationProvider,
        prompts: P,
    ) -> Self {
        Self {
            memory,
            orchestrator,
            generation,
            prompts,
            history_window: 6,
            chunks_per_query: 3,
        }
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_chunks_per_query(mut self, n: usize) -> Self {
        self.chunks_per_query = n;
        self
    }

    /// The session memory store (for session inspection endpoints/commands).
    pub fn memory(&self) -> &SessionMemoryStore<R> {
        &self.memory
    }

    /// The retrieval orchestrator (for direct context queries).
    pub fn orchestrator(&self) -> &RetrievalOrchestrator<K, E> {
        &self.orchestrator
    }

    /// Run one chat turn. Never returns an error: degraded replies and
    /// contained failures are normal outcomes.
    pub async fn respond(
        &self,
        session_id: &str,
        input: &str,
        mode: RetrievalMode,
    ) -> ChatOutcome {
        let (reply, sources_used) = match self.run_turn(session_id, input, mode).await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(session_id, error = %err, "Turn failed, serving contained reply");
                (user_safe_error(&err.to_string()), Vec::new())
            }
        };

        // Always both turns, always user first, even after a failure above.
        if let Err(err) = self.memory.append(session_id, MessageRole::User, input).await {
            warn!(session_id, error = %err, "Failed to persist user turn");
        }
        if let Err(err) = self
            .memory
            .append(session_id, MessageRole::Assistant, &reply)
            .await
        {
            warn!(session_id, error = %err, "Failed to persist assistant turn");
        }

        ChatOutcome {
            reply,
            sources_used,
        }
    }

    async fn run_turn(
        &self,
        session_id: &str,
        input: &str,
        mode: RetrievalMode,
    ) -> Result<(String, Vec<RetrievalSource>), hubbub_types::error::MemoryError> {
        let history = self.memory.recent(session_id, self.history_window).await;

        let context = self
            .orchestrator
            .retrieve(mode, input, self.chunks_per_query)
            .await;

        let messages = self.prompts.build(&context.text, &history, input);
        let reply = self.generation.invoke(messages).await;

        Ok((reply.text, context.sources_used))
    }

    /// Blocking variant for tooling contexts only (tests, offline scripts).
    ///
    /// Fails fast when called from inside a Tokio runtime instead of
    /// nesting a second scheduler; the request path must use [`respond`].
    ///
    /// [`respond`]: Self::respond
    pub fn respond_blocking(
        &self,
        session_id: &str,
        input: &str,
        mode: RetrievalMode,
    ) -> Result<ChatOutcome, BlockingCallError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(BlockingCallError::InsideRuntime);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.respond(session_id, input, mode)))
    }
}

/// Cap error detail to the first 100 characters and wrap it in the
/// user-facing apology.
fn user_safe_error(detail: &str) -> String {
    let preview: String = detail.chars().take(ERROR_PREVIEW_CHARS).collect();
    format!("I encountered an error: {preview}. Please try again.")
}
