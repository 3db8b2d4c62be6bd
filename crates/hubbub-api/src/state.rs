//! Application state wiring all services together.
//!
//! AppState pins the generic core components to their concrete infra
//! implementations and is shared by the CLI commands and the REST API.
//! The session registry (id -> per-session lock) lives inside the
//! memory store; there is no ambient global state.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use hubbub_core::chat::controller::ConversationController;
use hubbub_core::chat::prompt::EventAssistantPrompt;
use hubbub_core::llm::box_provider::BoxLlmProvider;
use hubbub_core::llm::failover::GenerationProvider;
use hubbub_core::memory::store::SessionMemoryStore;
use hubbub_core::retrieval::orchestrator::RetrievalOrchestrator;
use hubbub_infra::config::{load_config, load_credentials, resolve_data_dir, resolve_events_url};
use hubbub_infra::events::http::HttpEventClient;
use hubbub_infra::knowledge::index::LanceKnowledgeIndex;
use hubbub_infra::llm::openai_compat::OpenAiCompatProvider;
use hubbub_infra::sqlite::pool::{database_url, DatabasePool};
use hubbub_infra::sqlite::session::SqliteSessionRepository;
use hubbub_types::config::HubbubConfig;

/// The controller generic parameters pinned to infra implementations.
pub type ConcreteController = ConversationController<
    SqliteSessionRepository,
    Arc<LanceKnowledgeIndex>,
    Arc<HttpEventClient>,
    EventAssistantPrompt,
>;

/// Shared application state for CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ConcreteController>,
    pub events: Arc<HttpEventClient>,
    pub knowledge: Option<Arc<LanceKnowledgeIndex>>,
    pub config: HubbubConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: config, credentials, database,
    /// clients, providers, controller.
    ///
    /// A missing primary credential is fatal. A broken knowledge index is
    /// not: the local source degrades to unavailable and everything else
    /// keeps serving.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let credentials = load_credentials()?;

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let memory = SessionMemoryStore::new(
            SqliteSessionRepository::new(db_pool),
            config.memory.max_messages,
        );

        let events = Arc::new(HttpEventClient::new(
            &config.events,
            resolve_events_url(&config),
        ));

        let knowledge = match LanceKnowledgeIndex::open(data_dir.join("knowledge")).await {
            Ok(index) => Some(Arc::new(index)),
            Err(err) => {
                warn!(error = %err, "Knowledge index unavailable, local retrieval disabled");
                None
            }
        };

        let orchestrator = RetrievalOrchestrator::new(knowledge.clone(), events.clone());

        let primary = BoxLlmProvider::new(OpenAiCompatProvider::gemini(
            &credentials.gemini_api_key,
            &config.generation.primary_model,
        ));
        let backup = credentials.groq_api_key.as_ref().map(|key| {
            BoxLlmProvider::new(OpenAiCompatProvider::groq(
                key,
                &config.generation.backup_model,
            ))
        });
        let generation = GenerationProvider::new(primary, backup)
            .with_limits(config.generation.max_tokens, config.generation.temperature);
        tracing::info!(
            primary = generation.primary_name(),
            backup = generation.backup_configured(),
            "Generation providers configured"
        );

        let controller = ConversationController::new(
            memory,
            orchestrator,
            generation,
            EventAssistantPrompt,
        )
        .with_history_window(config.memory.history_window)
        .with_chunks_per_query(config.knowledge.chunks_per_query);

        Ok(Self {
            controller: Arc::new(controller),
            events,
            knowledge,
            config,
            data_dir,
        })
    }
}
