//! Retrieval capability traits.
//!
//! `ContextSource` is the one shape the conversation controller talks to:
//! both the bare knowledge index adapter and the full orchestrator
//! implement it, so either can be plugged into the pipeline.

use hubbub_types::error::RepositoryError;

/// Anything that can turn a query into prompt-ready context text.
///
/// Implementations are fail-soft: they return sentinel strings rather
/// than errors, so the request pipeline never has to unwind.
pub trait ContextSource: Send + Sync {
    /// Formatted context for a query, fetching up to `n` items.
    fn formatted_context(
        &self,
        query: &str,
        n: usize,
    ) -> impl std::future::Future<Output = String> + Send;
}

/// Vector similarity backend for the local knowledge base.
///
/// Consumed, not specified: implementations (LanceDB + fastembed in
/// hubbub-infra, plain mocks in tests) own the index format and the
/// similarity math.
pub trait KnowledgeRetriever: Send + Sync {
    /// The `k` most similar text chunks for a query, best first.
    fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;
}

/// Shared handles delegate, so the same index can back the orchestrator
/// and the indexing tooling.
impl<T: KnowledgeRetriever> KnowledgeRetriever for std::sync::Arc<T> {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<String>, RepositoryError> {
        (**self).similarity_search(query, k).await
    }
}
