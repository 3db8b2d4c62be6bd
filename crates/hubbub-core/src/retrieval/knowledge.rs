//! Local knowledge base context: chunk formatting and the
//! [`ContextSource`] adapter over a [`KnowledgeRetriever`].

use tracing::warn;

use hubbub_types::error::RepositoryError;

use super::source::{ContextSource, KnowledgeRetriever};

/// Fixed sentinel for a successful search with no relevant chunks.
pub const NO_LOCAL_CONTEXT: &str = "No relevant context found.";

/// Format retrieved chunks as a numbered block.
pub fn format_chunks(chunks: &[String]) -> String {
    if chunks.is_empty() {
        return NO_LOCAL_CONTEXT.to_string();
    }

    let mut out = String::from("Relevant information:\n");
    for (i, chunk) in chunks.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, chunk.trim()));
    }
    out.trim_end().to_string()
}

/// [`ContextSource`] adapter for a bare knowledge retriever.
///
/// Lets the controller run against the knowledge base alone, without the
/// orchestrator, through the same capability shape.
pub struct KnowledgeContext<K: KnowledgeRetriever> {
    retriever: K,
}

impl<K: KnowledgeRetriever> KnowledgeContext<K> {
    pub fn new(retriever: K) -> Self {
        Self { retriever }
    }

    /// Raw chunk retrieval; errors are logged and flattened to empty.
    pub async fn retrieve(&self, query: &str, n: usize) -> Vec<String> {
        match self.retriever.similarity_search(query, n).await {
            Ok(chunks) => chunks,
            Err(err) => {
                warn!(error = %err, "Knowledge retrieval failed");
                Vec::new()
            }
        }
    }
}

impl<K: KnowledgeRetriever> ContextSource for KnowledgeContext<K> {
    async fn formatted_context(&self, query: &str, n: usize) -> String {
        format_chunks(&self.retrieve(query, n).await)
    }
}
