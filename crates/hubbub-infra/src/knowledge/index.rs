//! The local knowledge index: embedder plus chunk store behind the
//! [`KnowledgeRetriever`] capability.

use std::path::PathBuf;

use tracing::info;

use hubbub_core::retrieval::source::KnowledgeRetriever;
use hubbub_types::error::RepositoryError;

use super::embedder::LocalEmbedder;
use super::lance::LanceChunkStore;

/// LanceDB + fastembed implementation of [`KnowledgeRetriever`].
pub struct LanceKnowledgeIndex {
    store: LanceChunkStore,
    embedder: LocalEmbedder,
}

impl LanceKnowledgeIndex {
    /// Open (or create) the index at `{path}`.
    ///
    /// Loads the embedding model eagerly so a broken model surfaces at
    /// startup, where the caller can degrade the local source, not
    /// mid-request.
    pub async fn open(path: PathBuf) -> anyhow::Result<Self> {
        let embedder = LocalEmbedder::new()?;
        let store = LanceChunkStore::open(path).await?;
        Ok(Self { store, embedder })
    }

    /// Embed and index document chunks. Returns how many were added.
    pub async fn index_documents(&self, texts: Vec<String>) -> Result<usize, RepositoryError> {
        if texts.is_empty() {
            return Ok(0);
        }
        let embeddings = self.embedder.embed(texts.clone()).await?;
        self.store.add_chunks(&texts, &embeddings).await?;
        info!(count = texts.len(), "Indexed document chunks");
        Ok(texts.len())
    }

    /// Total indexed chunks.
    pub async fn count(&self) -> Result<usize, RepositoryError> {
        self.store.count().await
    }
}

impl KnowledgeRetriever for LanceKnowledgeIndex {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        let embeddings = self.embedder.embed(vec![query.to_string()]).await?;
        let embedding = embeddings
            .first()
            .ok_or_else(|| RepositoryError::Query("embedder returned no vector".to_string()))?;
        self.store.search(embedding, k).await
    }
}
