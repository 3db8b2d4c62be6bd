//! FastEmbed-based local embedding generator.
//!
//! Wraps fastembed's BGESmallENV15 model (384 dimensions, ONNX runtime
//! inference). Model inference is CPU-bound and blocking, so calls run
//! on the blocking thread pool behind a mutex.

use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use hubbub_types::error::RepositoryError;

/// Local text embedder.
pub struct LocalEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl LocalEmbedder {
    /// Output dimensionality of BGESmallENV15.
    pub const DIMENSION: usize = 384;

    /// Load the embedding model (downloads on first use, then cached).
    pub fn new() -> anyhow::Result<Self> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::BGESmallENV15).with_show_download_progress(false),
        )?;
        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }

    /// Embed texts into vectors, one per input.
    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RepositoryError> {
        let model = self.model.clone();
        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| RepositoryError::Query("embedding model lock poisoned".to_string()))?;
            model
                .embed(texts, None)
                .map_err(|e| RepositoryError::Query(format!("embedding failed: {e}")))
        })
        .await
        .map_err(|e| RepositoryError::Query(format!("embedding task failed: {e}")))?
    }
}
