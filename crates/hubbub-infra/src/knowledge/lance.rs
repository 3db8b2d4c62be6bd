//! LanceDB-backed document chunk store.
//!
//! One `knowledge_chunks` table holds the indexed text chunks with their
//! 384-dimensional embeddings. Search is cosine-distance nearest-neighbor
//! through LanceDB; this module never computes similarity itself.

use std::path::PathBuf;
use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use uuid::Uuid;

use hubbub_types::error::RepositoryError;

use super::embedder::LocalEmbedder;

/// Embedding dimension of the chunk vectors.
pub const EMBEDDING_DIMENSION: i32 = LocalEmbedder::DIMENSION as i32;

const TABLE_NAME: &str = "knowledge_chunks";

/// Arrow schema of the chunk table.
fn chunk_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIMENSION,
            ),
            true,
        ),
    ])
}

/// LanceDB connection plus the chunk table lifecycle.
pub struct LanceChunkStore {
    db: lancedb::Connection,
}

impl LanceChunkStore {
    /// Open or create the store at the given path.
    pub async fn open(base_path: PathBuf) -> Result<Self, lancedb::Error> {
        std::fs::create_dir_all(&base_path).map_err(|e| lancedb::Error::CreateDir {
            path: base_path.display().to_string(),
            source: e,
        })?;

        let uri = base_path
            .to_str()
            .ok_or_else(|| lancedb::Error::InvalidInput {
                message: format!("Path contains invalid UTF-8: {}", base_path.display()),
            })?;

        let db = lancedb::connect(uri).execute().await?;
        Ok(Self { db })
    }

    /// Open the chunk table, creating it empty when missing.
    async fn ensure_table(&self) -> Result<lancedb::Table, RepositoryError> {
        match self.db.open_table(TABLE_NAME).execute().await {
            Ok(table) => Ok(table),
            Err(lancedb::Error::TableNotFound { .. }) => self
                .db
                .create_empty_table(TABLE_NAME, Arc::new(chunk_schema()))
                .execute()
                .await
                .map_err(|e| RepositoryError::Query(format!("failed to create chunk table: {e}"))),
            Err(e) => Err(RepositoryError::Query(format!(
                "failed to open chunk table: {e}"
            ))),
        }
    }

    /// Add chunks with their embeddings (one embedding per chunk).
    pub async fn add_chunks(
        &self,
        texts: &[String],
        embeddings: &[Vec<f32>],
    ) -> Result<(), RepositoryError> {
        if texts.is_empty() {
            return Ok(());
        }
        if texts.len() != embeddings.len() {
            return Err(RepositoryError::Query(format!(
                "chunk/embedding count mismatch: {} vs {}",
                texts.len(),
                embeddings.len()
            )));
        }

        let table = self.ensure_table().await?;

        let ids: Vec<String> = texts.iter().map(|_| Uuid::now_v7().to_string()).collect();
        let id_array = StringArray::from(ids);
        let text_array = StringArray::from(texts.to_vec());

        let flat: Vec<f32> = embeddings.iter().flatten().copied().collect();
        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vector_array = FixedSizeListArray::new(
            field,
            EMBEDDING_DIMENSION,
            Arc::new(Float32Array::from(flat)),
            None,
        );

        let schema = Arc::new(chunk_schema());
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(id_array),
                Arc::new(text_array),
                Arc::new(vector_array),
            ],
        )
        .map_err(|e| RepositoryError::Query(format!("failed to build record batch: {e}")))?;

        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to add chunks: {e}")))?;

        Ok(())
    }

    /// The `k` nearest chunk texts to the query embedding, best first.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        let table = self.ensure_table().await?;

        let results = table
            .vector_search(query_embedding)
            .map_err(|e| RepositoryError::Query(format!("vector search setup failed: {e}")))?
            .distance_type(lancedb::DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("vector search failed: {e}")))?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to collect results: {e}")))?;

        let mut chunks = Vec::new();
        for batch in &batches {
            let text_col = batch
                .column_by_name("text")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| {
                    RepositoryError::Query("text column missing from search result".to_string())
                })?;
            for i in 0..batch.num_rows() {
                chunks.push(text_col.value(i).to_string());
            }
        }

        Ok(chunks)
    }

    /// Total chunks in the index.
    pub async fn count(&self) -> Result<usize, RepositoryError> {
        let table = self.ensure_table().await?;
        table
            .count_rows(None)
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to count chunks: {e}")))
    }
}
