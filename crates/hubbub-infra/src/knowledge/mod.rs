//! Local knowledge index: LanceDB chunk storage with fastembed embeddings.

pub mod embedder;
pub mod index;
pub mod lance;
