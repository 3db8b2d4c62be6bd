//! Business logic for Hubbub: session memory, retrieval orchestration,
//! generation failover, and the per-turn conversation pipeline.
//!
//! This crate defines capability traits (RPITIT) at every I/O seam --
//! [`memory::repository::SessionRepository`],
//! [`retrieval::source::KnowledgeRetriever`],
//! [`events::client::EventSearchClient`], [`llm::provider::LlmProvider`] --
//! and the concrete backends live in `hubbub-infra`.

pub mod chat;
pub mod events;
pub mod llm;
pub mod memory;
pub mod retrieval;
