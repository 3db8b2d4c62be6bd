//! Infrastructure backends for Hubbub.
//!
//! Concrete implementations of the capability traits defined in
//! `hubbub-core`: SQLite session persistence, the HTTP event-service
//! client, OpenAI-compatible LLM providers, and the LanceDB knowledge
//! index.

pub mod config;
pub mod events;
pub mod knowledge;
pub mod llm;
pub mod sqlite;
