//! HTTP client for the remote event-search service.

pub mod http;
