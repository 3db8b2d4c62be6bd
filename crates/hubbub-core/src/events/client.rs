//! EventSearchClient trait definition.
//!
//! Wire-level access to the remote event-search service. The HTTP
//! implementation (structured tool-call path with direct fallback) lives
//! in hubbub-infra. Uses native async fn in traits (RPITIT, Rust 2024
//! edition).

use hubbub_types::error::EventServiceError;
use hubbub_types::event::{EventCatalog, EventSearchResult, ServiceHealth};

/// Client for the remote event-search service.
///
/// All operations return typed errors as values; implementations must not
/// panic on wire failures. Which wire path served a call is invisible to
/// callers.
pub trait EventSearchClient: Send + Sync {
    /// Search events with a natural-language query on behalf of a user.
    fn search(
        &self,
        query: &str,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<EventSearchResult, EventServiceError>> + Send;

    /// Fetch the full event catalog.
    fn get_all(
        &self,
    ) -> impl std::future::Future<Output = Result<EventCatalog, EventServiceError>> + Send;

    /// Probe service health. Infallible: any probe failure is `Unhealthy`.
    fn health_check(
        &self,
    ) -> impl std::future::Future<Output = ServiceHealth> + Send;
}

/// Shared handles delegate, so one client instance (and its health cache)
/// can serve both the orchestrator and the transport layer.
impl<T: EventSearchClient> EventSearchClient for std::sync::Arc<T> {
    async fn search(
        &self,
        query: &str,
        user_id: &str,
    ) -> Result<EventSearchResult, EventServiceError> {
        (**self).search(query, user_id).await
    }

    async fn get_all(&self) -> Result<EventCatalog, EventServiceError> {
        (**self).get_all().await
    }

    async fn health_check(&self) -> ServiceHealth {
        (**self).health_check().await
    }
}
