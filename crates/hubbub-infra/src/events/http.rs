//! HTTP implementation of `EventSearchClient`.
//!
//! Two wire paths serve the same logical operations:
//!
//! - **Structured path**: `POST {base_url}/mcp/tools/call` with a JSON-RPC
//!   tool-invocation envelope. The actual payload arrives as a JSON string
//!   nested at `result.content[0].text` and must be unwrapped.
//! - **Direct path**: `POST {base_url}/search`, a plain request/response
//!   call whose shape is normalized into the same canonical result.
//!
//! The structured path is attempted first; ANY failure there (connect
//! error, non-2xx, RPC error object, missing or unparseable content)
//! falls back to the direct path. Callers never observe which path
//! succeeded. Timeouts count as ordinary failures.
//!
//! Health probes (`GET {base_url}/`) are cached for a few seconds so a
//! burst of requests costs one probe while an outage is still noticed
//! quickly.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use hubbub_core::events::client::EventSearchClient;
use hubbub_types::config::EventServiceConfig;
use hubbub_types::error::EventServiceError;
use hubbub_types::event::{EventCatalog, EventRecord, EventSearchResult, ServiceHealth};

/// Tool names exposed by the structured path.
const SEARCH_TOOL: &str = "search_events";
const GET_ALL_TOOL: &str = "get_all_events";

/// HTTP client for the remote event-search service.
pub struct HttpEventClient {
    http: reqwest::Client,
    base_url: String,
    search_timeout: Duration,
    health_timeout: Duration,
    health_cache_ttl: Duration,
    health_cache: Mutex<Option<(Instant, ServiceHealth)>>,
}

impl HttpEventClient {
    pub fn new(config: &EventServiceConfig, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            search_timeout: Duration::from_secs(config.search_timeout_secs),
            health_timeout: Duration::from_secs(config.health_timeout_secs),
            health_cache_ttl: Duration::from_secs(config.health_cache_secs),
            health_cache: Mutex::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Invoke a named tool via the structured path and unwrap the nested
    /// payload.
    async fn call_tool<T: DeserializeOwned>(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<T, EventServiceError> {
        let envelope = ToolCallEnvelope {
            jsonrpc: "2.0",
            id: 1,
            method: "tools/call",
            params: ToolCallParams { name, arguments },
        };

        let response = self
            .http
            .post(self.url("/mcp/tools/call"))
            .timeout(self.search_timeout)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| EventServiceError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EventServiceError::Protocol(format!(
                "tool call returned HTTP {status}"
            )));
        }

        let body: ToolCallResponse = response
            .json()
            .await
            .map_err(|e| EventServiceError::Protocol(format!("invalid tool response: {e}")))?;

        if let Some(error) = body.error {
            return Err(EventServiceError::Service(error.to_string()));
        }

        let text = body
            .result
            .and_then(|r| r.content.into_iter().next())
            .and_then(|c| c.text)
            .ok_or_else(|| {
                EventServiceError::Protocol("tool response has no content".to_string())
            })?;

        serde_json::from_str(&text)
            .map_err(|e| EventServiceError::Protocol(format!("invalid nested payload: {e}")))
    }

    /// The direct `/search` endpoint, normalized into the canonical shape.
    async fn direct_search(
        &self,
        query: &str,
        user_id: &str,
    ) -> Result<EventSearchResult, EventServiceError> {
        let response = self
            .http
            .post(self.url("/search"))
            .timeout(self.search_timeout)
            .json(&DirectSearchRequest { query, user_id })
            .send()
            .await
            .map_err(|e| EventServiceError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EventServiceError::Protocol(format!(
                "search returned HTTP {status}"
            )));
        }

        let body: DirectSearchResponse = response
            .json()
            .await
            .map_err(|e| EventServiceError::Protocol(format!("invalid search response: {e}")))?;

        Ok(EventSearchResult {
            query: query.to_string(),
            results_count: body.results.len(),
            events: body.results,
        })
    }

    /// The direct `/events` endpoint, normalized into a catalog.
    async fn direct_get_all(&self) -> Result<EventCatalog, EventServiceError> {
        let response = self
            .http
            .get(self.url("/events"))
            .timeout(self.search_timeout)
            .send()
            .await
            .map_err(|e| EventServiceError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EventServiceError::Protocol(format!(
                "events returned HTTP {status}"
            )));
        }

        let mut catalog: EventCatalog = response
            .json()
            .await
            .map_err(|e| EventServiceError::Protocol(format!("invalid events response: {e}")))?;

        if catalog.total_events == 0 {
            catalog.total_events = catalog.events.len();
        }
        Ok(catalog)
    }

    async fn probe_health(&self) -> ServiceHealth {
        let result = self
            .http
            .get(self.url("/"))
            .timeout(self.health_timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => ServiceHealth::Healthy,
            Ok(response) => {
                debug!(status = %response.status(), "Health probe returned non-success");
                ServiceHealth::Unhealthy
            }
            Err(err) => {
                debug!(error = %err, "Health probe failed");
                ServiceHealth::Unhealthy
            }
        }
    }
}

impl EventSearchClient for HttpEventClient {
    async fn search(
        &self,
        query: &str,
        user_id: &str,
    ) -> Result<EventSearchResult, EventServiceError> {
        let structured_err = match self
            .call_tool::<EventSearchResult>(
                SEARCH_TOOL,
                serde_json::json!({ "query": query, "user_id": user_id }),
            )
            .await
        {
            Ok(mut result) => {
                if result.query.is_empty() {
                    result.query = query.to_string();
                }
                return Ok(result);
            }
            Err(err) => err,
        };

        debug!(error = %structured_err, "Structured search failed, falling back to direct path");

        self.direct_search(query, user_id).await.map_err(|direct_err| {
            warn!(
                structured = %structured_err,
                direct = %direct_err,
                "Both event search paths failed"
            );
            EventServiceError::Unreachable(format!(
                "event search failed on both paths (structured: {structured_err}; direct: {direct_err})"
            ))
        })
    }

    async fn get_all(&self) -> Result<EventCatalog, EventServiceError> {
        let structured_err = match self
            .call_tool::<EventCatalog>(GET_ALL_TOOL, serde_json::json!({}))
            .await
        {
            Ok(mut catalog) => {
                if catalog.total_events == 0 {
                    catalog.total_events = catalog.events.len();
                }
                return Ok(catalog);
            }
            Err(err) => err,
        };

        debug!(error = %structured_err, "Structured get_all failed, falling back to direct path");

        self.direct_get_all().await.map_err(|direct_err| {
            EventServiceError::Unreachable(format!(
                "event catalog failed on both paths (structured: {structured_err}; direct: {direct_err})"
            ))
        })
    }

    async fn health_check(&self) -> ServiceHealth {
        let mut cache = self.health_cache.lock().await;
        if let Some((at, health)) = *cache {
            if at.elapsed() < self.health_cache_ttl {
                return health;
            }
        }

        let health = self.probe_health().await;
        *cache = Some((Instant::now(), health));
        health
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ToolCallEnvelope<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: ToolCallParams<'a>,
}

#[derive(Serialize)]
struct ToolCallParams<'a> {
    name: &'a str,
    arguments: serde_json::Value,
}

#[derive(Deserialize)]
struct ToolCallResponse {
    #[serde(default)]
    result: Option<ToolCallResult>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ToolCallResult {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct DirectSearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "userId")]
    user_id: &'a str,
}

#[derive(Deserialize)]
struct DirectSearchResponse {
    #[serde(default)]
    results: Vec<EventRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    // --- Loopback mock of the remote event service ---

    #[derive(Clone, Copy)]
    enum StructuredMode {
        Ok,
        Http500,
        EmptyContent,
        RpcError,
    }

    struct MockService {
        structured: StructuredMode,
        direct_ok: bool,
        healthy: bool,
        structured_hits: AtomicUsize,
        direct_hits: AtomicUsize,
        health_hits: AtomicUsize,
    }

    impl MockService {
        fn new(structured: StructuredMode, direct_ok: bool, healthy: bool) -> Arc<Self> {
            Arc::new(Self {
                structured,
                direct_ok,
                healthy,
                structured_hits: AtomicUsize::new(0),
                direct_hits: AtomicUsize::new(0),
                health_hits: AtomicUsize::new(0),
            })
        }
    }

    async fn tool_call(State(svc): State<Arc<MockService>>) -> (StatusCode, Json<serde_json::Value>) {
        svc.structured_hits.fetch_add(1, Ordering::SeqCst);
        match svc.structured {
            StructuredMode::Ok => {
                let payload = serde_json::json!({
                    "query": "music",
                    "results_count": 2,
                    "events": [
                        {"title": "Jazz Night", "isFree": true},
                        {"title": "Rock Fest", "price": 30.0}
                    ]
                });
                let body = serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "content": [{"type": "text", "text": payload.to_string()}]
                    }
                });
                (StatusCode::OK, Json(body))
            }
            StructuredMode::Http500 => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"detail": "boom"})),
            ),
            StructuredMode::EmptyContent => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {"content": []}
                })),
            ),
            StructuredMode::RpcError => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": {"code": -32000, "message": "tool exploded"}
                })),
            ),
        }
    }

    async fn direct_search(
        State(svc): State<Arc<MockService>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        svc.direct_hits.fetch_add(1, Ordering::SeqCst);
        if svc.direct_ok {
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "results": [{"title": "Direct Event", "location": "Main Square"}]
                })),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"detail": "down"})),
            )
        }
    }

    async fn direct_events(
        State(svc): State<Arc<MockService>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        svc.direct_hits.fetch_add(1, Ordering::SeqCst);
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "events": [{"title": "Catalog Event"}]
            })),
        )
    }

    async fn health(State(svc): State<Arc<MockService>>) -> (StatusCode, Json<serde_json::Value>) {
        svc.health_hits.fetch_add(1, Ordering::SeqCst);
        if svc.healthy {
            (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "down"})),
            )
        }
    }

    async fn spawn_service(svc: Arc<MockService>) -> String {
        let app = Router::new()
            .route("/mcp/tools/call", post(tool_call))
            .route("/search", post(direct_search))
            .route("/events", get(direct_events))
            .route("/", get(health))
            .with_state(svc);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> HttpEventClient {
        HttpEventClient::new(&EventServiceConfig::default(), base_url)
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_structured_path_success() {
        let svc = MockService::new(StructuredMode::Ok, true, true);
        let base = spawn_service(svc.clone()).await;
        let result = client(base).search("music", "default").await.unwrap();

        assert_eq!(result.results_count, 2);
        assert_eq!(result.events[0].title.as_deref(), Some("Jazz Night"));
        assert_eq!(result.events[0].is_free, Some(true));
        // The direct path was never consulted.
        assert_eq!(svc.direct_hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_http_error_falls_back_to_direct_path() {
        let svc = MockService::new(StructuredMode::Http500, true, true);
        let base = spawn_service(svc.clone()).await;
        let result = client(base).search("music", "default").await.unwrap();

        assert_eq!(svc.structured_hits.load(Ordering::SeqCst), 1);
        assert_eq!(svc.direct_hits.load(Ordering::SeqCst), 1);
        // Normalized into the same canonical shape.
        assert_eq!(result.query, "music");
        assert_eq!(result.results_count, 1);
        assert_eq!(result.events[0].title.as_deref(), Some("Direct Event"));
    }

    #[tokio::test]
    async fn test_missing_content_falls_back() {
        let svc = MockService::new(StructuredMode::EmptyContent, true, true);
        let base = spawn_service(svc.clone()).await;
        let result = client(base).search("music", "default").await.unwrap();

        assert_eq!(svc.direct_hits.load(Ordering::SeqCst), 1);
        assert_eq!(result.events.len(), 1);
    }

    #[tokio::test]
    async fn test_rpc_error_falls_back() {
        let svc = MockService::new(StructuredMode::RpcError, true, true);
        let base = spawn_service(svc.clone()).await;
        let result = client(base).search("music", "default").await.unwrap();

        assert_eq!(svc.direct_hits.load(Ordering::SeqCst), 1);
        assert_eq!(result.events[0].title.as_deref(), Some("Direct Event"));
    }

    #[tokio::test]
    async fn test_both_paths_failing_returns_typed_error() {
        let svc = MockService::new(StructuredMode::Http500, false, true);
        let base = spawn_service(svc.clone()).await;
        let err = client(base).search("music", "default").await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("both paths"), "got: {message}");
    }

    #[tokio::test]
    async fn test_unreachable_service_returns_typed_error() {
        // Nothing listens on this port.
        let client = client("http://127.0.0.1:9".to_string());
        let err = client.search("music", "default").await.unwrap_err();
        assert!(matches!(err, EventServiceError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_get_all_structured_catalog() {
        let svc = MockService::new(StructuredMode::Ok, true, true);
        let base = spawn_service(svc.clone()).await;
        // The mock's tool payload parses as a catalog too (events + defaults).
        let catalog = client(base).get_all().await.unwrap();
        assert_eq!(catalog.events.len(), 2);
        assert_eq!(catalog.total_events, 2);
    }

    #[tokio::test]
    async fn test_get_all_falls_back_to_direct_endpoint() {
        let svc = MockService::new(StructuredMode::Http500, true, true);
        let base = spawn_service(svc.clone()).await;
        let catalog = client(base).get_all().await.unwrap();
        assert_eq!(catalog.events[0].title.as_deref(), Some("Catalog Event"));
        assert_eq!(catalog.total_events, 1);
    }

    #[tokio::test]
    async fn test_health_check_healthy() {
        let svc = MockService::new(StructuredMode::Ok, true, true);
        let base = spawn_service(svc.clone()).await;
        assert_eq!(client(base).health_check().await, ServiceHealth::Healthy);
    }

    #[tokio::test]
    async fn test_health_check_unhealthy() {
        let svc = MockService::new(StructuredMode::Ok, true, false);
        let base = spawn_service(svc.clone()).await;
        assert_eq!(client(base).health_check().await, ServiceHealth::Unhealthy);
    }

    #[tokio::test]
    async fn test_health_check_unreachable_is_unhealthy() {
        let client = client("http://127.0.0.1:9".to_string());
        assert_eq!(client.health_check().await, ServiceHealth::Unhealthy);
    }

    #[tokio::test]
    async fn test_health_probe_is_cached() {
        let svc = MockService::new(StructuredMode::Ok, true, true);
        let base = spawn_service(svc.clone()).await;
        let client = client(base);

        for _ in 0..5 {
            assert_eq!(client.health_check().await, ServiceHealth::Healthy);
        }
        assert_eq!(svc.health_hits.load(Ordering::SeqCst), 1);
    }
}
