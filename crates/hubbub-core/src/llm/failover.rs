//! Primary/backup generation with a fail-soft floor.
//!
//! Order is deterministic: the primary is always attempted first and the
//! backup only after a primary failure. When both fail (or no backup is
//! configured) the caller gets a fixed degraded-service string -- a
//! generation failure never crosses this boundary as an error.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use tracing::{error, info, warn};

use hubbub_types::llm::{ChatMessage, CompletionRequest, LlmError};

use super::box_provider::BoxLlmProvider;

/// Fixed reply when every configured provider has failed.
pub const DEGRADED_SERVICE_REPLY: &str =
    "I'm having trouble processing your request. Please try again.";

/// Which provider produced a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServedBy {
    Primary,
    Backup,
    /// No provider answered; the degraded floor was served.
    Degraded,
}

/// A generated reply plus where it came from.
#[derive(Debug, Clone)]
pub struct GenerationReply {
    pub text: String,
    pub served_by: ServedBy,
}

/// Primary/backup LLM invocation with failover.
pub struct GenerationProvider {
    primary: BoxLlmProvider,
    backup: Option<BoxLlmProvider>,
    max_tokens: u32,
    temperature: f64,
}

impl GenerationProvider {
    pub fn new(primary: BoxLlmProvider, backup: Option<BoxLlmProvider>) -> Self {
        Self {
            primary,
            backup,
            max_tokens: 512,
            temperature: 0.7,
        }
    }

    pub fn with_limits(mut self, max_tokens: u32, temperature: f64) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn primary_name(&self) -> &str {
        self.primary.name()
    }

    pub fn backup_configured(&self) -> bool {
        self.backup.is_some()
    }

    fn request(&self, messages: Vec<ChatMessage>) -> CompletionRequest {
        CompletionRequest {
            messages,
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        }
    }

    /// Generate a reply, failing over primary -> backup -> degraded floor.
    pub async fn invoke(&self, messages: Vec<ChatMessage>) -> GenerationReply {
        let request = self.request(messages);

        match self.primary.complete(&request).await {
            Ok(response) => GenerationReply {
                text: response.content,
                served_by: ServedBy::Primary,
            },
            Err(primary_err) => {
                warn!(
                    provider = self.primary.name(),
                    error = %primary_err,
                    "Primary provider failed, trying backup"
                );
                self.invoke_backup(&request, &primary_err).await
            }
        }
    }

    async fn invoke_backup(
        &self,
        request: &CompletionRequest,
        primary_err: &LlmError,
    ) -> GenerationReply {
        let Some(backup) = &self.backup else {
            error!(
                provider = self.primary.name(),
                error = %primary_err,
                "No backup configured, serving degraded reply"
            );
            return GenerationReply {
                text: DEGRADED_SERVICE_REPLY.to_string(),
                served_by: ServedBy::Degraded,
            };
        };

        match backup.complete(request).await {
            Ok(response) => {
                info!(provider = backup.name(), "Backup provider served the request");
                GenerationReply {
                    text: response.content,
                    served_by: ServedBy::Backup,
                }
            }
            Err(backup_err) => {
                error!(
                    provider = backup.name(),
                    error = %backup_err,
                    "Backup provider also failed, serving degraded reply"
                );
                GenerationReply {
                    text: DEGRADED_SERVICE_REPLY.to_string(),
                    served_by: ServedBy::Degraded,
                }
            }
        }
    }

    /// Streaming variant with the same primary -> backup order.
    ///
    /// The backup is only consulted when the primary stream fails before
    /// producing any text; there is no mid-stream failover. Total failure
    /// yields a one-chunk stream containing the degraded reply.
    pub fn stream_reply(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Pin<Box<dyn Stream<Item = String> + Send + '_>> {
        let request = self.request(messages);

        Box::pin(async_stream::stream! {
            let mut delivered = false;
            let mut primary_err = None;

            let mut primary = self.primary.stream(request.clone());
            while let Some(item) = primary.next().await {
                match item {
                    Ok(text) => {
                        delivered = true;
                        yield text;
                    }
                    Err(err) => {
                        primary_err = Some(err);
                        break;
                    }
                }
            }
            drop(primary);

            let Some(err) = primary_err else { return };
            warn!(
                provider = self.primary.name(),
                error = %err,
                "Primary stream failed"
            );
            if delivered {
                // Partial output already reached the caller; no failover.
                return;
            }

            let Some(backup) = &self.backup else {
                yield DEGRADED_SERVICE_REPLY.to_string();
                return;
            };

            let mut backup_delivered = false;
            let mut backup_err = None;
            let mut backup_stream = backup.stream(request);
            while let Some(item) = backup_stream.next().await {
                match item {
                    Ok(text) => {
                        backup_delivered = true;
                        yield text;
                    }
                    Err(err) => {
                        backup_err = Some(err);
                        break;
                    }
                }
            }

            if let Some(err) = backup_err {
                error!(provider = backup.name(), error = %err, "Backup stream failed");
                if !backup_delivered {
                    yield DEGRADED_SERVICE_REPLY.to_string();
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubbub_types::llm::{CompletionResponse, ProviderCapabilities};

    use crate::llm::provider::LlmProvider;

    struct MockProvider {
        name: String,
        capabilities: ProviderCapabilities,
        reply: Option<String>,
    }

    impl MockProvider {
        fn ok(name: &str, reply: &str) -> Self {
            Self {
                name: name.to_string(),
                capabilities: caps(),
                reply: Some(reply.to_string()),
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                name: name.to_string(),
                capabilities: caps(),
                reply: None,
            }
        }
    }

    fn caps() -> ProviderCapabilities {
        ProviderCapabilities {
            streaming: true,
            max_context_tokens: 128_000,
            max_output_tokens: 8_192,
        }
    }

    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            match &self.reply {
                Some(reply) => Ok(CompletionResponse {
                    content: reply.clone(),
                    model: format!("{}-model", self.name),
                    input_tokens: 10,
                    output_tokens: 20,
                }),
                None => Err(LlmError::Provider {
                    message: "503 Service Unavailable".to_string(),
                }),
            }
        }

        fn stream(
            &self,
            _request: CompletionRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>> {
            let reply = self.reply.clone();
            Box::pin(async_stream::stream! {
                match reply {
                    Some(text) => {
                        for word in text.split_inclusive(' ') {
                            yield Ok(word.to_string());
                        }
                    }
                    None => {
                        yield Err(LlmError::Stream("connection dropped".to_string()));
                    }
                }
            })
        }
    }

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::user("Hello")]
    }

    #[tokio::test]
    async fn test_primary_serves_when_healthy() {
        let provider = GenerationProvider::new(
            BoxLlmProvider::new(MockProvider::ok("primary", "from primary")),
            Some(BoxLlmProvider::new(MockProvider::ok("backup", "from backup"))),
        );
        let reply = provider.invoke(messages()).await;
        assert_eq!(reply.text, "from primary");
        assert_eq!(reply.served_by, ServedBy::Primary);
    }

    #[tokio::test]
    async fn test_failover_to_backup() {
        let provider = GenerationProvider::new(
            BoxLlmProvider::new(MockProvider::failing("primary")),
            Some(BoxLlmProvider::new(MockProvider::ok("backup", "from backup"))),
        );
        let reply = provider.invoke(messages()).await;
        assert_eq!(reply.text, "from backup");
        assert_eq!(reply.served_by, ServedBy::Backup);
    }

    #[tokio::test]
    async fn test_both_fail_serves_degraded_string() {
        let provider = GenerationProvider::new(
            BoxLlmProvider::new(MockProvider::failing("primary")),
            Some(BoxLlmProvider::new(MockProvider::failing("backup"))),
        );
        let reply = provider.invoke(messages()).await;
        assert_eq!(reply.text, DEGRADED_SERVICE_REPLY);
        assert_eq!(reply.served_by, ServedBy::Degraded);
    }

    #[tokio::test]
    async fn test_no_backup_serves_degraded_string() {
        let provider = GenerationProvider::new(
            BoxLlmProvider::new(MockProvider::failing("primary")),
            None,
        );
        let reply = provider.invoke(messages()).await;
        assert_eq!(reply.text, DEGRADED_SERVICE_REPLY);
        assert_eq!(reply.served_by, ServedBy::Degraded);
        assert!(!provider.backup_configured());
    }

    #[tokio::test]
    async fn test_stream_primary_happy_path() {
        let provider = GenerationProvider::new(
            BoxLlmProvider::new(MockProvider::ok("primary", "hello streaming world")),
            None,
        );
        let chunks: Vec<String> = provider.stream_reply(messages()).collect().await;
        assert_eq!(chunks.join(""), "hello streaming world");
    }

    #[tokio::test]
    async fn test_stream_failover_to_backup() {
        let provider = GenerationProvider::new(
            BoxLlmProvider::new(MockProvider::failing("primary")),
            Some(BoxLlmProvider::new(MockProvider::ok("backup", "backup text"))),
        );
        let chunks: Vec<String> = provider.stream_reply(messages()).collect().await;
        assert_eq!(chunks.join(""), "backup text");
    }

    #[tokio::test]
    async fn test_stream_total_failure_one_degraded_chunk() {
        let provider = GenerationProvider::new(
            BoxLlmProvider::new(MockProvider::failing("primary")),
            Some(BoxLlmProvider::new(MockProvider::failing("backup"))),
        );
        let chunks: Vec<String> = provider.stream_reply(messages()).collect().await;
        assert_eq!(chunks, vec![DEGRADED_SERVICE_REPLY.to_string()]);
    }

    #[tokio::test]
    async fn test_stream_no_backup_one_degraded_chunk() {
        let provider = GenerationProvider::new(
            BoxLlmProvider::new(MockProvider::failing("primary")),
            None,
        );
        let chunks: Vec<String> = provider.stream_reply(messages()).collect().await;
        assert_eq!(chunks, vec![DEGRADED_SERVICE_REPLY.to_string()]);
    }
}
