//! OpenAI SSE stream to text-chunk adapter.
//!
//! Maps `async-openai`'s [`ChatCompletionResponseStream`] chunks to the
//! plain text-delta stream that [`hubbub_core::llm::provider::LlmProvider`]
//! exposes. Empty deltas (role-only or usage-only chunks) are skipped.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use async_openai::types::chat::ChatCompletionResponseStream;

use hubbub_types::llm::LlmError;

/// Map an async-openai response stream to a stream of text chunks.
pub fn map_text_stream(
    stream: ChatCompletionResponseStream,
) -> Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>> {
    Box::pin(async_stream::try_stream! {
        let mut stream = stream;

        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;

            for choice in &chunk.choices {
                if let Some(text) = &choice.delta.content {
                    if !text.is_empty() {
                        yield text.clone();
                    }
                }
            }
        }
    })
}
