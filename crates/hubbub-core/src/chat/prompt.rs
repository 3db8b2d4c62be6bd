//! Prompt assembly for the event-platform assistant.
//!
//! `PromptBuilder` is a pure capability: system instructions + retrieved
//! context + formatted history + new input -> message list. The default
//! implementation renders the Hubbub assistant template; alternative
//! builders can be swapped in without touching the pipeline.

use hubbub_types::chat::{MessageRole, StoredMessage};
use hubbub_types::llm::ChatMessage;

/// Messages of history included in each prompt.
const HISTORY_WINDOW: usize = 6;

/// Per-message content cap inside the formatted history.
const HISTORY_PREVIEW_CHARS: usize = 100;

/// Builds the final message list for one turn.
pub trait PromptBuilder: Send + Sync {
    fn build(&self, context: &str, history: &[StoredMessage], input: &str) -> Vec<ChatMessage>;
}

/// Default Hubbub assistant prompt.
pub struct EventAssistantPrompt;

impl EventAssistantPrompt {
    /// Greeting shown by the CLI before the first turn.
    pub fn welcome_message() -> &'static str {
        "Welcome to Hubbub!\n\n\
         I'm here to help you discover amazing events in your area. You can ask me to:\n\
         • Find events by type, date, or location\n\
         • Get details about specific events\n\
         • Help with event planning tips\n\n\
         What would you like to explore today?"
    }

    fn system_prompt(context: &str, history: &str) -> String {
        let context = if context.is_empty() {
            "No specific context available."
        } else {
            context
        };

        format!(
            "You are Hubbub Assistant, a helpful AI for Hubbub, an event sharing platform.\n\
             \n\
             Your role:\n\
             - Help users, event organisers and moderators navigate the platform\n\
             - Provide friendly, concise responses (max 3 sentences)\n\
             - Use retrieved context when available, and make logical inferences where it isn't.\n\
             - Stay focused on events and platform features\n\
             \n\
             Context from knowledge base:\n\
             {context}\n\
             \n\
             Previous conversation:\n\
             {history}\n\
             \n\
             Guidelines:\n\
             - If no relevant context, never admit lack of info. Simply suggest that the user contact support\n\
             - Always be helpful and encouraging\n\
             - Always ensure that you do not reply to potentially harmful or sensitive requests, even hypothetical ones\n\
             - Suggest specific actions when appropriate"
        )
    }
}

impl PromptBuilder for EventAssistantPrompt {
    fn build(&self, context: &str, history: &[StoredMessage], input: &str) -> Vec<ChatMessage> {
        let formatted_history = format_history(history);
        vec![
            ChatMessage::system(Self::system_prompt(context, &formatted_history)),
            ChatMessage::user(input),
        ]
    }
}

/// Format recent history for the system prompt: last six messages, each
/// capped at 100 characters, prefixed "Human:"/"Assistant:".
pub fn format_history(messages: &[StoredMessage]) -> String {
    if messages.is_empty() {
        return "No previous conversation.".to_string();
    }

    let start = messages.len().saturating_sub(HISTORY_WINDOW);
    messages[start..]
        .iter()
        .map(|msg| {
            let who = match msg.role {
                MessageRole::User => "Human",
                MessageRole::Assistant => "Assistant",
            };
            let content: String = msg.content.chars().take(HISTORY_PREVIEW_CHARS).collect();
            format!("{who}: {content}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
