//! Prompt template and response parsing for the question-answer chain.

use crate::error::{Error, Result};
use serde::Deserialize;

pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant. Please respond to the user queries.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    fn prefix(self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "Human",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatPrompt {
    pub messages: Vec<ChatMessage>,
}

impl ChatPrompt {
    /// Flattens the turns into the text sent to a completion endpoint.
    pub fn to_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role.prefix(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Fixed two-turn template: system instruction, then the question verbatim.
pub fn render_prompt(question: &str) -> ChatPrompt {
    ChatPrompt {
        messages: vec![
            ChatMessage { role: Role::System, content: SYSTEM_INSTRUCTION.to_string() },
            ChatMessage { role: Role::User, content: format!("Question:{question}") },
        ],
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Pulls the plain-text completion out of a runtime response body, untouched.
pub fn extract_text(body: &[u8]) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_slice(body)
        .map_err(|e| Error::Generation(format!("unreadable runtime response: {e}")))?;
    if let Some(err) = parsed.error {
        return Err(Error::Generation(err));
    }
    parsed
        .response
        .ok_or_else(|| Error::Generation("runtime response has no `response` field".into()))
}
