use async_trait::async_trait;
use reqwest::StatusCode;

use crate::prompts::Prompt;

pub mod openai;

pub use openai::OpenAiClient;

pub const MODEL: &str = "gpt-3.5-turbo";
pub const MAX_TOKENS: u32 = 600;
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("OpenAI API key is not configured")]
    MissingApiKey,
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion service returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Sends the system and user turns of a [`Prompt`] to a chat-completion
/// service and returns the first choice's text untouched.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError>;
}
