use crate::{
    completion::CompletionError,
    model::character::{AppliedSettings, CharacterRequest, CharacterResponse},
    prompts::ResponseMessages,
};

/// Why a generation attempt produced no character.
#[derive(Debug, thiserror::Error)]
pub enum GenerationFailure {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] minijinja::Error),
}

/// Wraps a generation outcome into the response envelope. Every branch is
/// delivered with HTTP 200; callers read `success`.
pub fn assemble(
    request: CharacterRequest,
    outcome: Result<String, GenerationFailure>,
    messages: &ResponseMessages,
) -> CharacterResponse {
    match outcome {
        Ok(npc_data) => CharacterResponse::applied(
            messages.success.clone(),
            AppliedSettings {
                npc_data,
                original_settings: request,
            },
        ),
        Err(GenerationFailure::Completion(CompletionError::MissingApiKey)) => {
            CharacterResponse::failed(messages.missing_api_key.clone())
        }
        Err(failure) => CharacterResponse::failed(messages.server_error(&failure.to_string())),
    }
}
