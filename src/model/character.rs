use serde::{Deserialize, Serialize};

/// Traits requested for a generated character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRequest {
    pub appearance: String,
    pub characteristics: String,
    pub height: String,
    pub speed: String,
    #[serde(rename = "isDaytime")]
    pub is_daytime: bool,
}

/// Settings echoed back on a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedSettings {
    /// Raw model output. Expected to be JSON text but never parsed here.
    pub npc_data: String,
    pub original_settings: CharacterRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterResponse {
    pub success: bool,
    pub message: String,
    #[serde(
        rename = "appliedSettings",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub applied_settings: Option<AppliedSettings>,
}

impl CharacterResponse {
    pub fn applied(message: impl Into<String>, settings: AppliedSettings) -> Self {
        Self {
            success: true,
            message: message.into(),
            applied_settings: Some(settings),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            applied_settings: None,
        }
    }
}
