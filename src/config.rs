use crate::auth::TokenAllowList;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_PROMPT_LANGUAGE: &str = "en";

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub allowed_tokens: TokenAllowList,
    pub prompt_language: String,
}

impl Config {
    /// Reads from the process environment; `.env` must already be loaded.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|key| !key.is_empty());

        let openai_base_url = lookup("OPENAI_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        let allowed_tokens = TokenAllowList::from_csv(&lookup("ALLOWED_TOKENS").unwrap_or_default());

        let prompt_language = lookup("NPC_PROMPT_LANGUAGE")
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| DEFAULT_PROMPT_LANGUAGE.to_string());

        Self {
            openai_api_key,
            openai_base_url,
            allowed_tokens,
            prompt_language,
        }
    }
}
