use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::model::character::CharacterRequest;

// NOTE:
// Prompt wording and the messages returned to clients are localized per
// language. Field values are interpolated verbatim, without escaping.

#[derive(Deserialize)]
struct PromptFile {
    system: String,
    user: String,
    daytime: String,
    nighttime: String,
    messages: MessageFile,
}

#[derive(Deserialize)]
struct MessageFile {
    success: String,
    missing_api_key: String,
    server_error: String,
}

/// The two turns sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

pub struct PromptSet {
    system: String,
    user_template: String,
    daytime_label: String,
    nighttime_label: String,
    messages: ResponseMessages,
}

/// Texts placed in the `message` field of a character response.
pub struct ResponseMessages {
    pub success: String,
    pub missing_api_key: String,
    server_error_template: String,
}

macro_rules! prompt_file {
    ($lang:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/lang/",
            $lang,
            "/npc_prompts.json"
        ))
    };
}

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(Environment::new);

static EN_PROMPTS: Lazy<PromptSet> = Lazy::new(|| load_prompt_set(prompt_file!("en")));
static RU_PROMPTS: Lazy<PromptSet> = Lazy::new(|| load_prompt_set(prompt_file!("ru")));

fn load_prompt_set(raw: &str) -> PromptSet {
    let parsed: PromptFile = serde_json::from_str(raw).expect("invalid npc prompt config");
    PromptSet {
        system: parsed.system,
        user_template: parsed.user,
        daytime_label: parsed.daytime,
        nighttime_label: parsed.nighttime,
        messages: ResponseMessages {
            success: parsed.messages.success,
            missing_api_key: parsed.messages.missing_api_key,
            server_error_template: parsed.messages.server_error,
        },
    }
}

/// Accepts bare codes and region-tagged ones (`ru-RU`, `en_US`); anything
/// unknown falls back to English.
pub fn prompts_for_language(language: &str) -> &'static PromptSet {
    let normalized = language
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or("en")
        .to_ascii_lowercase();

    match normalized.as_str() {
        "ru" => &RU_PROMPTS,
        _ => &EN_PROMPTS,
    }
}

impl PromptSet {
    pub fn build(&self, request: &CharacterRequest) -> Result<Prompt, minijinja::Error> {
        let time_of_day = if request.is_daytime {
            &self.daytime_label
        } else {
            &self.nighttime_label
        };

        let user = TEMPLATES.render_str(
            &self.user_template,
            context! {
                appearance => &request.appearance,
                characteristics => &request.characteristics,
                height => &request.height,
                speed => &request.speed,
                time_of_day => time_of_day,
            },
        )?;

        Ok(Prompt {
            system: self.system.clone(),
            user,
        })
    }

    pub fn messages(&self) -> &ResponseMessages {
        &self.messages
    }
}

impl ResponseMessages {
    pub fn server_error(&self, description: &str) -> String {
        TEMPLATES
            .render_str(&self.server_error_template, context! { error => description })
            .unwrap_or_else(|_| description.to_string())
    }
}
