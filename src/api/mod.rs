use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::{
    auth::TokenAllowList,
    completion::CompletionClient,
    config::Config,
    prompts::{prompts_for_language, PromptSet},
};

pub mod auth;
pub mod envelope;
pub mod error;
pub mod handlers;

/// Shared, read-only dependencies of every request.
#[derive(Clone)]
pub struct AppState {
    pub allowed_tokens: Arc<TokenAllowList>,
    pub completion: Arc<dyn CompletionClient>,
    pub prompts: &'static PromptSet,
}

impl AppState {
    pub fn new(config: &Config, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            allowed_tokens: Arc::new(config.allowed_tokens.clone()),
            completion,
            prompts: prompts_for_language(&config.prompt_language),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/generate-npc", post(handlers::generate_npc))
}

/// Credentials are allowed, so the wildcard cannot be sent literally; the
/// request's own origin, method and headers are echoed back instead.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn app(state: AppState) -> Router {
    router().layer(cors_layer()).with_state(state)
}
