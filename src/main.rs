use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod auth;
mod completion;
mod config;
mod model;
mod prompts;

use api::AppState;
use completion::OpenAiClient;
use config::Config;

const BIND_ADDR: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🚀 Starting NPC AI server...");

    // -----------------------------
    // Configuration / Dependencies
    // -----------------------------
    let config = Config::from_env();

    if config.allowed_tokens.is_empty() {
        warn!("ALLOWED_TOKENS is empty; every /generate-npc request will be rejected");
    }
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; generation requests will report a configuration error");
    }

    let completion = Arc::new(OpenAiClient::from_config(&config));
    let state = AppState::new(&config, completion);

    info!(
        tokens = config.allowed_tokens.len(),
        base_url = %config.openai_base_url,
        language = %config.prompt_language,
        "configuration loaded"
    );

    // -----------------------------
    // Router
    // -----------------------------
    let app = api::app(state);

    println!("🌐 HTTP listening on http://{BIND_ADDR}");
    println!("🛠 NPC generation at http://{BIND_ADDR}/generate-npc");

    let listener = TcpListener::bind(BIND_ADDR).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
