use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionClient, CompletionError, MAX_TOKENS, MODEL, TEMPERATURE};
use crate::{config::Config, prompts::Prompt};

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.openai_api_key.clone(), config.openai_base_url.clone())
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        // Checked up front so a misconfigured server never reaches the network.
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(CompletionError::MissingApiKey)?;

        let body = ChatCompletionRequest {
            model: MODEL,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(CompletionError::Upstream { status, body: text });
        }

        debug!(bytes = text.len(), "completion response received");

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse("no choices returned".into()))?
            .message
            .content
            .ok_or_else(|| CompletionError::MalformedResponse("first choice has no content".into()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use axum::{
        extract::State,
        http::{header, HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::OpenAiClient;
    use crate::{
        completion::{CompletionClient, CompletionError},
        prompts::Prompt,
    };

    #[derive(Clone, Default)]
    struct Upstream {
        calls: Arc<AtomicUsize>,
        last_auth: Arc<Mutex<Option<String>>>,
        last_body: Arc<Mutex<Option<Value>>>,
    }

    async fn spawn_upstream(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn upstream_router<H, T>(upstream: Upstream, handler: H) -> Router
    where
        H: axum::handler::Handler<T, Upstream>,
        T: 'static,
    {
        Router::new()
            .route("/v1/chat/completions", post(handler))
            .with_state(upstream)
    }

    fn record(upstream: &Upstream, headers: &HeaderMap, body: Value) {
        upstream.calls.fetch_add(1, Ordering::SeqCst);
        *upstream.last_auth.lock().unwrap() = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *upstream.last_body.lock().unwrap() = Some(body);
    }

    async fn reply_ok(
        State(upstream): State<Upstream>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        record(&upstream, &headers, body);
        Json(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  {\"description\": \"A goblin\"}\n" } },
                { "index": 1, "message": { "role": "assistant", "content": "second" } }
            ]
        }))
    }

    async fn reply_rate_limited(
        State(upstream): State<Upstream>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        record(&upstream, &headers, body);
        (StatusCode::TOO_MANY_REQUESTS, "slow down")
    }

    async fn reply_garbage(
        State(upstream): State<Upstream>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> &'static str {
        record(&upstream, &headers, body);
        "not json"
    }

    async fn reply_no_choices(
        State(upstream): State<Upstream>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        record(&upstream, &headers, body);
        Json(json!({ "choices": [] }))
    }

    fn prompt() -> Prompt {
        Prompt {
            system: "system turn".into(),
            user: "user turn".into(),
        }
    }

    #[tokio::test]
    async fn returns_first_choice_verbatim() {
        let upstream = Upstream::default();
        let base = spawn_upstream(upstream_router(upstream.clone(), reply_ok)).await;
        let client = OpenAiClient::new(Some("sk-test".into()), base);

        let text = client.complete(&prompt()).await.unwrap();
        assert_eq!(text, "  {\"description\": \"A goblin\"}\n");
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sends_fixed_generation_parameters() {
        let upstream = Upstream::default();
        let base = spawn_upstream(upstream_router(upstream.clone(), reply_ok)).await;
        let client = OpenAiClient::new(Some("sk-test".into()), base);

        client.complete(&prompt()).await.unwrap();

        let auth = upstream.last_auth.lock().unwrap().clone();
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));

        let body = upstream.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 600);
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(
            body["messages"],
            json!([
                { "role": "system", "content": "system turn" },
                { "role": "user", "content": "user turn" }
            ])
        );
    }

    #[tokio::test]
    async fn missing_key_never_contacts_upstream() {
        let upstream = Upstream::default();
        let base = spawn_upstream(upstream_router(upstream.clone(), reply_ok)).await;

        for key in [None, Some(String::new())] {
            let client = OpenAiClient::new(key, base.clone());
            let err = client.complete(&prompt()).await.unwrap_err();
            assert!(matches!(err, CompletionError::MissingApiKey));
        }
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let upstream = Upstream::default();
        let base = spawn_upstream(upstream_router(upstream.clone(), reply_rate_limited)).await;
        let client = OpenAiClient::new(Some("sk-test".into()), base);

        let err = client.complete(&prompt()).await.unwrap_err();
        match &err {
            CompletionError::Upstream { status, body } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn unparsable_body_is_malformed() {
        let upstream = Upstream::default();
        let base = spawn_upstream(upstream_router(upstream.clone(), reply_garbage)).await;
        let client = OpenAiClient::new(Some("sk-test".into()), base);

        let err = client.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let upstream = Upstream::default();
        let base = spawn_upstream(upstream_router(upstream.clone(), reply_no_choices)).await;
        let client = OpenAiClient::new(Some("sk-test".into()), base);

        let err = client.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(ref m) if m == "no choices returned"));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OpenAiClient::new(Some("sk-test".into()), format!("http://{addr}/v1"));
        let err = client.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Transport(_)));
    }
}
