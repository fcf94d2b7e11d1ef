//! Chat-completion client
//!
//! Thin wrapper over an OpenRouter-compatible completions endpoint: POST a
//! chat-style request (system+user messages, model id, sampling
//! parameters) and read back the first choice's message content. Provider
//! errors propagate as-is; there is no retry and no fallback text.

use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;

/// Request timeout for completion calls; generation can be slow
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from the completion client
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Non-success HTTP status from the provider
    #[error("Completion API returned {status}")]
    Status { status: StatusCode },

    /// Transport-level failure
    #[error("Completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned no choices
    #[error("No completion choices returned")]
    Empty,
}

/// A chat message in the completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for an OpenRouter-compatible chat-completion API
pub struct CompletionClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl CompletionClient {
    /// Build a client from configuration.
    ///
    /// A missing API key is tolerated at construction time; calls will
    /// fail with the provider's authorization error instead.
    pub fn new(config: &AiConfig) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        match &config.api_key {
            Some(key) => {
                let mut value = header::HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|_| anyhow::anyhow!("AI API key contains invalid characters"))?;
                value.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, value);
            }
            None => {
                tracing::warn!("No AI API key configured; summary generation will fail");
            }
        }
        headers.insert(
            "X-Title",
            header::HeaderValue::from_static("Vitrine Project Summarizer"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Generate a completion for the given conversation.
    ///
    /// Returns the first choice's message content.
    pub async fn generate(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.api_base);
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status { status });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    async fn client_for(router: Router) -> CompletionClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = AiConfig {
            api_base: format!("http://{}", addr),
            api_key: Some("sk-test".to_string()),
            ..AiConfig::default()
        };
        CompletionClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                // Echo back something derived from the request to prove
                // the wire format round-trips
                assert_eq!(body["max_tokens"], 250);
                assert!(body["messages"].as_array().unwrap().len() == 2);
                Json(json!({
                    "id": "gen-1",
                    "choices": [
                        {"index": 0, "message": {"role": "assistant", "content": "Un super projet !"}, "finish_reason": "stop"},
                        {"index": 1, "message": {"role": "assistant", "content": "ignored"}, "finish_reason": "stop"}
                    ]
                }))
            }),
        );
        let client = client_for(router).await;

        let messages = vec![
            ChatMessage::system("Tu es un rédacteur."),
            ChatMessage::user("Résume ce projet."),
        ];
        let content = client.generate(&messages).await.unwrap();
        assert_eq!(content, "Un super projet !");
    }

    #[tokio::test]
    async fn test_generate_empty_choices_is_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"id": "gen-2", "choices": []})) }),
        );
        let client = client_for(router).await;

        let err = client
            .generate(&[ChatMessage::user("hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Empty));
    }

    #[tokio::test]
    async fn test_generate_propagates_provider_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "invalid key"})),
                )
            }),
        );
        let client = client_for(router).await;

        let err = client
            .generate(&[ChatMessage::user("hello")])
            .await
            .unwrap_err();
        match err {
            CompletionError::Status { status } => assert_eq!(status, StatusCode::UNAUTHORIZED),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
