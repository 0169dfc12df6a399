//! OpenAI-compatible chat-completions client.
//!
//! Talks to any endpoint implementing `POST …/chat/completions` (OVHcloud AI
//! Endpoints, vLLM, llama.cpp server, OpenAI itself) via `reqwest`, with
//! bearer authentication and exponential backoff on 429/5xx.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::base_llm::{ChatMessage, CompletionProvider, SamplingParams};
use crate::config::AiConfig;
use crate::error::ClientError;

const SERVICE: &str = "AI endpoint";

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    /// Sent as-is; `None` serialises to `null`, which hosted single-model
    /// endpoints expect.
    model: Option<String>,
    sampling: SamplingParams,
    max_retries: u32,
    initial_backoff: Duration,
}

impl OpenAiCompatClient {
    pub fn new(http: reqwest::Client, config: &AiConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            sampling: SamplingParams::default(),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_secs(1),
        }
    }

    /// Override the first retry delay (doubled on each further attempt).
    pub fn with_initial_backoff(mut self, delay: Duration) -> Self {
        self.initial_backoff = delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the chat-completions request body.
    pub fn build_request_body(&self, messages: &[ChatMessage]) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.sampling.temperature,
            "max_tokens": self.sampling.max_tokens,
            "top_p": self.sampling.top_p,
            "stream": false,
        })
    }

    async fn send_once(&self, body: &Value) -> Result<String, ClientError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header("accept", "application/json")
            .json(body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| ClientError::decode(SERVICE, e))?;
        extract_message_content(&json)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response.
pub fn extract_message_content(response: &Value) -> Result<String, ClientError> {
    let message = response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| ClientError::invalid(SERVICE, "no choices[0].message in response"))?;

    message
        .get("content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClientError::invalid(SERVICE, "message has no text content"))
}

#[async_trait]
impl CompletionProvider for OpenAiCompatClient {
    fn provider(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        log::debug!(
            "OpenAiCompatClient.complete: endpoint={}, messages={}",
            self.endpoint,
            messages.len()
        );

        let body = self.build_request_body(messages);
        let mut delay = self.initial_backoff;
        let mut attempt = 0;

        loop {
            match self.send_once(&body).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "AI endpoint retry attempt {} after {:?}: {}",
                        attempt,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{http::StatusCode, routing::post, Json, Router};

    use super::*;

    fn config(base: &str) -> AiConfig {
        AiConfig {
            endpoint_base: base.to_string(),
            endpoint_path: "/v1/chat/completions".to_string(),
            api_key: Some("test-key".to_string()),
            model: None,
            max_retries: 2,
        }
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_request_body_shape() {
        let client = OpenAiCompatClient::new(reqwest::Client::new(), &config("http://x"));
        let body = client.build_request_body(&[ChatMessage::user("hello")]);
        assert!(body["model"].is_null());
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_extract_message_content() {
        let ok = serde_json::json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(extract_message_content(&ok).unwrap(), "hi");

        let missing = serde_json::json!({"choices": []});
        assert!(matches!(
            extract_message_content(&missing),
            Err(ClientError::InvalidResponse { .. })
        ));

        let no_text = serde_json::json!({"choices": [{"message": {"content": null}}]});
        assert!(extract_message_content(&no_text).is_err());
    }

    #[tokio::test]
    async fn test_complete_against_local_endpoint() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let echoed = body["messages"][0]["content"].as_str().unwrap_or("").to_string();
                Json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": echoed}}]
                }))
            }),
        );
        let base = spawn(router).await;
        let client = OpenAiCompatClient::new(reqwest::Client::new(), &config(&base));

        let reply = client.complete(&[ChatMessage::user("ping")]).await.unwrap();
        assert_eq!(reply, "ping");
    }

    #[tokio::test]
    async fn test_complete_retries_server_errors() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(StatusCode::SERVICE_UNAVAILABLE)
                    } else {
                        Ok(Json(serde_json::json!({
                            "choices": [{"message": {"content": "recovered"}}]
                        })))
                    }
                }
            }),
        );
        let base = spawn(router).await;
        let client = OpenAiCompatClient::new(reqwest::Client::new(), &config(&base))
            .with_initial_backoff(Duration::from_millis(1));

        let reply = client.complete(&[ChatMessage::user("ping")]).await.unwrap();
        assert_eq!(reply, "recovered");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { (StatusCode::UNAUTHORIZED, "bad key") }
            }),
        );
        let base = spawn(router).await;
        let client = OpenAiCompatClient::new(reqwest::Client::new(), &config(&base))
            .with_initial_backoff(Duration::from_millis(1));

        let err = client.complete(&[ChatMessage::user("ping")]).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 401, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
