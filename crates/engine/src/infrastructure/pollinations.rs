//! Pollinations text client.
//!
//! Pollinations speaks the OpenAI chat-completions dialect. Most deployments
//! wrap the reply in the usual `choices` envelope; some return the completion
//! body bare, which is passed through for the reply parser to judge.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::ports::{FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse};

pub const DEFAULT_POLLINATIONS_ENDPOINT: &str = "https://text.pollinations.ai/openai";
pub const DEFAULT_POLLINATIONS_MODEL: &str = "openai-large";

#[derive(Clone)]
pub struct PollinationsClient {
    http: Client,
    endpoint: String,
    model: String,
}

impl PollinationsClient {
    /// A client whose requests give up after `timeout_secs`.
    pub fn with_timeout(endpoint: &str, model: &str, timeout_secs: u64) -> Self {
        let http = match Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
        {
            Ok(http) => http,
            Err(error) => {
                tracing::warn!(%error, "Falling back to an HTTP client without timeout");
                Client::new()
            }
        };

        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
        }
    }
}

#[async_trait]
impl LlmPort for PollinationsClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = CompletionBody::new(&self.model, &request);
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            turns = body.messages.len(),
            seed = ?body.seed,
            "Requesting completion"
        );

        let reply = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::request_failed)?;
        let status = reply.status();
        let text = reply.text().await.map_err(LlmError::request_failed)?;

        if !status.is_success() {
            return Err(LlmError::RequestFailed(format!(
                "HTTP error {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }
        decode_body(&text)
    }
}

/// Envelope when present, bare completion text otherwise.
fn decode_body(text: &str) -> Result<LlmResponse, LlmError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    let Ok(envelope) = serde_json::from_str::<CompletionEnvelope>(text) else {
        return Ok(LlmResponse::stop(text));
    };

    let choice = envelope
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;
    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(LlmResponse {
            content,
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
        }),
        _ => Err(LlmError::EmptyResponse),
    }
}

// Wire format

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<Turn<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

impl<'a> CompletionBody<'a> {
    /// The system prompt, if any, goes first as a `system` turn.
    fn new(model: &'a str, request: &'a LlmRequest) -> Self {
        let system = request.system_prompt.as_deref().map(|content| Turn {
            role: "system",
            content,
            name: None,
        });
        let history = request.messages.iter().map(|message| Turn {
            role: message.role.as_str(),
            content: &message.content,
            name: message.name.as_deref(),
        });

        Self {
            model,
            messages: system.into_iter().chain(history).collect(),
            temperature: request.temperature,
            seed: request.seed,
        }
    }
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ReplyTurn,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyTurn {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::ChatMessage;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Option<serde_json::Value>>>;

    /// Serve `route` on an ephemeral port and return its URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}/openai")
    }

    fn request() -> LlmRequest {
        LlmRequest::new(vec![
            ChatMessage::user(r#"{"message":"hi","action":"none"}"#),
            ChatMessage::assistant(r#"{"message":"Going up?","action":"none"}"#)
                .with_name("elevator"),
        ])
        .with_system_prompt("You are an elevator.")
        .with_seed(42)
    }

    #[tokio::test]
    async fn parses_openai_envelope_and_sends_seed() {
        let captured: Captured = Arc::new(Mutex::new(None));
        let router = Router::new()
            .route(
                "/openai",
                post(
                    |State(captured): State<Captured>, Json(body): Json<serde_json::Value>| async move {
                        *captured.lock().expect("lock") = Some(body);
                        Json(serde_json::json!({
                            "choices": [{
                                "message": { "role": "assistant", "content": "{\"message\":\"Down we go\",\"action\":\"down\"}" },
                                "finish_reason": "stop"
                            }]
                        }))
                    },
                ),
            )
            .with_state(captured.clone());

        let client = PollinationsClient::with_timeout(&serve(router).await, "test-model", 5);
        let response = client.generate(request()).await.expect("response");

        assert!(response.content.contains("Down we go"));
        assert_eq!(response.finish_reason, FinishReason::Stop);

        let body = captured.lock().expect("lock").take().expect("request captured");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["seed"], 42);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][2]["role"], "assistant");
        assert_eq!(body["messages"][2]["name"], "elevator");
        assert!(body["messages"][1].get("name").is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_request_failure() {
        let router = Router::new().route(
            "/openai",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
        );

        let client = PollinationsClient::with_timeout(&serve(router).await, "m", 5);
        let err = client.generate(request()).await.expect_err("should fail");
        assert!(matches!(err, LlmError::RequestFailed(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn plain_text_body_is_passed_through() {
        let router = Router::new().route(
            "/openai",
            post(|| async { r#"{"message":"Share and enjoy","action":"none"}"# }),
        );

        let client = PollinationsClient::with_timeout(&serve(router).await, "m", 5);
        let response = client.generate(request()).await.expect("response");
        assert_eq!(response.content, r#"{"message":"Share and enjoy","action":"none"}"#);
    }

    #[tokio::test]
    async fn empty_body_is_empty_response() {
        let router = Router::new().route("/openai", post(|| async { "" }));

        let client = PollinationsClient::with_timeout(&serve(router).await, "m", 5);
        let err = client.generate(request()).await.expect_err("should fail");
        assert_eq!(err, LlmError::EmptyResponse);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_failure() {
        let client = PollinationsClient::with_timeout("http://127.0.0.1:9/openai", "m", 1);
        let err = client.generate(request()).await.expect_err("should fail");
        assert!(matches!(err, LlmError::RequestFailed(_)));
    }

    #[test]
    fn envelope_without_choices_is_empty() {
        let err = decode_body(r#"{"choices":[]}"#).expect_err("no choices");
        assert_eq!(err, LlmError::EmptyResponse);
    }

    #[test]
    fn envelope_with_blank_content_is_empty() {
        let err = decode_body(r#"{"choices":[{"message":{"role":"assistant","content":"  "}}]}"#)
            .expect_err("blank content");
        assert_eq!(err, LlmError::EmptyResponse);
    }
}
