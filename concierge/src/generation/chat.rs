//! OpenAI-compatible chat-completions model with server-sent-event streaming.
//!
//! # Request
//!
//! `POST {endpoint}` with
//!
//! ```json
//! {
//!   "model": "...",
//!   "stream": true,
//!   "messages": [{"role": "system", ...}, {"role": "user", ...}],
//!   "response_format": {"type": "json_schema", "json_schema": {"name": "trip", "schema": {...}}}
//! }
//! ```
//!
//! # Response
//!
//! `text/event-stream` frames of the form `data: {"choices":[{"delta":{"content":"..."}}]}`,
//! terminated by `data: [DONE]`.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::error::ModelError;
use super::model::{GenerationRequest, GenerativeModel, ModelStream};
use super::schema::TripSchema;
use crate::provider::USER_AGENT;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Deserialize)]
struct ChunkFrame {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental decoder for `text/event-stream` bodies.
///
/// Bytes may be split anywhere, including inside a UTF-8 sequence, so input
/// is buffered until a complete line is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once the `[DONE]` frame has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw bytes and return the content deltas they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<String, ModelError>> {
        self.buffer.extend_from_slice(bytes);

        let mut out = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if self.done {
                continue;
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(item) = self.decode_line(line.trim_end_matches(['\r', '\n'])) {
                out.push(item);
            }
        }
        out
    }

    fn decode_line(&mut self, line: &str) -> Option<Result<String, ModelError>> {
        // Comments, event names and blank separators carry no content
        let data = line.strip_prefix("data:")?.trim_start();
        if data == "[DONE]" {
            self.done = true;
            return None;
        }

        let frame: ChunkFrame = match serde_json::from_str(data) {
            Ok(frame) => frame,
            Err(e) => return Some(Err(ModelError::Stream(e.to_string()))),
        };
        if let Some(error) = frame.error {
            return Some(Err(ModelError::Unavailable(error.to_string())));
        }

        let content: String = frame
            .choices
            .into_iter()
            .filter_map(|choice| choice.delta.content)
            .collect();
        if content.is_empty() {
            None
        } else {
            Some(Ok(content))
        }
    }
}

/// Generative model backed by an OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionsModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionsModel {
    /// Creates a model client.
    ///
    /// `timeout` bounds the whole request, including the streamed body.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ModelError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    fn request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        json!({
            "model": self.model,
            "stream": true,
            "messages": [
                { "role": "system", "content": request.instructions },
                { "role": "user", "content": request.prompt },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": TripSchema::NAME,
                    "schema": request.schema,
                },
            },
        })
    }
}

impl GenerativeModel for ChatCompletionsModel {
    fn stream(&self, request: GenerationRequest) -> BoxFuture<'_, Result<ModelStream, ModelError>> {
        Box::pin(async move {
            let body = serde_json::to_vec(&self.request_body(&request))
                .map_err(|e| ModelError::Http(format!("Failed to encode request: {}", e)))?;

            let mut builder = self
                .client
                .post(&self.endpoint)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .header(reqwest::header::ACCEPT, "text/event-stream")
                .body(body);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            debug!(endpoint = %self.endpoint, model = %self.model, "Starting chat completion stream");
            let response = builder
                .send()
                .await
                .map_err(|e| ModelError::Http(format!("Request failed: {}", e)))?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                return Err(ModelError::Unavailable(format!("HTTP {}", status)));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "Chat completion request rejected");
                return Err(ModelError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let mut decoder = SseDecoder::new();
            let deltas = response
                .bytes_stream()
                .map(move |chunk| match chunk {
                    Ok(bytes) => decoder.push(&bytes),
                    Err(e) => vec![Err(ModelError::Http(format!("Stream interrupted: {}", e)))],
                })
                .flat_map(stream::iter)
                .boxed();
            Ok(deltas)
        })
    }

    fn prewarm(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            // Opens a pooled connection so the first real request skips the handshake
            match self.client.head(&self.endpoint).send().await {
                Ok(response) => debug!(status = %response.status(), "Prewarmed model endpoint"),
                Err(e) => debug!(error = %e, "Prewarm request failed"),
            }
        })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(content: &str) -> String {
        format!(
            "data: {}\n\n",
            json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    #[test]
    fn test_decoder_extracts_content() {
        let mut decoder = SseDecoder::new();
        let input = format!("{}{}data: [DONE]\n\n", frame("{\"dest"), frame("ination\""));
        let out: Vec<String> = decoder
            .push(input.as_bytes())
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(out, vec!["{\"dest", "ination\""]);
        assert!(decoder.is_done());
    }

    #[test]
    fn test_decoder_handles_split_frames() {
        let mut decoder = SseDecoder::new();
        let input = frame("Blacksburg é");
        let bytes = input.as_bytes();
        let mut out = Vec::new();
        for chunk in bytes.chunks(3) {
            out.extend(decoder.push(chunk));
        }
        assert_eq!(out, vec![Ok("Blacksburg é".to_string())]);
    }

    #[test]
    fn test_decoder_ignores_comments_and_role_frames() {
        let mut decoder = SseDecoder::new();
        let input = ": keep-alive\n\ndata: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n";
        assert!(decoder.push(input.as_bytes()).is_empty());
    }

    #[test]
    fn test_decoder_ignores_frames_after_done() {
        let mut decoder = SseDecoder::new();
        let input = format!("data: [DONE]\n\n{}", frame("late"));
        assert!(decoder.push(input.as_bytes()).is_empty());
    }

    #[test]
    fn test_decoder_reports_errors() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"data: {not json}\n");
        assert!(matches!(out.as_slice(), [Err(ModelError::Stream(_))]));

        let out = decoder.push(b"data: {\"error\":{\"message\":\"overloaded\"}}\n");
        assert!(matches!(out.as_slice(), [Err(ModelError::Unavailable(_))]));
    }

    #[test]
    fn test_request_body_carries_schema() {
        let model = ChatCompletionsModel::new(
            DEFAULT_ENDPOINT,
            DEFAULT_MODEL,
            Some("  ".to_string()),
            Duration::from_secs(60),
        )
        .unwrap();
        assert!(model.api_key.is_none());

        let body = model.request_body(&GenerationRequest {
            instructions: "You are a concierge.".to_string(),
            prompt: "Plan my day.".to_string(),
            schema: TripSchema::json_schema(),
        });
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["response_format"]["json_schema"]["name"], "trip");
        assert_eq!(
            body["response_format"]["json_schema"]["schema"]["required"][0],
            "destination"
        );
    }
}
