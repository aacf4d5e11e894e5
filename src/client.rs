// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Upstream chat-completions client -- owns the HTTP leg of a generation.
//
// Responsibilities:
// - Build the chat-completions request body for a course request
// - Stream the response body back as raw bytes
// - Surface connect/status/mid-stream failures as TransportError so the
//   parser can turn them into a single Error event

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use tokio_stream::Stream;

use crate::config::{Config, ConfigError, EndpointConfig, GenerationDefaults};
use crate::course::{CourseLevel, GenerationRequest};
use crate::stream::{GenerationRun, TransportError};

/// Boxed byte stream handed to the parser. `Pin<Box<..>>` keeps the run
/// generic bound (`Unpin`) satisfied for any transport implementation.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

// ---------------------------------------------------------------------------
// Trait: ChatTransport
// ---------------------------------------------------------------------------

/// Sends one streaming chat-completions request and returns the raw body.
///
/// Implementations must be Send + Sync so they can be shared via Arc;
/// tests inject scripted transports instead of a live HTTP client.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn stream_chat(
        &self,
        endpoint: &EndpointConfig,
        body: serde_json::Value,
    ) -> Result<ByteStream, TransportError>;
}

// ---------------------------------------------------------------------------
// Reqwest transport
// ---------------------------------------------------------------------------

pub struct ReqwestChatTransport {
    client: reqwest::Client,
}

impl ReqwestChatTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestChatTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl ChatTransport for ReqwestChatTransport {
    async fn stream_chat(
        &self,
        endpoint: &EndpointConfig,
        body: serde_json::Value,
    ) -> Result<ByteStream, TransportError> {
        let url = format!("{}/v1/chat/completions", endpoint.base_url);

        let mut req = self
            .client
            .post(&url)
            .timeout(Duration::from_millis(endpoint.timeout_ms))
            .json(&body);

        if let Some(key) = &endpoint.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            // Error bodies are small; read them whole for the message
            let message = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(512)
                .collect();
            return Err(TransportError::BadStatus {
                status: status.as_u16(),
                message,
            });
        }

        let stream = resp
            .bytes_stream()
            .map_err(|e| TransportError::Stream(e.to_string()));
        Ok(Box::pin(stream))
    }
}

// ---------------------------------------------------------------------------
// EndpointSession
// ---------------------------------------------------------------------------

/// A configured endpoint bound to a transport. One session starts any
/// number of independent generation runs.
pub struct EndpointSession {
    endpoint: EndpointConfig,
    defaults: GenerationDefaults,
    transport: Arc<dyn ChatTransport>,
}

impl std::fmt::Debug for EndpointSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointSession")
            .field("endpoint", &self.endpoint)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl EndpointSession {
    /// Bind the named endpoint (or the config default) to a live HTTP
    /// transport.
    pub fn from_config(config: &Config, endpoint: Option<&str>) -> Result<Self, ConfigError> {
        Self::with_transport(config, endpoint, Arc::new(ReqwestChatTransport::default()))
    }

    pub fn with_transport(
        config: &Config,
        endpoint: Option<&str>,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self, ConfigError> {
        let endpoint = config.endpoint(endpoint).cloned().ok_or_else(|| {
            ConfigError::Validation(format!(
                "unknown endpoint \"{}\"",
                endpoint.unwrap_or("<default>")
            ))
        })?;
        Ok(Self {
            endpoint,
            defaults: config.generation.clone(),
            transport,
        })
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Fill unset request fields from the config defaults.
    pub fn resolve_request(
        &self,
        topic: &str,
        level: Option<CourseLevel>,
        sentence_count: Option<u32>,
    ) -> GenerationRequest {
        GenerationRequest {
            topic: topic.to_string(),
            level: level.unwrap_or(self.defaults.level),
            sentence_count: sentence_count.unwrap_or(self.defaults.sentence_count) as usize,
        }
    }

    /// Start one generation. Transport failures before the first byte are
    /// folded into the returned run, which then yields exactly one Error
    /// event; the caller never needs a separate failure path.
    pub async fn start_generation(&self, request: &GenerationRequest) -> GenerationRun<ByteStream> {
        let body = build_request_body(&self.endpoint, request);

        tracing::info!(
            endpoint = %self.endpoint.name,
            model = %self.endpoint.model,
            topic = %request.topic,
            sentence_count = request.sentence_count,
            "starting course generation"
        );

        let input: ByteStream = match self.transport.stream_chat(&self.endpoint, body).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "generation request failed before streaming");
                Box::pin(tokio_stream::once(Err(e)))
            }
        };

        GenerationRun::new(input, request.sentence_count)
    }
}

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

const SYSTEM_PROMPT: &str = "You are a Mandarin Chinese course author. Respond with a single \
JSON object and nothing else. The object has the fields \"title\", \"description\", \"level\" \
and \"sentences\". Each sentence has the fields \"chinese\", \"english\", \"phonetic\" (pinyin \
with tone marks) and \"difficulty\" (\"easy\", \"medium\" or \"hard\"). Do not wrap the JSON \
in markdown fences.";

fn build_request_body(endpoint: &EndpointConfig, request: &GenerationRequest) -> serde_json::Value {
    let user_prompt = format!(
        "Create a {} level Chinese course about \"{}\" with exactly {} sentences, ordered from \
easiest to hardest.",
        request.level.as_str(),
        request.topic,
        request.sentence_count,
    );

    serde_json::json!({
        "model": endpoint.model,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": user_prompt},
        ],
        "stream": true,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
