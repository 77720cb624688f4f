// OpenAI-compatible chat-completion provider
//
// Works against any endpoint speaking the OpenAI protocol (OpenAI, DeepSeek,
// Groq, Ollama, vLLM, ...). `api_base` is used as-is, so it normally ends
// in `/v1`.

use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

use super::types::{ChatRequest, Fragment};
use super::ChatProvider;
use crate::config::constants::{CHAT_COMPLETIONS_PATH, FRAGMENT_CHANNEL_CAPACITY};
use crate::config::ModelEndpointConfig;
use crate::errors::{LlmError, Result};

/// OpenAI protocol provider
#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    /// Longest wait for the connection, the headers or the next body chunk
    idle_timeout: Option<Duration>,
}

impl OpenAIProvider {
    /// Create a provider for `base_url`.
    ///
    /// `idle_timeout` bounds each wait on the endpoint, not the whole
    /// exchange: a long answer that keeps streaming is never cut off.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        idle_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = idle_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            idle_timeout,
        })
    }

    /// Create a provider from a resolved endpoint config and its secret
    pub fn from_config(
        config: &ModelEndpointConfig,
        api_key: &str,
        idle_timeout: Option<Duration>,
    ) -> Result<Self> {
        Self::new(config.api_base.clone(), api_key, idle_timeout)
    }

    fn completions_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), CHAT_COMPLETIONS_PATH)
    }

    async fn post(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let url = self.completions_url();
        tracing::debug!("POST {} (model={}, stream={})", url, request.model, request.stream);

        let send = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(request)
            .send();
        let response = with_idle_timeout(self.idle_timeout, send)
            .await?
            .map_err(|e| LlmError::Transport(format!("Failed to send request to {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LlmError::Transport(format!(
                "Chat completion request failed\n\nStatus: {}\nBody: {}",
                status, error_body
            )));
        }

        Ok(response)
    }

    /// Read a single-shot response and forward it as one fragment
    async fn send_once(
        &self,
        request: &ChatRequest,
    ) -> Result<mpsc::Receiver<Result<Fragment>>> {
        let response = self.post(request).await?;
        let body: OpenAIResponse = with_idle_timeout(self.idle_timeout, response.json())
            .await?
            .map_err(|e| {
                LlmError::Transport(format!("Failed to parse chat completion response: {}", e))
            })?;

        let message = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                LlmError::Transport("Endpoint returned no choices in response".to_string())
            })?;

        let (tx, rx) = mpsc::channel(1);
        if let Some(fragment) = Fragment::whole(message.reasoning_content, message.content) {
            // Capacity covers the single fragment, so this never waits
            let _ = tx.send(Ok(fragment)).await;
        }
        Ok(rx)
    }

    /// Open an SSE stream and parse it on a background task
    async fn send_streaming(
        &self,
        request: &ChatRequest,
    ) -> Result<mpsc::Receiver<Result<Fragment>>> {
        let response = self.post(request).await?;
        let idle_timeout = self.idle_timeout;
        let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            tracing::debug!("[STREAM] streaming task started");
            let mut stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            'read: loop {
                let chunk = match with_idle_timeout(idle_timeout, stream.next()).await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Stream stalled: {}", e);
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                };
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!("Stream error: {}", e);
                        let err = LlmError::Transport(format!("Stream interrupted: {}", e));
                        let _ = tx.send(Err(err)).await;
                        return;
                    }
                };
                buffer.extend_from_slice(&bytes);

                while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                    let line = String::from_utf8_lossy(&line_bytes);

                    match parse_sse_line(&line) {
                        Ok(SseLine::Fragments(fragments)) => {
                            for fragment in fragments {
                                if tx.send(Ok(fragment)).await.is_err() {
                                    // Receiver gone, nobody is listening
                                    return;
                                }
                            }
                        }
                        Ok(SseLine::Skip) => {}
                        Ok(SseLine::Done) => {
                            tracing::debug!("[STREAM] received [DONE]");
                            break 'read;
                        }
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    }
                }
            }

            // A final line without a trailing newline
            if !buffer.is_empty() {
                let line = String::from_utf8_lossy(&buffer).into_owned();
                match parse_sse_line(&line) {
                    Ok(SseLine::Fragments(fragments)) => {
                        for fragment in fragments {
                            let _ = tx.send(Ok(fragment)).await;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                    }
                }
            }

            tracing::debug!("[STREAM] streaming task finished");
        });

        Ok(rx)
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    async fn send_chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<mpsc::Receiver<Result<Fragment>>> {
        if request.stream {
            self.send_streaming(request).await
        } else {
            self.send_once(request).await
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Await `fut`, failing with a transport error if the endpoint stays silent
/// for longer than `limit`.
async fn with_idle_timeout<F: Future>(limit: Option<Duration>, fut: F) -> Result<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            LlmError::Transport(format!("Endpoint sent nothing for {}s", limit.as_secs_f32()))
        }),
        None => Ok(fut.await),
    }
}

/// What one line of an SSE body means to the assembler
#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    Fragments(Vec<Fragment>),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> Result<SseLine> {
    let line = line.trim_end_matches(['\r', '\n']);

    // Blank separators, comments and `event:`/`id:` fields carry no text
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();

    if data.is_empty() {
        return Ok(SseLine::Skip);
    }
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let chunk: OpenAIStreamChunk = serde_json::from_str(data)
        .map_err(|e| LlmError::Transport(format!("Malformed stream chunk: {} ({})", e, data)))?;

    if let Some(error) = chunk.error {
        return Err(LlmError::Transport(format!("Endpoint reported an error: {}", error)));
    }

    let fragments = chunk
        .choices
        .into_iter()
        .next()
        .map(|choice| Fragment::from_delta(choice.delta.reasoning_content, choice.delta.content))
        .unwrap_or_default();

    if fragments.is_empty() {
        Ok(SseLine::Skip)
    } else {
        Ok(SseLine::Fragments(fragments))
    }
}

// Wire types

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIStreamChoice {
    #[serde(default)]
    delta: OpenAIDelta,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OpenAIDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}
