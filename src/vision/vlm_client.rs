// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision client for OpenAI-compatible chat-completions APIs
//!
//! Used for both the OpenAI and the xAI (Grok) backends; they differ only in
//! endpoint, key and model name.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::image_utils::to_data_url;
use super::provider::{Description, DescriptionProvider, VisionError};

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

const DESCRIBE_PROMPT: &str =
    "Describe this image in detail, including objects, scene, colors, and any text visible.";

const DESCRIBE_MAX_TOKENS: u32 = 300;

/// Connection settings for one OpenAI-compatible backend
#[derive(Debug, Clone)]
pub struct VlmClientConfig {
    /// Provider name used in logs and errors ("openai", "grok")
    pub provider: String,
    /// Base URL, e.g. `https://api.openai.com`
    pub endpoint: String,
    pub api_key: String,
    pub model_name: String,
    pub timeout_secs: u64,
}

/// Client for an OpenAI-compatible vision API
pub struct VlmClient {
    client: Client,
    provider: String,
    endpoint: String,
    api_key: String,
    model_name: String,
}

impl VlmClient {
    /// Create a new VLM client
    pub fn new(config: VlmClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        info!(
            "VLM client configured: provider={}, endpoint={}, model={}",
            config.provider, endpoint, config.model_name
        );

        Ok(Self {
            client,
            provider: config.provider,
            endpoint,
            api_key: config.api_key,
            model_name: config.model_name,
        })
    }

    fn build_request(&self, image: &[u8]) -> ChatRequest {
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": DESCRIBE_PROMPT},
                    {"type": "image_url", "image_url": {"url": to_data_url(image)}}
                ]),
            }],
            max_tokens: DESCRIBE_MAX_TOKENS,
            temperature: 0.3,
        }
    }

    fn parse_response(&self, chat_response: ChatResponse) -> Result<Description, VisionError> {
        let description = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| VisionError::failure(&self.provider, "response contained no description"))?;

        Ok(Description {
            description,
            model: chat_response
                .model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| self.model_name.clone()),
        })
    }
}

#[async_trait]
impl DescriptionProvider for VlmClient {
    async fn describe(&self, image: &[u8]) -> Result<Description, VisionError> {
        let start = std::time::Instant::now();
        let request = self.build_request(image);

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VisionError::failure(&self.provider, "request timed out")
                } else {
                    VisionError::failure(&self.provider, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::failure(
                &self.provider,
                format!("HTTP {}: {}", status.as_u16(), body),
            ));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            VisionError::failure(&self.provider, format!("JSON parse error: {}", e))
        })?;

        let description = self.parse_response(chat_response)?;
        debug!(
            "{} described image in {}ms (model={})",
            self.provider,
            start.elapsed().as_millis(),
            description.model
        );
        Ok(description)
    }

    fn name(&self) -> &str {
        &self.provider
    }
}
