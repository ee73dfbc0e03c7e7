use ani_core::{ChatMessage, LLMResponse, ModelGateway, Usage};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::retry::retry_with_backoff;

/// Base address of the xAI OpenAI-compatible API.
pub const XAI_BASE_URL: &str = "https://api.x.ai/v1";

/// Model used for every completion.
pub const XAI_MODEL: &str = "grok-3";

/// Limits applied to each completion request.
///
/// The default imposes no timeout and performs no retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPolicy {
    pub timeout: Option<Duration>,
    pub retry_backoff: Vec<Duration>,
}

pub struct XaiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    policy: RequestPolicy,
}

impl XaiProvider {
    pub fn new(api_key: String, policy: RequestPolicy) -> anyhow::Result<Self> {
        info!("Creating XaiProvider");
        let mut builder = Client::builder();
        if let Some(timeout) = policy.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            base_url: XAI_BASE_URL.to_string(),
            policy,
        })
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &serde_json::Value) -> anyhow::Result<LLMResponse> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        parse_completion(&response)
    }
}

/// Extract the first choice from a chat completion body.
///
/// A missing, non-string or blank reply is an error.
pub fn parse_completion(response: &serde_json::Value) -> anyhow::Result<LLMResponse> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?;

    if content.trim().is_empty() {
        anyhow::bail!("Invalid response format: empty content");
    }

    let usage = response["usage"].as_object().map(|u| Usage {
        prompt_tokens: token_count(u.get("prompt_tokens")),
        completion_tokens: token_count(u.get("completion_tokens")),
        total_tokens: token_count(u.get("total_tokens")),
    });

    Ok(LLMResponse {
        content: content.to_string(),
        usage,
    })
}

/// Missing or out-of-range counts read as zero.
fn token_count(value: Option<&serde_json::Value>) -> u32 {
    value
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

#[async_trait]
impl ModelGateway for XaiProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<LLMResponse> {
        let request = json!({
            "model": XAI_MODEL,
            "messages": messages,
        });

        info!(
            "Sending request to xAI API: model={}, messages={}",
            XAI_MODEL,
            messages.len()
        );

        let response =
            retry_with_backoff(|| self.try_send(&request), &self.policy.retry_backoff).await?;

        if let Some(usage) = response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        info!("Received response from xAI API");
        Ok(response)
    }

    fn model(&self) -> &str {
        XAI_MODEL
    }
}
