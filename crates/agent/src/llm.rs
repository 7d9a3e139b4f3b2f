use std::time::{Duration, Instant};

use async_trait::async_trait;
use quotedraft_core::config::LlmConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DRAFT_TEMPERATURE: f64 = 0.2;
pub const DRAFT_MAX_TOKENS: u32 = 500;
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("missing provider credential")]
    MissingApiKey,
    #[error("provider request timed out after {0}s")]
    Timeout(u64),
    #[error("provider request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn from_config(llm: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = llm.credential().cloned().ok_or(LlmError::MissingApiKey)?;
        Ok(Self {
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            model: llm.model.clone(),
            api_key,
            timeout: Duration::from_secs(llm.timeout_secs),
        })
    }
}

/// Chat-completion client for OpenAI-compatible endpoints (Groq by default).
#[derive(Clone, Debug)]
pub struct ChatCompletionClient {
    http: Client,
    settings: ProviderSettings,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
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

impl ChatCompletionClient {
    pub fn new(settings: ProviderSettings) -> Result<Self, LlmError> {
        let http =
            Client::builder().timeout(settings.timeout).build().map_err(LlmError::Transport)?;
        Ok(Self { http, settings })
    }

    pub fn from_config(llm: &LlmConfig) -> Result<Self, LlmError> {
        Self::new(ProviderSettings::from_config(llm)?)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url)
    }

    fn map_transport(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout(self.settings.timeout.as_secs())
        } else {
            LlmError::Transport(error)
        }
    }
}

#[async_trait]
impl LlmClient for ChatCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let started = Instant::now();
        let request = ChatRequest {
            model: &self.settings.model,
            messages,
            temperature: DRAFT_TEMPERATURE,
            max_tokens: DRAFT_MAX_TOKENS,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.settings.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| self.map_transport(error))?;

        let status = response.status();
        let body = response.text().await.map_err(|error| self.map_transport(error))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        debug!(
            event_name = "agent.llm.response",
            model = %self.settings.model,
            status = status.as_u16(),
            elapsed_ms,
            "chat completion returned"
        );

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|error| {
            LlmError::MalformedResponse(format!("could not decode body: {error}"))
        })?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("response has no choices".to_string()))?;
        let content = choice.message.content.ok_or_else(|| {
            LlmError::MalformedResponse("choices[0].message.content is missing".to_string())
        })?;

        Ok(content.trim().to_string())
    }
}
