//! OpenAI-compatible chat-completions judge.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Judge, JudgeError, JudgeRequest};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Judge endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Base URL of the chat-completions API (without `/chat/completions`).
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Bearer token.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
        }
    }
}

impl JudgeConfig {
    /// Build a config from `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// `LEAKJUDGE_JUDGE_MODEL` and `LEAKJUDGE_JUDGE_TEMPERATURE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("LEAKJUDGE_JUDGE_MODEL").unwrap_or(defaults.model),
            temperature: std::env::var("LEAKJUDGE_JUDGE_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.temperature),
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Judge backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiJudge {
    config: JudgeConfig,
    api_key: String,
    http_client: reqwest::Client,
}

impl OpenAiJudge {
    /// Create a judge; fails when no API key is configured.
    pub fn new(config: JudgeConfig) -> Result<Self, JudgeError> {
        let api_key = config.api_key.clone().ok_or(JudgeError::MissingApiKey)?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("leakjudge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config,
            api_key,
            http_client,
        })
    }

    /// Create a judge from environment variables.
    pub fn from_env() -> Result<Self, JudgeError> {
        Self::new(JudgeConfig::from_env())
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }
}

#[async_trait]
impl Judge for OpenAiJudge {
    async fn complete(&self, request: &JudgeRequest) -> Result<String, JudgeError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, "sending judge request");
        let response = self
            .http_client
            .post(self.config.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(JudgeError::EmptyResponse)
    }
}
