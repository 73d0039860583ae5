//! The language-model judge seam.
//!
//! [`Judge`] is the only contact point with the completion service: a request
//! goes in, free text comes out. Everything after that (extraction, defaults,
//! composites) lives in the harness.

pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::{JudgeConfig, OpenAiJudge};
pub use prompt::build_request;

/// Errors produced by a judge call.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("judge API key not configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("judge transport error: {0}")]
    Transport(String),

    #[error("judge returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("judge response had no message content")]
    EmptyResponse,
}

impl From<reqwest::Error> for JudgeError {
    fn from(err: reqwest::Error) -> Self {
        JudgeError::Transport(err.to_string())
    }
}

/// A fully rendered judge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeRequest {
    /// System-role instruction.
    pub system: String,
    /// User-role prompt embedding both summaries.
    pub prompt: String,
}

/// Injectable completion service.
///
/// Implement this trait to plug in a real model API or a test stub. One call
/// per entity per run; implementations must not retry internally.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Send `request` and return the raw response text.
    async fn complete(&self, request: &JudgeRequest) -> Result<String, JudgeError>;
}
