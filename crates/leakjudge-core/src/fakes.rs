//! In-memory judge fakes (testing only)
//!
//! `ScriptedJudge` replays canned responses and records the requests it saw;
//! `FailingJudge` fails every call. Neither touches the network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::judge::{Judge, JudgeError, JudgeRequest};

/// Judge that answers from a script.
///
/// Responses are consumed in order; once the script is exhausted the
/// `fallback` response (if any) is returned for every further call, otherwise
/// the call fails with [`JudgeError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct ScriptedJudge {
    script: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<JudgeRequest>>,
}

impl ScriptedJudge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Judge that returns `response` for every call.
    pub fn always(response: &str) -> Self {
        Self {
            fallback: Some(response.to_string()),
            ..Self::default()
        }
    }

    /// Queue a successful response.
    pub fn respond(self, response: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(response.to_string()));
        self
    }

    /// Queue a transport failure.
    pub fn fail(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<JudgeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Judge for ScriptedJudge {
    async fn complete(&self, request: &JudgeRequest) -> Result<String, JudgeError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(JudgeError::Transport(message)),
            None => self.fallback.clone().ok_or(JudgeError::EmptyResponse),
        }
    }
}

/// Judge whose every call fails with a transport error.
#[derive(Debug)]
pub struct FailingJudge {
    message: String,
}

impl FailingJudge {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Judge for FailingJudge {
    async fn complete(&self, _request: &JudgeRequest) -> Result<String, JudgeError> {
        Err(JudgeError::Transport(self.message.clone()))
    }
}
