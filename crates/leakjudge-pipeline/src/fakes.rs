//! In-memory stage fakes (testing only)

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PipelineError, Result};
use crate::stage::{entity_id_of, ProcessingStage, SummarizationStage};

#[derive(Debug, Clone)]
enum Behavior {
    Empty,
    Fail(String),
}

/// Processing stage driven by a per-entity table.
///
/// Entities not in the table report extracted content.
#[derive(Debug, Default)]
pub struct FakeProcessingStage {
    behavior: HashMap<String, Behavior>,
    calls: Mutex<Vec<String>>,
}

impl FakeProcessingStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// `entity_id` runs but extracts nothing.
    pub fn empty(mut self, entity_id: &str) -> Self {
        self.behavior.insert(entity_id.to_string(), Behavior::Empty);
        self
    }

    /// `entity_id` fails with `message`.
    pub fn failing(mut self, entity_id: &str, message: &str) -> Self {
        self.behavior
            .insert(entity_id.to_string(), Behavior::Fail(message.to_string()));
        self
    }

    /// Entity ids processed so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessingStage for FakeProcessingStage {
    async fn process(&self, entity_path: &Path, _output_root: &Path) -> Result<bool> {
        let entity_id = entity_id_of(entity_path);
        self.calls.lock().unwrap().push(entity_id.clone());
        match self.behavior.get(&entity_id) {
            None => Ok(true),
            Some(Behavior::Empty) => Ok(false),
            Some(Behavior::Fail(message)) => Err(PipelineError::Stage {
                stage: "processing".to_string(),
                message: message.clone(),
            }),
        }
    }
}

/// Summarization stage that records the entities it was asked to summarize.
#[derive(Debug, Default)]
pub struct RecordingSummarizer {
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarizing `entity_id` fails.
    pub fn failing(mut self, entity_id: &str) -> Self {
        self.failing.push(entity_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarizationStage for RecordingSummarizer {
    async fn summarize(&self, entity_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(entity_id.to_string());
        if self.failing.iter().any(|id| id == entity_id) {
            return Err(PipelineError::Stage {
                stage: "summarization".to_string(),
                message: format!("summarizer rejected {entity_id}"),
            });
        }
        Ok(())
    }
}
