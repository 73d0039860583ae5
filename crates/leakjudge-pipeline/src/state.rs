//! Per-entity state machine.
//!
//! ```text
//! Pending -> Processing -> Succeeded
//!                       -> Failed { reason }
//!                       -> EmptyResult
//! ```
//!
//! Every other transition is rejected.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Where one entity is in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntityState {
    Pending,
    Processing,
    Succeeded,
    Failed { reason: String },
    /// Processing succeeded but extracted nothing.
    EmptyResult,
}

impl EntityState {
    pub fn name(&self) -> &'static str {
        match self {
            EntityState::Pending => "pending",
            EntityState::Processing => "processing",
            EntityState::Succeeded => "succeeded",
            EntityState::Failed { .. } => "failed",
            EntityState::EmptyResult => "empty_result",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EntityState::Succeeded | EntityState::Failed { .. } | EntityState::EmptyResult
        )
    }

    pub fn can_transition_to(&self, next: &EntityState) -> bool {
        matches!(
            (self, next),
            (EntityState::Pending, EntityState::Processing)
                | (EntityState::Processing, EntityState::Succeeded)
                | (EntityState::Processing, EntityState::Failed { .. })
                | (EntityState::Processing, EntityState::EmptyResult)
        )
    }
}

/// One entity and its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRun {
    entity_id: String,
    state: EntityState,
}

impl EntityRun {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: EntityState::Pending,
        }
    }

    pub fn state(&self) -> &EntityState {
        &self.state
    }

    /// Move to `next`, rejecting transitions the state machine does not allow.
    pub fn advance(&mut self, next: EntityState) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(PipelineError::IllegalTransition {
                entity: self.entity_id.clone(),
                from: self.state.name(),
                to: next.name(),
            });
        }
        self.state = next;
        Ok(())
    }

    pub fn into_state(self) -> EntityState {
        self.state
    }
}
