//! Structured lifecycle events for pipeline batches.

use tracing::{info, warn};
use uuid::Uuid;

use crate::state::EntityState;

/// Emit event: a batch started over `entities` entity files.
pub fn emit_batch_started(run_id: &Uuid, entities: usize) {
    info!(event = "batch.started", run_id = %run_id, entities = entities);
}

/// Emit event: one entity reached its terminal state.
pub fn emit_entity_classified(entity_id: &str, state: &EntityState) {
    match state {
        EntityState::Failed { reason } => warn!(
            event = "entity.classified",
            entity = %entity_id,
            state = state.name(),
            reason = %reason,
        ),
        _ => info!(
            event = "entity.classified",
            entity = %entity_id,
            state = state.name(),
        ),
    }
}

/// Emit event: a batch finished.
pub fn emit_batch_finished(run_id: &Uuid, succeeded: usize, failed: usize, empty: usize) {
    info!(
        event = "batch.finished",
        run_id = %run_id,
        succeeded = succeeded,
        failed = failed,
        empty = empty,
    );
}
