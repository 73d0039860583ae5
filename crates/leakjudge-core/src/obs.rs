//! Structured observability hooks for evaluation and aggregation runs.
//!
//! Each function emits one event with a stable `event` field so that JSON log
//! output can be filtered per lifecycle step.

use tracing::{info, warn};

/// Span tagging every event of one harness run with the run's file name.
///
/// Attach with [`tracing::Instrument`] rather than entering it, since the run
/// awaits judge calls:
///
/// ```ignore
/// harness.run(&dataset).instrument(run_span("evaluation_results03")).await;
/// ```
pub fn run_span(run: &str) -> tracing::Span {
    tracing::info_span!("leakjudge.run", run = %run)
}

/// Emit event: a harness run started over `entities` dataset entries.
pub fn emit_run_started(entities: usize, dataset_digest: &str) {
    info!(
        event = "run.started",
        entities = entities,
        dataset_digest = %dataset_digest,
    );
}

/// Emit event: one entity scored.
pub fn emit_entity_scored(entity_id: &str, evaluation_fields: usize) {
    info!(event = "entity.scored", entity = %entity_id, fields = evaluation_fields);
}

/// Emit event: no score object could be extracted (warning level).
///
/// The raw response is included so the judge's output can be inspected.
pub fn emit_extraction_failed(entity_id: &str, raw_response: &str) {
    warn!(
        event = "entity.extraction_failed",
        entity = %entity_id,
        raw_response = %raw_response,
    );
}

/// Emit event: the judge call itself failed (warning level).
pub fn emit_judge_failed(entity_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "entity.judge_failed", entity = %entity_id, error = %error);
}

/// Emit event: a harness run finished.
pub fn emit_run_finished(scored: usize, extraction_failures: usize, call_failures: usize) {
    info!(
        event = "run.finished",
        scored = scored,
        extraction_failures = extraction_failures,
        call_failures = call_failures,
    );
}

/// Emit event: aggregation over `runs` documents finished.
pub fn emit_aggregate_finished(runs: usize, entities: usize) {
    info!(event = "aggregate.finished", runs = runs, entities = entities);
}
