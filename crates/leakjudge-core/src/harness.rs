//! Judged evaluation harness.
//!
//! One [`EvaluationHarness::run`] is one pass over a dataset: every entry is
//! sent to the judge exactly once, the response is run through
//! [`crate::extract::extract`], and entries that yield a score record end up
//! in the run document. Repetition across runs is the caller's business
//! ([`EvaluationHarness::run_repeated`] is the usual driver).
//!
//! Entries whose response has no score object are left out of the document
//! and listed in `extraction_failures`; aggregation later reads them as zeros.
//! A failed judge call skips only that entry (`call_failures`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::composite;
use crate::domain::{
    EntityResult, EvaluationDataset, EvaluationDatasetEntry, LeakJudgeError, PrimaryScores, Result,
    RunResultDocument,
};
use crate::extract::extract;
use crate::judge::{build_request, Judge, JudgeError};
use crate::obs;
use crate::reporting::write_json_atomic;

/// A judge call that failed for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeFailure {
    pub entity_id: String,
    pub error: String,
}

/// Result of one harness pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarnessOutcome {
    /// Scored entities.
    pub document: RunResultDocument,
    /// Entities whose judge response contained no score object.
    pub extraction_failures: Vec<String>,
    /// Entities whose judge call failed.
    pub call_failures: Vec<JudgeFailure>,
}

impl HarnessOutcome {
    /// Entities that contributed no record to this run.
    pub fn skipped(&self) -> usize {
        self.extraction_failures.len() + self.call_failures.len()
    }
}

/// Outcome of scoring a single entry.
#[derive(Debug)]
pub enum EntryOutcome {
    Scored(EntityResult),
    ExtractionFailed { raw_response: String },
    CallFailed(JudgeError),
}

/// A run document written by [`EvaluationHarness::run_repeated`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunArtifact {
    pub path: PathBuf,
    pub outcome: HarnessOutcome,
}

/// Drives a [`Judge`] over an [`EvaluationDataset`].
pub struct EvaluationHarness {
    judge: Arc<dyn Judge>,
}

impl EvaluationHarness {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self { judge }
    }

    /// Score one dataset entry.
    pub async fn score_entry(&self, entity_id: &str, entry: &EvaluationDatasetEntry) -> EntryOutcome {
        let request = build_request(entry);
        let raw_response = match self.judge.complete(&request).await {
            Ok(text) => text,
            Err(e) => return EntryOutcome::CallFailed(e),
        };
        tracing::debug!(entity = %entity_id, raw_response = %raw_response, "judge responded");

        let Some(record) = extract(&raw_response) else {
            return EntryOutcome::ExtractionFailed { raw_response };
        };

        let primary = PrimaryScores::from_record(&record);
        let derived = composite::derive(&primary);
        EntryOutcome::Scored(EntityResult::new(entity_id, &primary, &derived))
    }

    /// One pass over `dataset`, in entity-id order.
    pub async fn run(&self, dataset: &EvaluationDataset) -> HarnessOutcome {
        obs::emit_run_started(dataset.len(), &dataset.digest());

        let mut outcome = HarnessOutcome::default();
        for (entity_id, entry) in dataset.iter() {
            match self.score_entry(entity_id, entry).await {
                EntryOutcome::Scored(result) => {
                    obs::emit_entity_scored(entity_id, result.evaluation.len());
                    outcome.document.insert(result);
                }
                EntryOutcome::ExtractionFailed { raw_response } => {
                    obs::emit_extraction_failed(entity_id, &raw_response);
                    outcome.extraction_failures.push(entity_id.to_string());
                }
                EntryOutcome::CallFailed(error) => {
                    obs::emit_judge_failed(entity_id, &error);
                    outcome.call_failures.push(JudgeFailure {
                        entity_id: entity_id.to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        obs::emit_run_finished(
            outcome.document.len(),
            outcome.extraction_failures.len(),
            outcome.call_failures.len(),
        );
        outcome
    }

    /// Run `runs` independent passes, writing each document to
    /// `<output_dir>/<prefix><NN>.json`.
    ///
    /// Run numbers start at 1 and are zero-padded to the width of `runs`, so
    /// the files sort in run order.
    ///
    /// Refuses to start when `output_dir` already holds `<prefix>*.json`
    /// files: a later aggregation over the directory would otherwise mix
    /// runs from separate invocations.
    pub async fn run_repeated(
        &self,
        dataset: &EvaluationDataset,
        runs: usize,
        output_dir: &Path,
        prefix: &str,
    ) -> Result<Vec<RunArtifact>> {
        if runs == 0 {
            return Err(LeakJudgeError::InvalidRunCount(runs));
        }
        if output_dir.is_dir() {
            let existing = crate::loader::discover(output_dir, prefix)?;
            if !existing.is_empty() {
                return Err(LeakJudgeError::ExistingRuns {
                    dir: output_dir.to_path_buf(),
                    prefix: prefix.to_string(),
                    count: existing.len(),
                });
            }
        }
        std::fs::create_dir_all(output_dir)?;

        let mut artifacts = Vec::with_capacity(runs);
        for index in 1..=runs {
            let name = run_file_name(prefix, index, runs);
            let outcome = self.run(dataset).instrument(obs::run_span(&name)).await;
            let path = output_dir.join(&name);
            write_json_atomic(&path, &outcome.document)?;
            tracing::info!(path = %path.display(), entities = outcome.document.len(), "run document written");

            artifacts.push(RunArtifact { path, outcome });
        }
        Ok(artifacts)
    }
}

/// File name for run `index` of `total`: `<prefix><index>.json`, zero-padded.
pub fn run_file_name(prefix: &str, index: usize, total: usize) -> String {
    let width = total.max(1).to_string().len();
    format!("{prefix}{index:0width$}.json")
}
