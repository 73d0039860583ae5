//! leakjudge Core Library
//!
//! Judged evaluation of forensic leakage summaries and multi-run aggregation
//! of the resulting scores.
//!
//! ## Flow
//!
//! - [`harness::EvaluationHarness`] sends each dataset entry to a [`judge::Judge`],
//!   extracts scores with [`extract::extract`] and derives composites with
//!   [`composite::derive`], producing one [`RunResultDocument`] per run.
//! - [`loader`] loads the run documents of N runs in a stable order.
//! - [`aggregate::MetricAggregator`] reduces them to per-entity and overall
//!   mean / population std.

pub mod aggregate;
pub mod composite;
pub mod domain;
pub mod extract;
pub mod fakes;
pub mod harness;
pub mod judge;
pub mod loader;
pub mod obs;
pub mod reporting;
pub mod telemetry;

pub use domain::{
    CompositeScores, EntityResult, EvaluationDataset, EvaluationDatasetEntry, LeakJudgeError,
    LoadError, MetricMap, PrimaryScores, Result, RunResultDocument, COMPOSITE_METRICS,
    PRIMARY_METRICS,
};

pub use aggregate::{aggregate, AggregatedEntity, AggregatedOutput, MetricAggregator, OverallSummary};
pub use extract::{extract, ScoreRecord};
pub use harness::{EvaluationHarness, HarnessOutcome, JudgeFailure, RunArtifact};
pub use judge::{Judge, JudgeConfig, JudgeError, JudgeRequest, OpenAiJudge};
pub use loader::{discover, load, load_dir, LoadedRun};
pub use reporting::{render_overall_md, write_aggregated_json, write_json_atomic, write_overall_md};
pub use telemetry::init_tracing;

/// leakjudge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
