//! Domain models for leakjudge.
//!
//! Canonical definitions for the core entities:
//! - `EntityResult`: one entity's primary and composite scores in one run
//! - `RunResultDocument`: all entity results of one run
//! - `EvaluationDataset`: ground-truth and model summaries to be judged
//! - `MetricMap`: metric name -> value with a zero default

pub mod dataset;
pub mod error;
pub mod metrics;
pub mod result;

// Re-export main types and errors
pub use dataset::{EvaluationDataset, EvaluationDatasetEntry};
pub use error::{LeakJudgeError, LoadError, Result};
pub use metrics::{MetricMap, COMPOSITE_METRICS, PRIMARY_METRICS};
pub use result::{CompositeScores, EntityResult, PrimaryScores, RunResultDocument};
