//! leakjudge pipeline - drives the per-entity processing and summarization
//! stages over one entity or a whole working directory.
//!
//! Provides a pipeline orchestrator that:
//! - Discovers entity files in the configured working directory
//! - Runs the processing stage, then the summarization stage, per entity
//! - Classifies every entity through an explicit state machine
//! - Reports failed and empty entities at the end of the batch

pub mod error;
pub mod fakes;
pub mod obs;
pub mod orchestrator;
pub mod report;
pub mod runner;
pub mod settings;
pub mod stage;
pub mod state;

// Re-export key types
pub use error::{PipelineError, Result};
pub use orchestrator::{PipelineOrchestrator, RunMode};
pub use report::{BatchReport, EntityOutcome};
pub use runner::{CommandResult, CommandRunner};
pub use settings::Settings;
pub use stage::{CommandStage, ProcessingStage, SummarizationStage};
pub use state::{EntityRun, EntityState};
