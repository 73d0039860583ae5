//! Pipeline error taxonomy.

use std::path::PathBuf;

/// Errors produced by the pipeline orchestrator and its stages.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("entity not found: {}", .0.display())]
    EntityNotFound(PathBuf),

    #[error("failed to read settings {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("working directory not usable: {path}: {source}")]
    WorkingDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("entity output directory not usable: {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stage {stage} has empty command")]
    EmptyCommand { stage: String },

    #[error("stage {stage} could not run: {source}")]
    Spawn {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stage {stage} timed out after {secs} seconds")]
    Timeout { stage: String, secs: u64 },

    #[error("stage {stage} exited with code {code}: {stderr}")]
    StageExit {
        stage: String,
        code: i32,
        stderr: String,
    },

    #[error("stage {stage} failed: {message}")]
    Stage { stage: String, message: String },

    #[error("illegal state transition for {entity}: {from} -> {to}")]
    IllegalTransition {
        entity: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("report error: {0}")]
    Report(#[from] leakjudge_core::LeakJudgeError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
