//! Domain-level error taxonomy for leakjudge.

use std::path::PathBuf;

/// Errors produced while loading run documents or evaluation datasets.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("results directory not readable: {path}: {source}")]
    Discover {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Path of the source that failed to load.
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Read { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::Discover { path, .. } => path,
        }
    }
}

/// leakjudge domain errors.
#[derive(Debug, thiserror::Error)]
pub enum LeakJudgeError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("{dir} already holds {count} run document(s) with prefix {prefix:?}")]
    ExistingRuns {
        dir: PathBuf,
        prefix: String,
        count: usize,
    },

    #[error("invalid run count: {0} (must be at least 1)")]
    InvalidRunCount(usize),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for leakjudge domain operations.
pub type Result<T> = std::result::Result<T, LeakJudgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_path() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = LoadError::Parse {
            path: PathBuf::from("runs/droidbench03.json"),
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to parse"));
        assert!(msg.contains("droidbench03.json"));
        assert_eq!(err.path(), std::path::Path::new("runs/droidbench03.json"));
    }

    #[test]
    fn test_load_error_converts_into_domain_error() {
        let err: LeakJudgeError = LoadError::Read {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
        .into();
        assert!(err.to_string().starts_with("load error"));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_existing_runs_display_names_dir_and_prefix() {
        let err = LeakJudgeError::ExistingRuns {
            dir: PathBuf::from("results"),
            prefix: "droidbench".to_string(),
            count: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("results"));
        assert!(msg.contains("10 run document(s)"));
        assert!(msg.contains("\"droidbench\""));
    }

    #[test]
    fn test_invalid_run_count_display() {
        let err = LeakJudgeError::InvalidRunCount(0);
        assert!(err.to_string().contains("at least 1"));
    }
}
