//! Run document discovery and loading.
//!
//! Sources are always sorted by path before loading so that aggregation is
//! reproducible for the same input set. Loading is fail-fast: the first source
//! that cannot be read or parsed aborts the whole load.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::{LoadError, RunResultDocument};

/// A run document together with the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRun {
    pub source: PathBuf,
    pub document: RunResultDocument,
}

/// Find `<prefix>*.json` files directly inside `dir`, sorted by file name.
pub fn discover(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Discover {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut matched = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Discover {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(prefix) && path.extension().is_some_and(|ext| ext == "json") {
            matched.push(path);
        }
    }

    matched.sort();
    debug!(dir = %dir.display(), prefix, count = matched.len(), "discovered run documents");
    Ok(matched)
}

/// Load run documents from `sources`, sorted lexicographically by path.
pub fn load(sources: &[PathBuf]) -> Result<Vec<LoadedRun>, LoadError> {
    let mut sorted = sources.to_vec();
    sorted.sort();

    sorted
        .into_iter()
        .map(|source| {
            let document = load_document(&source)?;
            debug!(source = %source.display(), entities = document.len(), "loaded run document");
            Ok(LoadedRun { source, document })
        })
        .collect()
}

/// Discover and load every `<prefix>*.json` run document in `dir`.
pub fn load_dir(dir: &Path, prefix: &str) -> Result<Vec<LoadedRun>, LoadError> {
    let sources = discover(dir, prefix)?;
    let runs = load(&sources)?;
    info!(dir = %dir.display(), runs = runs.len(), "loaded runs");
    Ok(runs)
}

/// Load a single run document.
pub fn load_document(path: &Path) -> Result<RunResultDocument, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn test_discover_filters_prefix_and_extension_and_sorts() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "droidbench02.json", "{}");
        write(dir.path(), "droidbench01.json", "{}");
        write(dir.path(), "droidbench10.json", "{}");
        write(dir.path(), "droidbench03.txt", "{}");
        write(dir.path(), "ucbench01.json", "{}");
        std::fs::create_dir(dir.path().join("droidbench_dir.json")).expect("mkdir");

        let found = discover(dir.path(), "droidbench").expect("discover");
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["droidbench01.json", "droidbench02.json", "droidbench10.json"]);
    }

    #[test]
    fn test_load_sorts_sources() {
        let dir = tempfile::tempdir().expect("tempdir");
        let b = write(dir.path(), "run_b.json", r#"{"B": {}}"#);
        let a = write(dir.path(), "run_a.json", r#"{"A": {}}"#);

        let runs = load(&[b, a]).expect("load");
        assert_eq!(runs.len(), 2);
        assert!(runs[0].source.ends_with("run_a.json"));
        assert!(runs[0].document.contains("A"));
        assert!(runs[1].document.contains("B"));
    }

    #[test]
    fn test_load_fails_fast_on_invalid_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = write(dir.path(), "run1.json", r#"{"A": {}}"#);
        let bad = write(dir.path(), "run2.json", "not json at all");

        let err = load(&[good, bad]).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.path().ends_with("run2.json"));
    }

    #[test]
    fn test_load_tolerates_non_numeric_evaluation_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let run = write(
            dir.path(),
            "run1.json",
            r#"{"A": {"apk_name": "A", "evaluation": {
                "data_type_identification": 4,
                "data_propagation_accuracy": 3,
                "sink_function_match": 5,
                "leakage_inference": null,
                "coherence_and_fluency": 4,
                "explanation": "flows match"
            }}}"#,
        );

        let runs = load(&[run]).expect("non-numeric values still load");
        let documents: Vec<_> = runs.into_iter().map(|r| r.document).collect();
        let out = crate::aggregate::aggregate(
            &documents,
            &crate::domain::metrics::primary_metric_names(),
            &crate::domain::metrics::composite_metric_names(),
        );
        let entity = &out.apks["A"];
        assert_eq!(entity.evaluation_runs["leakage_inference"], vec![0.0]);
        assert_eq!(entity.evaluation_runs["sink_function_match"], vec![5.0]);
        assert!(!entity.evaluation_runs.contains_key("explanation"));
    }

    #[test]
    fn test_missing_source_is_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load(&[dir.path().join("absent.json")]).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_missing_dir_is_discover_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = discover(&dir.path().join("nope"), "run").unwrap_err();
        assert!(matches!(err, LoadError::Discover { .. }));
    }

    #[test]
    fn test_load_dir_with_no_matches_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_dir(dir.path(), "run").expect("load").is_empty());
    }
}
