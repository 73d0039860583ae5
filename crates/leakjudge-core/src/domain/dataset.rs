//! Evaluation dataset: ground-truth and model summaries per entity.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::LoadError;

/// One entity's expert summary and model-generated summary.
///
/// Both are arbitrary JSON documents describing a leakage analysis; they are
/// passed to the judge verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDatasetEntry {
    pub ground_truth_summary: serde_json::Value,
    pub model_summary: serde_json::Value,
}

/// Entity id -> dataset entry. Iterates in entity-id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationDataset(BTreeMap<String, EvaluationDatasetEntry>);

impl EvaluationDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dataset file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, entry: EvaluationDatasetEntry) {
        self.0.insert(entity_id.into(), entry);
    }

    /// Builder-style [`EvaluationDataset::insert`].
    pub fn with_entry(mut self, entity_id: impl Into<String>, entry: EvaluationDatasetEntry) -> Self {
        self.insert(entity_id, entry);
        self
    }

    /// Keep only the given entities; returns how many entries were dropped.
    pub fn retain_entities<S: AsRef<str>>(&mut self, entity_ids: &[S]) -> usize {
        let keep: HashSet<&str> = entity_ids.iter().map(AsRef::as_ref).collect();
        let before = self.0.len();
        self.0.retain(|id, _| keep.contains(id.as_str()));
        before - self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EvaluationDatasetEntry)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// SHA256 hex digest of the JSON encoding: entity ids sorted, summaries
    /// with their keys in file order.
    ///
    /// Identifies which dataset a run was scored against in logs.
    pub fn digest(&self) -> String {
        let canonical = serde_json::to_vec(&self.0).unwrap_or_default();
        hex::encode(Sha256::digest(&canonical))
    }
}
