//! Per-run score records: primary scores, composite scores and run documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::metrics::{self, MetricMap};

/// Lowest valid judged score.
pub const MIN_SCORE: u8 = 1;
/// Highest valid judged score.
pub const MAX_SCORE: u8 = 5;

/// The five judged scores for one entity in one run.
///
/// Each field is in `1..=5` when the judge supplied a valid value and `0`
/// otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryScores {
    pub data_type_identification: u8,
    pub data_propagation_accuracy: u8,
    pub sink_function_match: u8,
    pub leakage_inference: u8,
    pub coherence_and_fluency: u8,
}

impl PrimaryScores {
    /// Read the five fields from an extracted score record.
    ///
    /// Missing, non-numeric and out-of-range fields read as `0`.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        Self {
            data_type_identification: score_field(record, metrics::DATA_TYPE_IDENTIFICATION),
            data_propagation_accuracy: score_field(record, metrics::DATA_PROPAGATION_ACCURACY),
            sink_function_match: score_field(record, metrics::SINK_FUNCTION_MATCH),
            leakage_inference: score_field(record, metrics::LEAKAGE_INFERENCE),
            coherence_and_fluency: score_field(record, metrics::COHERENCE_AND_FLUENCY),
        }
    }

    pub fn to_metric_map(&self) -> MetricMap {
        MetricMap::new()
            .with(metrics::DATA_TYPE_IDENTIFICATION, self.data_type_identification)
            .with(metrics::DATA_PROPAGATION_ACCURACY, self.data_propagation_accuracy)
            .with(metrics::SINK_FUNCTION_MATCH, self.sink_function_match)
            .with(metrics::LEAKAGE_INFERENCE, self.leakage_inference)
            .with(metrics::COHERENCE_AND_FLUENCY, self.coherence_and_fluency)
    }
}

/// The four derived scores; see [`crate::composite::derive`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeScores {
    pub coherence: u8,
    pub consistency: u8,
    pub relevance: u8,
    pub fluency: u8,
}

impl CompositeScores {
    pub fn to_metric_map(&self) -> MetricMap {
        MetricMap::new()
            .with(metrics::COHERENCE, self.coherence)
            .with(metrics::CONSISTENCY, self.consistency)
            .with(metrics::RELEVANCE, self.relevance)
            .with(metrics::FLUENCY, self.fluency)
    }
}

fn score_field(record: &Map<String, Value>, name: &str) -> u8 {
    let raw = match record.get(name) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match raw {
        Some(v) if (u64::from(MIN_SCORE)..=u64::from(MAX_SCORE)).contains(&v) => v as u8,
        Some(v) => {
            tracing::debug!(field = name, value = v, "score out of range, reading as 0");
            0
        }
        None => 0,
    }
}

/// One entity's scores in one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityResult {
    #[serde(rename = "apk_name", alias = "entity_id", default)]
    pub entity_id: String,

    /// Primary judged metrics.
    #[serde(default)]
    pub evaluation: MetricMap,

    /// Composite metrics derived from `evaluation`.
    #[serde(rename = "g_eval_scores", alias = "composite_scores", default)]
    pub composite_scores: MetricMap,
}

impl EntityResult {
    pub fn new(entity_id: impl Into<String>, primary: &PrimaryScores, composite: &CompositeScores) -> Self {
        Self {
            entity_id: entity_id.into(),
            evaluation: primary.to_metric_map(),
            composite_scores: composite.to_metric_map(),
        }
    }
}

/// All entity results of one run, keyed by entity id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunResultDocument(BTreeMap<String, EntityResult>);

impl RunResultDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, result: EntityResult) {
        self.0.insert(result.entity_id.clone(), result);
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityResult> {
        self.0.get(entity_id)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.0.contains_key(entity_id)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<EntityResult> for RunResultDocument {
    fn from_iter<I: IntoIterator<Item = EntityResult>>(iter: I) -> Self {
        let mut doc = Self::new();
        for result in iter {
            doc.insert(result);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_primary_scores_from_complete_record() {
        let scores = PrimaryScores::from_record(&record(json!({
            "data_type_identification": 4,
            "data_propagation_accuracy": 3,
            "sink_function_match": 5,
            "leakage_inference": 2,
            "coherence_and_fluency": 1
        })));
        assert_eq!(scores.data_type_identification, 4);
        assert_eq!(scores.data_propagation_accuracy, 3);
        assert_eq!(scores.sink_function_match, 5);
        assert_eq!(scores.leakage_inference, 2);
        assert_eq!(scores.coherence_and_fluency, 1);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let scores = PrimaryScores::from_record(&record(json!({"sink_function_match": 4})));
        assert_eq!(scores.sink_function_match, 4);
        assert_eq!(scores.data_type_identification, 0);
        assert_eq!(scores.coherence_and_fluency, 0);
    }

    #[test]
    fn test_unparseable_and_out_of_range_fields_read_as_zero() {
        let scores = PrimaryScores::from_record(&record(json!({
            "data_type_identification": "high",
            "data_propagation_accuracy": 9,
            "sink_function_match": 4.5,
            "leakage_inference": "3",
            "coherence_and_fluency": 5.0
        })));
        assert_eq!(scores.data_type_identification, 0);
        assert_eq!(scores.data_propagation_accuracy, 0);
        assert_eq!(scores.sink_function_match, 0);
        assert_eq!(scores.leakage_inference, 3);
        assert_eq!(scores.coherence_and_fluency, 5);
    }

    #[test]
    fn test_entity_result_uses_run_file_field_names() {
        let result = EntityResult::new(
            "DroidBench_Aliasing1",
            &PrimaryScores {
                data_type_identification: 4,
                ..Default::default()
            },
            &CompositeScores {
                coherence: 5,
                ..Default::default()
            },
        );
        let raw = serde_json::to_value(&result).expect("serialize");
        assert_eq!(raw["apk_name"], json!("DroidBench_Aliasing1"));
        assert_eq!(raw["evaluation"]["data_type_identification"], json!(4));
        assert_eq!(raw["g_eval_scores"]["coherence"], json!(5));
    }

    #[test]
    fn test_run_document_accepts_sparse_entries() {
        let doc: RunResultDocument = serde_json::from_value(json!({
            "A": {"evaluation": {"leakage_inference": 5}},
            "B": {"apk_name": "B", "composite_scores": {"fluency": 2}}
        }))
        .expect("parse");
        assert_eq!(doc.len(), 2);
        let a = doc.get("A").expect("A present");
        assert_eq!(a.evaluation.value_or_zero("leakage_inference"), 5.0);
        assert!(a.composite_scores.is_empty());
        let b = doc.get("B").expect("B present");
        assert_eq!(b.composite_scores.value_or_zero("fluency"), 2.0);
        assert_eq!(doc.entity_ids().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
