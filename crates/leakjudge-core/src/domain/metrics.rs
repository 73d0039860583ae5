//! Metric names and the typed-default metric map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Judged dimension: does the summary name the right sensitive data types?
pub const DATA_TYPE_IDENTIFICATION: &str = "data_type_identification";
/// Judged dimension: is the source -> transformation -> sink flow right?
pub const DATA_PROPAGATION_ACCURACY: &str = "data_propagation_accuracy";
/// Judged dimension: are the final sink methods right?
pub const SINK_FUNCTION_MATCH: &str = "sink_function_match";
/// Judged dimension: is the leaked / not-leaked verdict right?
pub const LEAKAGE_INFERENCE: &str = "leakage_inference";
/// Judged dimension: clarity and grammar.
pub const COHERENCE_AND_FLUENCY: &str = "coherence_and_fluency";

pub const COHERENCE: &str = "coherence";
pub const CONSISTENCY: &str = "consistency";
pub const RELEVANCE: &str = "relevance";
pub const FLUENCY: &str = "fluency";

/// The five primary (judged) metrics, in report order.
pub const PRIMARY_METRICS: [&str; 5] = [
    DATA_TYPE_IDENTIFICATION,
    DATA_PROPAGATION_ACCURACY,
    SINK_FUNCTION_MATCH,
    LEAKAGE_INFERENCE,
    COHERENCE_AND_FLUENCY,
];

/// The four composite (derived) metrics, in report order.
pub const COMPOSITE_METRICS: [&str; 4] = [COHERENCE, CONSISTENCY, RELEVANCE, FLUENCY];

/// Metric name -> value, as stored in run documents.
///
/// Values are kept as raw JSON so hand-edited or older run files with extra
/// keys (an `"explanation"` string, a `null` score) still load. Absent or
/// non-numeric metrics read as `0.0` through [`MetricMap::value_or_zero`],
/// the one accessor used everywhere a metric is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricMap(BTreeMap<String, Value>);

impl MetricMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an integer score.
    pub fn insert(&mut self, name: impl Into<String>, value: u8) {
        self.0.insert(name.into(), Value::from(value));
    }

    /// Builder-style [`MetricMap::insert`].
    pub fn with(mut self, name: impl Into<String>, value: u8) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of `name`, or `0.0` when the metric is absent or not a number.
    pub fn value_or_zero(&self, name: &str) -> f64 {
        self.0.get(name).and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Owned list of metric names, defaulting to the primary set.
pub fn primary_metric_names() -> Vec<String> {
    PRIMARY_METRICS.iter().map(|m| m.to_string()).collect()
}

/// Owned list of metric names, defaulting to the composite set.
pub fn composite_metric_names() -> Vec<String> {
    COMPOSITE_METRICS.iter().map(|m| m.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_or_zero_for_missing_metric() {
        let map = MetricMap::new().with(COHERENCE, 4);
        assert_eq!(map.value_or_zero(COHERENCE), 4.0);
        assert_eq!(map.value_or_zero(FLUENCY), 0.0);
    }

    #[test]
    fn test_metric_map_reads_float_values() {
        let map: MetricMap = serde_json::from_str(r#"{"relevance": 3.5}"#).expect("parse");
        assert_eq!(map.value_or_zero(RELEVANCE), 3.5);
    }

    #[test]
    fn test_non_numeric_values_read_as_zero() {
        let map: MetricMap = serde_json::from_str(
            r#"{"relevance": 4, "fluency": null, "coherence": "high", "explanation": "flows match"}"#,
        )
        .expect("parse");
        assert_eq!(map.len(), 4);
        assert_eq!(map.value_or_zero(RELEVANCE), 4.0);
        assert_eq!(map.value_or_zero(FLUENCY), 0.0);
        assert_eq!(map.value_or_zero(COHERENCE), 0.0);
    }

    #[test]
    fn test_integer_scores_serialize_without_fraction() {
        let map = MetricMap::new().with(CONSISTENCY, 3);
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"consistency":3}"#);
    }

    #[test]
    fn test_default_name_sets() {
        assert_eq!(primary_metric_names().len(), 5);
        assert_eq!(composite_metric_names(), vec!["coherence", "consistency", "relevance", "fluency"]);
    }
}
