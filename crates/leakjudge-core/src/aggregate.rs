//! Multi-run metric aggregation.
//!
//! [`MetricAggregator`] folds [`RunResultDocument`]s one at a time into
//! per-entity run sequences, then [`MetricAggregator::finalize`] reduces them
//! in two levels:
//!
//! 1. run level -> entity level: mean and population std of each entity's
//!    per-run values;
//! 2. entity level -> corpus level: mean and population std of the per-entity
//!    means (not of the raw per-run values).
//!
//! # Missing data
//!
//! The entity set is the union over all folded runs. A run that lacks an
//! entity, or an entity record that lacks a metric, contributes `0.0` for that
//! run. Every run sequence therefore has exactly one value per folded run,
//! including runs folded before the entity first appeared.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::metrics::{composite_metric_names, primary_metric_names};
use crate::domain::{MetricMap, RunResultDocument};

/// Metric name -> per-run values, in run order.
pub type RunSeries = BTreeMap<String, Vec<f64>>;

/// Metric name -> reduced value.
pub type MetricStats = BTreeMap<String, f64>;

/// One entity's scores across all folded runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedEntity {
    pub apk_name: String,
    pub evaluation_runs: RunSeries,
    pub g_eval_runs: RunSeries,
    #[serde(default)]
    pub evaluation_mean: MetricStats,
    #[serde(default)]
    pub evaluation_std: MetricStats,
    #[serde(default)]
    pub g_eval_mean: MetricStats,
    #[serde(default)]
    pub g_eval_std: MetricStats,
}

impl AggregatedEntity {
    fn zero_filled(entity_id: &str, evaluation: &[String], composite: &[String], runs: usize) -> Self {
        let series = |names: &[String]| -> RunSeries {
            names.iter().map(|m| (m.clone(), vec![0.0; runs])).collect()
        };
        Self {
            apk_name: entity_id.to_string(),
            evaluation_runs: series(evaluation),
            g_eval_runs: series(composite),
            ..Default::default()
        }
    }

    fn finalize(&mut self) {
        (self.evaluation_mean, self.evaluation_std) = reduce(&self.evaluation_runs);
        (self.g_eval_mean, self.g_eval_std) = reduce(&self.g_eval_runs);
    }
}

/// Corpus-level summary over per-entity means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub evaluation_mean: MetricStats,
    pub evaluation_std: MetricStats,
    pub g_eval_mean: MetricStats,
    pub g_eval_std: MetricStats,
}

/// Final aggregation result, serialized as the aggregated output file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedOutput {
    pub apks: BTreeMap<String, AggregatedEntity>,
    pub overall: OverallSummary,
}

/// Incremental aggregator over run documents.
#[derive(Debug, Clone)]
pub struct MetricAggregator {
    evaluation_metrics: Vec<String>,
    composite_metrics: Vec<String>,
    runs_folded: usize,
    entities: BTreeMap<String, AggregatedEntity>,
}

impl Default for MetricAggregator {
    fn default() -> Self {
        Self::new(primary_metric_names(), composite_metric_names())
    }
}

impl MetricAggregator {
    /// Create an aggregator over the given metric names.
    ///
    /// Duplicate names are dropped, keeping first occurrence.
    pub fn new(evaluation_metrics: Vec<String>, composite_metrics: Vec<String>) -> Self {
        Self {
            evaluation_metrics: dedup(evaluation_metrics),
            composite_metrics: dedup(composite_metrics),
            runs_folded: 0,
            entities: BTreeMap::new(),
        }
    }

    /// Number of documents folded so far.
    pub fn runs_folded(&self) -> usize {
        self.runs_folded
    }

    /// Number of distinct entities seen so far.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Fold one run document.
    pub fn fold(&mut self, run: &RunResultDocument) {
        for entity_id in run.entity_ids() {
            if !self.entities.contains_key(entity_id) {
                let entity = AggregatedEntity::zero_filled(
                    entity_id,
                    &self.evaluation_metrics,
                    &self.composite_metrics,
                    self.runs_folded,
                );
                self.entities.insert(entity_id.to_string(), entity);
            }
        }

        let empty = MetricMap::new();
        for (entity_id, entity) in self.entities.iter_mut() {
            let (evaluation, composite) = match run.get(entity_id) {
                Some(result) => (&result.evaluation, &result.composite_scores),
                None => (&empty, &empty),
            };
            push_values(&mut entity.evaluation_runs, &self.evaluation_metrics, evaluation);
            push_values(&mut entity.g_eval_runs, &self.composite_metrics, composite);
        }

        self.runs_folded += 1;
    }

    /// Compute per-entity and overall statistics.
    pub fn finalize(self) -> AggregatedOutput {
        let mut apks = self.entities;
        for entity in apks.values_mut() {
            entity.finalize();
        }

        let (evaluation_mean, evaluation_std) =
            overall_over(&apks, &self.evaluation_metrics, |e| &e.evaluation_mean);
        let (g_eval_mean, g_eval_std) = overall_over(&apks, &self.composite_metrics, |e| &e.g_eval_mean);

        crate::obs::emit_aggregate_finished(self.runs_folded, apks.len());
        AggregatedOutput {
            apks,
            overall: OverallSummary {
                evaluation_mean,
                evaluation_std,
                g_eval_mean,
                g_eval_std,
            },
        }
    }
}

/// Aggregate an ordered sequence of run documents in one call.
pub fn aggregate(
    runs: &[RunResultDocument],
    evaluation_metrics: &[String],
    composite_metrics: &[String],
) -> AggregatedOutput {
    let mut aggregator = MetricAggregator::new(evaluation_metrics.to_vec(), composite_metrics.to_vec());
    for run in runs {
        aggregator.fold(run);
    }
    aggregator.finalize()
}

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor N).
///
/// `0.0` for fewer than two values and for constant sequences.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 || values.windows(2).all(|w| w[0] == w[1]) {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Reduce per-entity means to corpus-level mean/std for each metric.
fn overall_over(
    apks: &BTreeMap<String, AggregatedEntity>,
    names: &[String],
    pick: fn(&AggregatedEntity) -> &MetricStats,
) -> (MetricStats, MetricStats) {
    let across: RunSeries = names
        .iter()
        .map(|m| {
            let means = apks
                .values()
                .map(|e| pick(e).get(m).copied().unwrap_or(0.0))
                .collect();
            (m.clone(), means)
        })
        .collect();
    reduce(&across)
}

fn reduce(series: &RunSeries) -> (MetricStats, MetricStats) {
    let means = series.iter().map(|(m, v)| (m.clone(), mean(v))).collect();
    let stds = series
        .iter()
        .map(|(m, v)| (m.clone(), population_std(v)))
        .collect();
    (means, stds)
}

fn push_values(series: &mut RunSeries, names: &[String], source: &MetricMap) {
    for name in names {
        series
            .entry(name.clone())
            .or_default()
            .push(source.value_or_zero(name));
    }
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
