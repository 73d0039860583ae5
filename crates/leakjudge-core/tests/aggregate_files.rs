//! Aggregation over run documents in the on-disk run file format.

use leakjudge_core::domain::metrics::{composite_metric_names, primary_metric_names};
use leakjudge_core::{aggregate, load_dir, write_aggregated_json, AggregatedOutput};

fn write(dir: &std::path::Path, name: &str, value: serde_json::Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(&value).expect("json"))
        .expect("write run file");
}

fn scores(v: u8) -> serde_json::Value {
    serde_json::json!({
        "data_type_identification": v,
        "data_propagation_accuracy": v,
        "sink_function_match": v,
        "leakage_inference": v,
        "coherence_and_fluency": v
    })
}

/// Test: run1 A=4 / B=3, run2 A=3 only -> A mean 3.5, B zero-filled for run2
#[test]
fn test_two_runs_with_missing_entity() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "droidbench1.json",
        serde_json::json!({
            "A": {"apk_name": "A", "evaluation": scores(4), "g_eval_scores": {"coherence": 4, "consistency": 4, "relevance": 4, "fluency": 4}},
            "B": {"apk_name": "B", "evaluation": scores(3), "g_eval_scores": {"coherence": 3, "consistency": 3, "relevance": 3, "fluency": 3}}
        }),
    );
    write(
        dir.path(),
        "droidbench2.json",
        serde_json::json!({
            "A": {"apk_name": "A", "evaluation": scores(3), "g_eval_scores": {"coherence": 3, "consistency": 3, "relevance": 3, "fluency": 3}}
        }),
    );

    let runs = load_dir(dir.path(), "droidbench").expect("load");
    let documents: Vec<_> = runs.into_iter().map(|r| r.document).collect();
    let out = aggregate(&documents, &primary_metric_names(), &composite_metric_names());

    let a = &out.apks["A"];
    assert_eq!(a.evaluation_mean["data_type_identification"], 3.5);
    assert_eq!(a.evaluation_std["data_type_identification"], 0.5);
    assert_eq!(a.g_eval_mean["relevance"], 3.5);

    let b = &out.apks["B"];
    for metric in primary_metric_names() {
        assert_eq!(b.evaluation_runs[&metric], vec![3.0, 0.0]);
        assert_eq!(b.evaluation_mean[&metric], 1.5);
    }
    for metric in composite_metric_names() {
        assert_eq!(b.g_eval_runs[&metric], vec![3.0, 0.0]);
    }

    // overall = mean of entity means (3.5 and 1.5)
    assert_eq!(out.overall.evaluation_mean["leakage_inference"], 2.5);
    assert_eq!(out.overall.evaluation_std["leakage_inference"], 1.0);
}

/// Test: aggregated output round-trips through the output file
#[test]
fn test_aggregated_output_file_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "ucBench1.json", serde_json::json!({"A": {"evaluation": scores(5)}}));

    let runs = load_dir(dir.path(), "ucBench").expect("load");
    let documents: Vec<_> = runs.into_iter().map(|r| r.document).collect();
    let out = aggregate(&documents, &primary_metric_names(), &composite_metric_names());

    let path = dir.path().join("aggregated_UC_results.json");
    write_aggregated_json(&path, &out).expect("write output");

    let back: AggregatedOutput =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
    assert_eq!(back, out);
    // single run: std is 0.0 by convention
    assert_eq!(back.apks["A"].evaluation_std["coherence_and_fluency"], 0.0);
    assert_eq!(back.apks["A"].g_eval_mean["fluency"], 0.0);
}
