//! Output files: run documents, aggregated output and a markdown summary.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::aggregate::{AggregatedOutput, MetricStats, OverallSummary};
use crate::domain::Result;

/// Write `value` as pretty JSON to `path`.
///
/// The content goes to a temporary file in the same directory first and is
/// renamed into place, so an interrupted write never leaves a truncated file.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write the aggregated output file.
pub fn write_aggregated_json(path: &Path, output: &AggregatedOutput) -> Result<()> {
    write_json_atomic(path, output)
}

/// Render the overall summary as markdown tables.
pub fn render_overall_md(overall: &OverallSummary, entities: usize, runs: usize) -> String {
    let mut out = String::new();
    out.push_str("# Evaluation Summary\n\n");
    out.push_str(&format!("- entities: {entities}\n- runs: {runs}\n\n"));

    out.push_str("## Primary Metrics\n");
    push_table(&mut out, &overall.evaluation_mean, &overall.evaluation_std);
    out.push('\n');
    out.push_str("## Composite Metrics\n");
    push_table(&mut out, &overall.g_eval_mean, &overall.g_eval_std);
    out
}

fn push_table(out: &mut String, means: &MetricStats, stds: &MetricStats) {
    out.push_str("| metric | mean | std |\n|---|---|---|\n");
    for (metric, mean) in means {
        let std = stds.get(metric).copied().unwrap_or(0.0);
        out.push_str(&format!("| {metric} | {mean:.3} | {std:.3} |\n"));
    }
}

/// Write the markdown summary.
pub fn write_overall_md(path: &Path, overall: &OverallSummary, entities: usize, runs: usize) -> Result<()> {
    std::fs::write(path, render_overall_md(overall, entities, runs))?;
    Ok(())
}
