//! leakjudge - judged evaluation of forensic leakage summaries
//!
//! ## Commands
//!
//! - `evaluate`: score a dataset with the LLM judge over N runs
//! - `aggregate`: reduce N run files to per-entity and overall statistics
//! - `pipeline`: run the processing and summarization stages, optionally
//!   followed by evaluation and aggregation of the succeeded entities

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::{info, Level};

use leakjudge_core::domain::metrics::{composite_metric_names, primary_metric_names};
use leakjudge_core::{
    load_dir, write_aggregated_json, write_overall_md, AggregatedOutput, EvaluationDataset,
    EvaluationHarness, Judge, JudgeConfig, MetricAggregator, OpenAiJudge, RunArtifact,
};
use leakjudge_pipeline::{PipelineOrchestrator, RunMode, Settings};

#[derive(Parser)]
#[command(name = "leakjudge")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LLM-judge evaluation of forensic leakage summaries", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct JudgeArgs {
    /// Judge model (overrides LEAKJUDGE_JUDGE_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct MetricArgs {
    /// Primary metric names to aggregate (comma-separated)
    #[arg(long, value_delimiter = ',')]
    evaluation_metrics: Option<Vec<String>>,

    /// Composite metric names to aggregate (comma-separated)
    #[arg(long, value_delimiter = ',')]
    composite_metrics: Option<Vec<String>>,
}

impl MetricArgs {
    fn aggregator(&self) -> MetricAggregator {
        MetricAggregator::new(
            self.evaluation_metrics.clone().unwrap_or_else(primary_metric_names),
            self.composite_metrics.clone().unwrap_or_else(composite_metric_names),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score every dataset entry with the judge, once per run
    Evaluate {
        /// Evaluation dataset (entity id -> ground truth and model summary)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Directory receiving one result file per run
        #[arg(short, long, default_value = "results")]
        output_dir: PathBuf,

        /// Number of independent runs
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Run file name prefix
        #[arg(short, long, default_value = "evaluation_results")]
        prefix: String,

        #[command(flatten)]
        judge: JudgeArgs,
    },

    /// Aggregate run files into mean / population std per entity and overall
    Aggregate {
        /// Directory holding the run files
        #[arg(short, long)]
        results_dir: PathBuf,

        /// Run file name prefix
        #[arg(short, long, default_value = "evaluation_results")]
        prefix: String,

        /// Aggregated output file
        #[arg(short, long, default_value = "aggregated_results.json")]
        output: PathBuf,

        /// Also write a markdown summary of the overall statistics
        #[arg(long)]
        markdown: Option<PathBuf>,

        #[command(flatten)]
        metrics: MetricArgs,
    },

    /// Run the processing and summarization stages over one or all entities
    #[command(group(ArgGroup::new("target").required(true).args(["apk_name", "all"])))]
    Pipeline {
        /// Settings file (JSON)
        #[arg(short, long, env = "LEAKJUDGE_CONFIG")]
        config: PathBuf,

        /// Single entity to process (file name without extension)
        #[arg(long)]
        apk_name: Option<String>,

        /// Process every entity file in the working directory
        #[arg(long)]
        all: bool,

        /// Write the batch report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Evaluate this dataset, restricted to the succeeded entities
        #[arg(long)]
        evaluate_dataset: Option<PathBuf>,

        /// Number of evaluation runs
        #[arg(long, default_value = "10")]
        runs: usize,

        /// Directory for run files and aggregated output
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,

        /// Run file name prefix
        #[arg(long, default_value = "evaluation_results")]
        prefix: String,

        #[command(flatten)]
        judge: JudgeArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // OPENAI_API_KEY and friends may live in a local .env file
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    leakjudge_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Evaluate {
            dataset,
            output_dir,
            runs,
            prefix,
            judge,
        } => {
            let judge = build_judge(&judge)?;
            let dataset = EvaluationDataset::load(&dataset)
                .with_context(|| format!("Failed to load dataset {:?}", dataset))?;
            cmd_evaluate(judge, &dataset, &output_dir, runs, &prefix)
                .await
                .map(|_| ())
        }
        Commands::Aggregate {
            results_dir,
            prefix,
            output,
            markdown,
            metrics,
        } => cmd_aggregate(&results_dir, &prefix, &output, markdown.as_deref(), &metrics).map(|_| ()),
        Commands::Pipeline {
            config,
            apk_name,
            all,
            report,
            evaluate_dataset,
            runs,
            results_dir,
            prefix,
            judge,
        } => {
            let mode = match apk_name {
                Some(name) if !all => RunMode::Single(name),
                _ => RunMode::Batch,
            };
            cmd_pipeline(
                &config,
                mode,
                report.as_deref(),
                evaluate_dataset.as_deref(),
                runs,
                &results_dir,
                &prefix,
                &judge,
            )
            .await
        }
    }
}

fn build_judge(args: &JudgeArgs) -> Result<Arc<dyn Judge>> {
    let mut config = JudgeConfig::from_env();
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }
    info!(model = %config.model, base_url = %config.base_url, "Judge configured");
    let judge = OpenAiJudge::new(config).context("Failed to configure judge")?;
    Ok(Arc::new(judge))
}

/// Run the harness `runs` times and print a per-run summary
async fn cmd_evaluate(
    judge: Arc<dyn Judge>,
    dataset: &EvaluationDataset,
    output_dir: &Path,
    runs: usize,
    prefix: &str,
) -> Result<Vec<RunArtifact>> {
    println!("Evaluating {} entities over {} runs", dataset.len(), runs);
    println!();

    let harness = EvaluationHarness::new(judge);
    let artifacts = harness
        .run_repeated(dataset, runs, output_dir, prefix)
        .await
        .context("Evaluation failed")?;

    for artifact in &artifacts {
        println!(
            "  {:?}: {} scored, {} skipped",
            artifact.path,
            artifact.outcome.document.len(),
            artifact.outcome.skipped()
        );
    }
    Ok(artifacts)
}

/// Aggregate run files, write the output file(s) and print the overall summary
fn cmd_aggregate(
    results_dir: &Path,
    prefix: &str,
    output: &Path,
    markdown: Option<&Path>,
    metrics: &MetricArgs,
) -> Result<AggregatedOutput> {
    let runs = load_dir(results_dir, prefix)
        .with_context(|| format!("Failed to load run files from {:?}", results_dir))?;
    if runs.is_empty() {
        anyhow::bail!("No run files matching '{}*.json' in {:?}", prefix, results_dir);
    }

    let mut aggregator = metrics.aggregator();
    for run in &runs {
        aggregator.fold(&run.document);
    }
    finish_aggregation(aggregator, output, markdown)
}

/// Finalize, write the output file(s) and print the overall summary
fn finish_aggregation(
    aggregator: MetricAggregator,
    output: &Path,
    markdown: Option<&Path>,
) -> Result<AggregatedOutput> {
    let run_count = aggregator.runs_folded();
    let aggregated = aggregator.finalize();

    write_aggregated_json(output, &aggregated)
        .with_context(|| format!("Failed to write aggregated output to {:?}", output))?;
    if let Some(path) = markdown {
        write_overall_md(path, &aggregated.overall, aggregated.apks.len(), run_count)
            .with_context(|| format!("Failed to write markdown summary to {:?}", path))?;
    }

    println!("Aggregated {} runs over {} entities -> {:?}", run_count, aggregated.apks.len(), output);
    println!("{}", serde_json::to_string_pretty(&aggregated.overall)?);
    Ok(aggregated)
}

/// Run the pipeline, then optionally evaluate and aggregate the succeeded entities
#[allow(clippy::too_many_arguments)]
async fn cmd_pipeline(
    config: &Path,
    mode: RunMode,
    report_path: Option<&Path>,
    evaluate_dataset: Option<&Path>,
    runs: usize,
    results_dir: &Path,
    prefix: &str,
    judge_args: &JudgeArgs,
) -> Result<()> {
    let settings = Settings::load(config)
        .with_context(|| format!("Failed to load settings from {:?}", config))?;
    let orchestrator = PipelineOrchestrator::from_settings(settings).context("Invalid pipeline settings")?;

    let report = orchestrator.run(mode).await.context("Pipeline failed to run")?;

    println!();
    print!("{}", report.render_summary());
    println!("Pipeline finished in {} ms", report.duration_ms());

    if let Some(path) = report_path {
        report
            .write(path)
            .with_context(|| format!("Failed to write batch report to {:?}", path))?;
    }

    let Some(dataset_path) = evaluate_dataset else {
        return Ok(());
    };

    let mut dataset = EvaluationDataset::load(dataset_path)
        .with_context(|| format!("Failed to load dataset {:?}", dataset_path))?;
    let dropped = dataset.retain_entities(&report.succeeded());
    info!(kept = dataset.len(), dropped = dropped, "Restricted dataset to succeeded entities");
    if dataset.is_empty() {
        anyhow::bail!("No succeeded entity appears in {:?}", dataset_path);
    }

    println!();
    let judge = build_judge(judge_args)?;
    evaluate_and_aggregate(judge, &dataset, results_dir, runs, prefix)
        .await
        .map(|_| ())
}

/// Evaluate, then aggregate exactly the runs this invocation produced
async fn evaluate_and_aggregate(
    judge: Arc<dyn Judge>,
    dataset: &EvaluationDataset,
    results_dir: &Path,
    runs: usize,
    prefix: &str,
) -> Result<AggregatedOutput> {
    let artifacts = cmd_evaluate(judge, dataset, results_dir, runs, prefix).await?;

    let mut aggregator = MetricAggregator::default();
    for artifact in &artifacts {
        aggregator.fold(&artifact.outcome.document);
    }

    let output = results_dir.join(format!("aggregated_{prefix}.json"));
    println!();
    finish_aggregation(aggregator, &output, None)
}
