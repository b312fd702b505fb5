//! dataiq: Dataset Intelligence CLI Tool
//!
//! Detects the prediction target and problem type of a tabular dataset,
//! plans its preprocessing and recommends a model from reported metrics.

mod cli;
mod pipeline;
mod report;
mod utils;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use cli::{choose_target, Cli, Commands, TargetChoice};
use pipeline::{
    analyze_dataset, association_strategy, load_dataset, load_metric_bundles, select_best_model,
    AnalysisOutcome, Dataset, ModelTrainer, NoTrainer, ProblemType, ReportedMetricsTrainer,
};
use report::{
    display_analysis, export_analysis_report, AnalysisReportFile, ReportParams, TimingInfo,
};
use utils::{
    create_spinner, finish_with_success, finish_with_warning, init_logging, print_banner,
    print_completion, print_config, print_count, print_detail, print_info, print_step_header,
    print_success, print_warning, ConfigCard, LogConfig,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(
        &LogConfig::from_verbosity(cli.verbose).with_ansi(console::colors_enabled_stderr()),
    )?;

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Select {
                metrics,
                problem_type,
                output,
            } => run_select(metrics, *problem_type, output.as_deref()),
        };
    }

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;
    let report_path = cli
        .output_path()
        .ok_or_else(|| anyhow::anyhow!("Could not derive a report path from the input file"))?;
    let config = cli.engine_config();

    let trainer: Box<dyn ModelTrainer> = match &cli.metrics {
        Some(path) => Box::new(ReportedMetricsTrainer::new(path.clone())),
        None => Box::new(NoTrainer),
    };

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        input,
        target: cli.target.as_deref(),
        metrics: cli.metrics.as_deref(),
        report: &report_path,
        acceptance_threshold: config.acceptance_threshold,
        fuzzy_cutoff: config.fuzzy_cutoff,
        association: association_strategy(config.association).name(),
    });

    // Step 1: Load and profile
    print_step_header(1, "Load & Profile Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let frame = load_dataset(input, cli.infer_schema_length)?;
    spinner.set_message("Profiling columns...");
    let dataset = Dataset::from_frame(frame)
        .with_context(|| format!("Failed to profile {}", input.display()))?;
    finish_with_success(&spinner, "Dataset loaded and profiled");
    print_detail("Rows", &dataset.row_count().to_string());
    print_detail("Columns", &dataset.columns().len().to_string());
    let load_elapsed = step_start.elapsed();

    // Step 2: Resolve target, plan and select
    print_step_header(2, "Target Resolution & Model Selection");
    let step_start = Instant::now();
    let mut user_target = cli.target.clone();
    let report = loop {
        let spinner = create_spinner("Analysing dataset...");
        let outcome = analyze_dataset(&dataset, user_target.as_deref(), &config, trainer.as_ref());
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                finish_with_warning(&spinner, "Analysis failed");
                return Err(err);
            }
        };

        match outcome {
            AnalysisOutcome::Completed(report) => {
                finish_with_success(&spinner, "Analysis complete");
                break report;
            }
            AnalysisOutcome::NeedsUserInput {
                attempted_name,
                suggestions,
                all_columns,
            } => {
                finish_with_warning(
                    &spinner,
                    &format!("Column '{}' not found", attempted_name),
                );
                if cli.no_confirm {
                    anyhow::bail!(
                        "Target column '{}' not found. Did you mean: {}?",
                        attempted_name,
                        suggestions.join(", ")
                    );
                }
                user_target = match choose_target(&attempted_name, &suggestions, &all_columns)? {
                    TargetChoice::Column(column) => Some(column),
                    TargetChoice::AutoDetect => None,
                };
            }
        }
    };
    let analysis_elapsed = step_start.elapsed();

    match report.target_column.as_deref() {
        Some(column) => print_success(&format!("Target column: {}", column)),
        None => print_info("No target column; treating the dataset as unsupervised"),
    }
    print_detail("Problem type", report.problem_type.as_str());
    if report.model_metrics.is_empty() {
        print_warning("No model metrics supplied; recommendation is a placeholder");
    } else {
        print_count("model(s) ranked", report.model_metrics.len(), None);
    }

    // Step 3: Save report
    print_step_header(3, "Save Report");
    let spinner = create_spinner("Writing analysis report...");
    let report_file = AnalysisReportFile::new(
        &report,
        ReportParams {
            input_file: input,
            user_target: user_target.as_deref(),
            metrics_file: cli.metrics.as_deref(),
            config: &config,
            timing: TimingInfo::new(load_elapsed, analysis_elapsed),
        },
    );
    export_analysis_report(&report_file, &report_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", report_path.display()));

    display_analysis(&report);
    println!(
        "\n    {} {}",
        style("Best model:").dim(),
        style(&report.best_model.name).green().bold()
    );
    print_completion();

    Ok(())
}

/// Rank models from a metrics file and write the selection as JSON
fn run_select(metrics: &Path, problem_type: ProblemType, output: Option<&Path>) -> Result<()> {
    let bundles = load_metric_bundles(metrics)?;
    let selection = select_best_model(&bundles, problem_type);
    let json =
        serde_json::to_string_pretty(&selection).context("Failed to serialize model selection")?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write selection to {}", path.display()))?;
            print_success(&format!("Selection written to {}", path.display()));
        }
        None => println!("{}", json),
    }

    Ok(())
}
