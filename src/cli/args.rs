//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{EngineConfig, ProblemType};

/// dataiq - Detect the target column, the problem type and the best model for a dataset
#[derive(Parser, Debug)]
#[command(name = "dataiq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Target column name. Matched case-insensitively; close misspellings
    /// produce suggestions. If not provided, the target is detected automatically.
    #[arg(short, long)]
    pub target: Option<String>,

    /// JSON file with metrics reported by an external model trainer.
    /// Without it no models are ranked and the recommendation is a placeholder.
    #[arg(short, long)]
    pub metrics: Option<PathBuf>,

    /// Report output path (JSON).
    /// Defaults to the input directory with an '_analysis.json' suffix.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Minimum total score for an automatically detected target
    #[arg(long, default_value = "6.0", value_parser = validate_non_negative)]
    pub acceptance_threshold: f64,

    /// Similarity cutoff (0.0 to 1.0) for suggesting columns close to a misspelled target
    #[arg(long, default_value = "0.4", value_parser = validate_unit_interval)]
    pub fuzzy_cutoff: f64,

    /// Absolute correlation above which numeric pairs are reported as insights
    #[arg(long, default_value = "0.8", value_parser = validate_unit_interval)]
    pub correlation_threshold: f64,

    /// Disable the mutual-information association score during target detection
    #[arg(long, default_value = "false")]
    pub no_association: bool,

    /// Skip interactive prompts. An ambiguous target then stops the run
    /// and lists the suggestions instead of asking.
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank models from a metrics file and print the recommendation as JSON
    Select {
        /// JSON file with model metric bundles
        metrics: PathBuf,

        /// Problem type the metrics were produced for
        #[arg(short, long)]
        problem_type: ProblemType,

        /// Write the selection to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Get the report path, deriving from input if not explicitly provided.
    pub fn output_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(self.output.clone().unwrap_or_else(|| {
            let parent = input.parent().unwrap_or_else(|| std::path::Path::new("."));
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("dataset");
            parent.join(format!("{}_analysis.json", stem))
        }))
    }

    /// Engine settings from the command line
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            acceptance_threshold: self.acceptance_threshold,
            fuzzy_cutoff: self.fuzzy_cutoff,
            correlation_threshold: self.correlation_threshold,
            association: !self.no_association,
        }
    }
}

fn parse_number(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{}' is not a finite number", s))
    }
}

/// Validator for values in [0, 1]
fn validate_unit_interval(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!("value must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for the acceptance threshold
fn validate_non_negative(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value < 0.0 {
        Err(format!("value must not be negative, got {}", value))
    } else {
        Ok(value)
    }
}
