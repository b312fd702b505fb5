//! JSON analysis report
//!
//! Wraps a completed analysis with run metadata and writes it to disk.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{AnalysisReport, EngineConfig};

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub dataiq_version: String,
    pub input_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_file: Option<String>,
    pub settings: EngineConfig,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub analysis_ms: u64,
    pub total_ms: u64,
}

impl TimingInfo {
    pub fn new(load: Duration, analysis: Duration) -> Self {
        Self {
            load_ms: load.as_millis() as u64,
            analysis_ms: analysis.as_millis() as u64,
            total_ms: (load + analysis).as_millis() as u64,
        }
    }
}

/// Complete report as written to disk
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReportFile<'a> {
    pub metadata: ReportMetadata,
    pub timing: TimingInfo,
    pub analysis: &'a AnalysisReport,
}

/// Parameters for building a report file
pub struct ReportParams<'a> {
    pub input_file: &'a Path,
    pub user_target: Option<&'a str>,
    pub metrics_file: Option<&'a Path>,
    pub config: &'a EngineConfig,
    pub timing: TimingInfo,
}

impl<'a> AnalysisReportFile<'a> {
    pub fn new(analysis: &'a AnalysisReport, params: ReportParams<'_>) -> Self {
        Self {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                dataiq_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: params.input_file.display().to_string(),
                user_target: params.user_target.map(str::to_string),
                metrics_file: params.metrics_file.map(|p| p.display().to_string()),
                settings: params.config.clone(),
            },
            timing: params.timing,
            analysis,
        }
    }
}

/// Export the analysis report to a JSON file
pub fn export_analysis_report(report: &AnalysisReportFile<'_>, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize analysis report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis report to {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{analyze_dataset, Dataset, NoTrainer};
    use polars::prelude::*;
    use tempfile::TempDir;

    fn report() -> AnalysisReport {
        let df = df! {
            "x" => (0..30).map(|i| i as f64 * 0.5).collect::<Vec<_>>(),
            "label" => (0..30).map(|i| if i % 2 == 0 { "a" } else { "b" }).collect::<Vec<_>>(),
        }
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();
        let outcome = analyze_dataset(&ds, None, &EngineConfig::default(), &NoTrainer).unwrap();
        outcome.report().unwrap().clone()
    }

    #[test]
    fn test_export_writes_json_with_metadata() {
        let analysis = report();
        let file = AnalysisReportFile::new(
            &analysis,
            ReportParams {
                input_file: Path::new("data.csv"),
                user_target: None,
                metrics_file: None,
                config: &EngineConfig::default(),
                timing: TimingInfo::new(Duration::from_millis(5), Duration::from_millis(7)),
            },
        );

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        export_analysis_report(&file, &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["metadata"]["input_file"], "data.csv");
        assert_eq!(json["timing"]["total_ms"], 12);
        assert_eq!(json["analysis"]["target_column"], "label");
        assert_eq!(json["analysis"]["problem_type"], "classification");
        assert_eq!(json["analysis"]["target"]["status"], "resolved");
        assert_eq!(json["analysis"]["preprocessing"]["stages"].as_array().unwrap().len(), 6);
        assert!(json["metadata"].get("user_target").is_none());
    }
}
