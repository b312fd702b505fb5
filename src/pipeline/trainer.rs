//! Model training collaborators
//!
//! The engine never fits models itself. A trainer receives the model-ready
//! features and reports one metric bundle per candidate model.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::preprocess::ProcessedFeatures;
use super::problem::ProblemType;
use super::selection::ModelMetricBundle;

/// Anything that can train candidate models and report their metrics
pub trait ModelTrainer: Send + Sync {
    fn name(&self) -> &str;

    fn train(
        &self,
        features: &ProcessedFeatures,
        problem_type: ProblemType,
    ) -> Result<Vec<ModelMetricBundle>>;
}

/// Trainer that reports nothing; selection then falls back to the placeholder
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrainer;

impl ModelTrainer for NoTrainer {
    fn name(&self) -> &str {
        "none"
    }

    fn train(&self, _: &ProcessedFeatures, _: ProblemType) -> Result<Vec<ModelMetricBundle>> {
        Ok(Vec::new())
    }
}

/// Accepted layouts of a metrics file
#[derive(Deserialize)]
#[serde(untagged)]
enum MetricsFile {
    Bundles(Vec<ModelMetricBundle>),
    Wrapped { all_model_metrics: Vec<ModelMetricBundle> },
}

/// Load metric bundles from a JSON file.
///
/// The file holds either a list of bundles or an object with an
/// `all_model_metrics` list.
pub fn load_metric_bundles(path: &Path) -> Result<Vec<ModelMetricBundle>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read metrics file {}", path.display()))?;
    let parsed: MetricsFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse metrics file {}", path.display()))?;
    Ok(match parsed {
        MetricsFile::Bundles(bundles) => bundles,
        MetricsFile::Wrapped { all_model_metrics } => all_model_metrics,
    })
}

/// Trainer backed by metrics produced elsewhere and saved as JSON
#[derive(Debug, Clone)]
pub struct ReportedMetricsTrainer {
    path: PathBuf,
}

impl ReportedMetricsTrainer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelTrainer for ReportedMetricsTrainer {
    fn name(&self) -> &str {
        "reported_metrics"
    }

    fn train(
        &self,
        features: &ProcessedFeatures,
        problem_type: ProblemType,
    ) -> Result<Vec<ModelMetricBundle>> {
        let bundles = load_metric_bundles(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            models = bundles.len(),
            features = features.features_after,
            problem = %problem_type,
            "Loaded reported model metrics"
        );
        Ok(bundles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_plain_list() {
        let file = write_json(
            r#"[{"model_name": "LogisticRegression", "accuracy": 0.9, "f1": 0.88},
                {"model_name": "RandomForestClassifier", "accuracy": 0.92}]"#,
        );
        let bundles = load_metric_bundles(file.path()).unwrap();
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[1].model_name, "RandomForestClassifier");
        assert!(bundles[1].f1.is_none());
    }

    #[test]
    fn test_load_wrapped_list() {
        let file = write_json(
            r#"{"all_model_metrics": [{"model": "KMeans", "silhouette_score": 0.41}]}"#,
        );
        let bundles = load_metric_bundles(file.path()).unwrap();
        assert_eq!(bundles[0].model_name, "KMeans");
        assert_eq!(bundles[0].silhouette, Some(0.41));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let file = write_json("{not json");
        assert!(load_metric_bundles(file.path()).is_err());
        assert!(load_metric_bundles(Path::new("/nonexistent/metrics.json")).is_err());
    }
}
