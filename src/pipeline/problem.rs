//! Problem-type classification

use serde::{Deserialize, Serialize};

use super::profile::{ColumnKind, Dataset};
use super::target::TargetResolution;

/// Above this distinct/present ratio a target is treated as an identifier
pub const IDENTIFIER_RATIO: f64 = 0.9;

/// Numeric targets with at most this many distinct values are class labels
pub const MAX_CLASS_LABELS: usize = 20;

/// Kind of learning problem posed by a dataset and its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    Classification,
    Regression,
    Unsupervised,
}

impl ProblemType {
    pub fn is_supervised(&self) -> bool {
        !matches!(self, ProblemType::Unsupervised)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemType::Classification => "classification",
            ProblemType::Regression => "regression",
            ProblemType::Unsupervised => "unsupervised",
        }
    }
}

impl std::fmt::Display for ProblemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProblemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classification" => Ok(ProblemType::Classification),
            "regression" => Ok(ProblemType::Regression),
            "unsupervised" => Ok(ProblemType::Unsupervised),
            other => Err(format!(
                "unknown problem type '{}': expected classification, regression or unsupervised",
                other
            )),
        }
    }
}

/// Decide the problem type for a resolved target.
///
/// The identifier check runs before any dtype check so that high-cardinality
/// numeric identifiers are never typed as regression targets.
pub fn classify_problem(dataset: &Dataset, resolution: &TargetResolution) -> ProblemType {
    let Some(column) = resolution.column() else {
        return ProblemType::Unsupervised;
    };
    classify_target(dataset, column)
}

/// Decide the problem type for a named target column
pub fn classify_target(dataset: &Dataset, column: &str) -> ProblemType {
    let Some(profile) = dataset.profile(column) else {
        return ProblemType::Unsupervised;
    };

    let present = profile.present_count();
    if present == 0 {
        return ProblemType::Unsupervised;
    }

    let distinct = profile.unique_count;
    if distinct as f64 / present as f64 > IDENTIFIER_RATIO {
        return ProblemType::Unsupervised;
    }

    if profile.kind != ColumnKind::Numeric {
        return ProblemType::Classification;
    }

    if distinct <= MAX_CLASS_LABELS {
        ProblemType::Classification
    } else {
        ProblemType::Regression
    }
}
