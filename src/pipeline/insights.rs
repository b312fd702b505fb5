//! Dataset insights and per-feature summaries

use serde::Serialize;

use super::correlation::{find_correlated_pairs, CorrelatedPair};
use super::profile::{ColumnKind, Dataset};

/// Missing percentage above which a column is flagged
pub const HIGH_MISSING_PERCENT: f64 = 30.0;

/// Absolute skewness above which a distribution is flagged
pub const SKEW_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub importance: Importance,
}

/// One row of the feature analysis table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub unique_values: usize,
    pub missing_percentage: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn missing_percentage(missing: usize, rows: usize) -> f64 {
    if rows == 0 {
        0.0
    } else {
        round2(missing as f64 / rows as f64 * 100.0)
    }
}

/// Per-column kind, distinct count and missing percentage
pub fn feature_analysis(dataset: &Dataset) -> Vec<FeatureSummary> {
    dataset
        .profiles()
        .map(|p| FeatureSummary {
            name: p.name.clone(),
            kind: p.kind,
            unique_values: p.unique_count,
            missing_percentage: missing_percentage(p.missing_count, p.row_count),
        })
        .collect()
}

/// Columns with at least one missing value, in dataset order
pub fn missing_summary(dataset: &Dataset) -> Vec<(String, usize)> {
    dataset
        .profiles()
        .filter(|p| p.missing_count > 0)
        .map(|p| (p.name.clone(), p.missing_count))
        .collect()
}

/// Flag heavy missingness, skewed numeric columns and strong correlations
pub fn generate_insights(dataset: &Dataset, correlation_threshold: f64) -> Vec<Insight> {
    let mut insights = Vec::new();

    for p in dataset.profiles() {
        let pct = missing_percentage(p.missing_count, p.row_count);
        if pct > HIGH_MISSING_PERCENT {
            insights.push(Insight {
                title: "High Missing Values".to_string(),
                description: format!("Column '{}' has {}% missing values.", p.name, pct),
                importance: Importance::High,
            });
        }
    }

    for p in dataset.profiles() {
        let skewness = p.numeric.as_ref().and_then(|n| n.skewness);
        if let Some(skew) = skewness.filter(|s| s.abs() > SKEW_THRESHOLD) {
            insights.push(Insight {
                title: "Skewed Distribution".to_string(),
                description: format!(
                    "Feature '{}' is highly skewed (skewness={:.2}).",
                    p.name, skew
                ),
                importance: Importance::Medium,
            });
        }
    }

    for CorrelatedPair {
        feature1,
        feature2,
        correlation,
    } in find_correlated_pairs(dataset, correlation_threshold)
    {
        insights.push(Insight {
            title: "Strong Feature Relationship".to_string(),
            description: format!(
                "{} is strongly correlated with {} (corr={:.2}).",
                feature1, feature2, correlation
            ),
            importance: Importance::High,
        });
    }

    insights
}
