//! End-to-end analysis of one dataset
//!
//! Runs target resolution, problem typing, preprocessing, training through a
//! [`ModelTrainer`] and model selection. A run either completes, stops to ask
//! the user about an ambiguous target, or fails as a whole.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::association::association_strategy;
use super::correlation::STRONG_CORRELATION;
use super::domain::{infer_domain, Domain};
use super::insights::{
    feature_analysis, generate_insights, missing_summary, FeatureSummary, Insight,
};
use super::preprocess::{apply_plan, plan_preprocessing, PreprocessingPlan};
use super::problem::{classify_problem, ProblemType};
use super::profile::{ColumnProfile, Dataset};
use super::selection::{
    rank_models, select_best_model, ModelMetricBundle, ModelSelection, RankedModel,
};
use super::target::{
    ScoreBreakdown, TargetResolution, TargetResolver, ACCEPTANCE_THRESHOLD, FUZZY_CUTOFF,
};
use super::trainer::ModelTrainer;

/// Tunable engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub acceptance_threshold: f64,
    pub fuzzy_cutoff: f64,
    pub correlation_threshold: f64,
    /// Use mutual information when the build supports it
    pub association: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: ACCEPTANCE_THRESHOLD,
            fuzzy_cutoff: FUZZY_CUTOFF,
            correlation_threshold: STRONG_CORRELATION,
            association: true,
        }
    }
}

impl EngineConfig {
    pub fn resolver(&self) -> TargetResolver {
        TargetResolver::new(
            self.acceptance_threshold,
            self.fuzzy_cutoff,
            association_strategy(self.association),
        )
    }
}

/// Everything a completed run produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub domain: Domain,
    pub association: &'static str,
    pub target: TargetResolution,
    pub target_column: Option<String>,
    pub problem_type: ProblemType,
    pub target_scores: Vec<ScoreBreakdown>,
    pub profiles: Vec<ColumnProfile>,
    pub feature_analysis: Vec<FeatureSummary>,
    pub missing_summary: Vec<(String, usize)>,
    pub insights: Vec<Insight>,
    pub preprocessing: PreprocessingPlan,
    pub features_before: usize,
    pub features_after: usize,
    pub trainer: String,
    pub model_metrics: Vec<ModelMetricBundle>,
    pub model_ranking: Vec<RankedModel>,
    pub best_model: ModelSelection,
}

/// Result of one analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Completed(Box<AnalysisReport>),
    NeedsUserInput {
        attempted_name: String,
        suggestions: Vec<String>,
        all_columns: Vec<String>,
    },
}

impl AnalysisOutcome {
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutcome::Completed(report) => Some(report.as_ref()),
            AnalysisOutcome::NeedsUserInput { .. } => None,
        }
    }
}

/// Analyse a profiled dataset.
///
/// `user_target` is the column name the user asserted, if any. Training and
/// preprocessing failures are returned as a single error for the whole run.
pub fn analyze_dataset(
    dataset: &Dataset,
    user_target: Option<&str>,
    config: &EngineConfig,
    trainer: &dyn ModelTrainer,
) -> Result<AnalysisOutcome> {
    let resolver = config.resolver();
    let (resolution, detection) = resolver.resolve_explained(dataset, user_target);

    if let TargetResolution::NeedsUserInput {
        attempted_name,
        suggestions,
        all_columns,
    } = resolution
    {
        tracing::info!(
            attempted = %attempted_name,
            suggestions = suggestions.len(),
            "Target column needs confirmation"
        );
        return Ok(AnalysisOutcome::NeedsUserInput {
            attempted_name,
            suggestions,
            all_columns,
        });
    }

    let target_column = resolution.column().map(str::to_string);
    let problem_type = classify_problem(dataset, &resolution);
    tracing::info!(
        target = target_column.as_deref().unwrap_or("<none>"),
        problem = %problem_type,
        "Resolved target and problem type"
    );

    let plan = plan_preprocessing(dataset, target_column.as_deref());
    let processed = apply_plan(dataset, &plan).context("Preprocessing failed")?;

    let model_metrics = trainer
        .train(&processed, problem_type)
        .with_context(|| format!("Model training with '{}' failed", trainer.name()))?;
    let model_ranking = rank_models(&model_metrics, problem_type);
    let best_model = select_best_model(&model_metrics, problem_type)
        .unwrap_or_else(ModelSelection::unsupervised_placeholder);

    let (domain, association, target_scores) = match detection {
        Some(d) => (d.domain, d.association, d.scores),
        None => (
            infer_domain(dataset.columns()),
            resolver.association_name(),
            Vec::new(),
        ),
    };

    let report = AnalysisReport {
        total_rows: dataset.row_count(),
        total_columns: dataset.columns().len(),
        domain,
        association,
        target: resolution,
        target_column,
        problem_type,
        target_scores,
        profiles: dataset.profiles().cloned().collect(),
        feature_analysis: feature_analysis(dataset),
        missing_summary: missing_summary(dataset),
        insights: generate_insights(dataset, config.correlation_threshold),
        preprocessing: plan,
        features_before: processed.features_before,
        features_after: processed.features_after,
        trainer: trainer.name().to_string(),
        model_metrics,
        model_ranking,
        best_model,
    };

    Ok(AnalysisOutcome::Completed(Box::new(report)))
}
