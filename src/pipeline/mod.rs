//! Pipeline module - profiling, target resolution and model recommendation

pub mod analysis;
pub mod association;
pub mod correlation;
pub mod domain;
pub mod error;
pub mod insights;
pub mod loader;
pub mod preprocess;
pub mod problem;
pub mod profile;
pub mod registry;
pub mod scoring;
pub mod selection;
pub mod stats;
pub mod target;
pub mod trainer;

pub use analysis::{analyze_dataset, AnalysisOutcome, AnalysisReport, EngineConfig};
pub use association::{association_strategy, AssociationScorer, MutualInfoScorer, NoAssociation};
pub use correlation::{find_correlated_pairs, CorrelatedPair, STRONG_CORRELATION};
pub use domain::{infer_domain, Domain};
pub use error::{EngineError, EngineResult};
pub use insights::{feature_analysis, generate_insights, missing_summary, FeatureSummary, Insight};
pub use loader::*;
pub use preprocess::{
    apply_plan, plan_preprocessing, ColumnPlan, PreprocessingPlan, ProcessedFeatures,
};
pub use problem::{classify_problem, classify_target, ProblemType};
pub use profile::{ColumnKind, ColumnProfile, Dataset, NumericStats};
pub use registry::{AnalysisStatus, DatasetRecord, DatasetRegistry, IndexStatus, RegistryError};
pub use selection::{rank_models, select_best_model, ModelMetricBundle, ModelSelection};
pub use target::{
    suggest_target_columns, ResolutionSource, ScoreBreakdown, TargetDetection, TargetResolution,
    TargetResolver,
};
pub use trainer::{load_metric_bundles, ModelTrainer, NoTrainer, ReportedMetricsTrainer};

use polars::prelude::DataFrame;

/// Profile a table and resolve its target with the default resolver
pub fn profile_and_resolve_target(
    frame: DataFrame,
    user_target: Option<&str>,
) -> EngineResult<(Dataset, TargetResolution)> {
    let dataset = Dataset::from_frame(frame)?;
    let resolution = TargetResolver::default().resolve(&dataset, user_target);
    Ok((dataset, resolution))
}
