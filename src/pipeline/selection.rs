//! Model selection from reported metrics
//!
//! Each bundle gets a composite score that rewards the task metric and
//! penalises both the train/validation gap and cross-validation spread.

use serde::{Deserialize, Serialize};

use super::problem::ProblemType;
use super::stats::finite;

/// Guards `1 / rmse` against a perfect fit
pub const RMSE_EPSILON: f64 = 1e-6;

/// Weight of the overfit gap in the penalty
pub const OVERFIT_PENALTY: f64 = 0.3;

/// Weight of the cross-validation standard deviation in the penalty
pub const INSTABILITY_PENALTY: f64 = 0.2;

pub const SUPERVISED_CONFIDENCE_CAP: f64 = 95.0;
pub const UNSUPERVISED_CONFIDENCE_CAP: f64 = 90.0;

/// Gap above which the tradeoff text warns about overfitting
const OVERFIT_WARNING_GAP: f64 = 0.1;

/// Metrics reported by an external trainer for one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricBundle {
    #[serde(alias = "model")]
    pub model_name: String,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default, alias = "f1_score")]
    pub f1: Option<f64>,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub recall: Option<f64>,
    #[serde(default)]
    pub confusion_matrix: Option<Vec<Vec<u64>>>,
    #[serde(default, alias = "r2_score")]
    pub r2: Option<f64>,
    #[serde(default)]
    pub rmse: Option<f64>,
    #[serde(default, alias = "silhouette_score")]
    pub silhouette: Option<f64>,
    #[serde(default)]
    pub train_score: Option<f64>,
    #[serde(default)]
    pub cv_mean: Option<f64>,
    #[serde(default)]
    pub cv_std: Option<f64>,
}

impl ModelMetricBundle {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Default::default()
        }
    }

    /// `|train_score - cv_mean|`, or 0 when either is absent
    pub fn overfit_gap(&self) -> f64 {
        match (self.train_score.and_then(finite), self.cv_mean.and_then(finite)) {
            (Some(train), Some(cv)) => (train - cv).abs(),
            _ => 0.0,
        }
    }

    /// Task metric before penalties. Absent metrics count as 0.
    pub fn base_score(&self, problem_type: ProblemType) -> f64 {
        match problem_type {
            ProblemType::Classification => {
                0.4 * metric(self.f1) + 0.3 * metric(self.accuracy) + 0.3 * metric(self.recall)
            }
            ProblemType::Regression => {
                let inverse_rmse = match self.rmse.and_then(finite) {
                    Some(rmse) if rmse >= 0.0 => 1.0 / (rmse + RMSE_EPSILON),
                    _ => 0.0,
                };
                0.6 * inverse_rmse + 0.4 * metric(self.r2)
            }
            ProblemType::Unsupervised => metric(self.silhouette),
        }
    }
}

fn metric(value: Option<f64>) -> f64 {
    value.and_then(finite).unwrap_or(0.0)
}

/// Composite score for one bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedModel {
    pub model_name: String,
    pub base_score: f64,
    pub overfit_gap: f64,
    pub penalty: f64,
    pub final_score: f64,
}

/// Recommended model with confidence and rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub name: String,
    pub algorithm: String,
    /// 0 to 100
    pub confidence: u8,
    pub reasoning: String,
    pub tradeoffs: String,
    pub overfit_gap: Option<f64>,
    pub final_score: Option<f64>,
}

impl ModelSelection {
    /// Stand-in used when no model could be selected
    pub fn unsupervised_placeholder() -> Self {
        Self {
            name: "N/A".to_string(),
            algorithm: "Unsupervised".to_string(),
            confidence: 0,
            reasoning: "No supervised target detected. Clustering models were applied."
                .to_string(),
            tradeoffs: "No ground truth available for supervised evaluation.".to_string(),
            overfit_gap: None,
            final_score: None,
        }
    }
}

/// Score every bundle, in input order
pub fn rank_models(bundles: &[ModelMetricBundle], problem_type: ProblemType) -> Vec<RankedModel> {
    bundles
        .iter()
        .map(|bundle| {
            let base_score = bundle.base_score(problem_type);
            let overfit_gap = bundle.overfit_gap();
            let penalty =
                OVERFIT_PENALTY * overfit_gap + INSTABILITY_PENALTY * metric(bundle.cv_std);
            RankedModel {
                model_name: bundle.model_name.clone(),
                base_score,
                overfit_gap,
                penalty,
                final_score: base_score - penalty,
            }
        })
        .collect()
}

/// Pick the bundle with the highest composite score.
///
/// Returns `None` for an empty batch. Ties go to the earliest bundle.
pub fn select_best_model(
    bundles: &[ModelMetricBundle],
    problem_type: ProblemType,
) -> Option<ModelSelection> {
    let ranked = rank_models(bundles, problem_type);

    let mut best: Option<usize> = None;
    for (i, model) in ranked.iter().enumerate() {
        let better = match best {
            None => true,
            Some(j) => comparable(model.final_score) > comparable(ranked[j].final_score),
        };
        if better {
            best = Some(i);
        }
    }

    let index = best?;
    let winner = &ranked[index];
    let bundle = &bundles[index];

    tracing::info!(
        model = %winner.model_name,
        score = winner.final_score,
        gap = winner.overfit_gap,
        "Selected best model"
    );

    Some(ModelSelection {
        name: winner.model_name.clone(),
        algorithm: algorithm_label(problem_type).to_string(),
        confidence: confidence(bundle, winner, problem_type),
        reasoning: reasoning(winner, bundle, problem_type),
        tradeoffs: tradeoffs(winner, problem_type),
        overfit_gap: finite(winner.overfit_gap),
        final_score: finite(winner.final_score),
    })
}

fn comparable(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

fn algorithm_label(problem_type: ProblemType) -> &'static str {
    match problem_type {
        ProblemType::Classification => "Classification",
        ProblemType::Regression => "Regression",
        ProblemType::Unsupervised => "Unsupervised",
    }
}

fn confidence(bundle: &ModelMetricBundle, winner: &RankedModel, problem_type: ProblemType) -> u8 {
    let raw = if problem_type.is_supervised() {
        let basis = bundle.cv_mean.and_then(finite).unwrap_or(winner.base_score);
        (basis * 100.0).min(SUPERVISED_CONFIDENCE_CAP)
    } else {
        (winner.final_score * 100.0).min(UNSUPERVISED_CONFIDENCE_CAP)
    };
    finite(raw).unwrap_or(0.0).clamp(0.0, 100.0).round() as u8
}

fn reasoning(
    winner: &RankedModel,
    bundle: &ModelMetricBundle,
    problem_type: ProblemType,
) -> String {
    let headline = match problem_type {
        ProblemType::Classification => format!(
            "{} achieved the best balance of F1 ({:.3}), accuracy ({:.3}) and recall ({:.3})",
            winner.model_name,
            metric(bundle.f1),
            metric(bundle.accuracy),
            metric(bundle.recall)
        ),
        ProblemType::Regression => format!(
            "{} achieved the best balance of error (RMSE {:.3}) and fit (R² {:.3})",
            winner.model_name,
            metric(bundle.rmse),
            metric(bundle.r2)
        ),
        ProblemType::Unsupervised => format!(
            "{} produced the best separated clusters (silhouette {:.3})",
            winner.model_name,
            metric(bundle.silhouette)
        ),
    };

    format!(
        "{}. Composite score {:.3} after an overfit gap of {:.3} \
         and cross-validation std of {:.3}.",
        headline,
        winner.final_score,
        winner.overfit_gap,
        metric(bundle.cv_std)
    )
}

fn tradeoffs(winner: &RankedModel, problem_type: ProblemType) -> String {
    if !problem_type.is_supervised() {
        return "Cluster quality is measured without ground truth labels.".to_string();
    }
    if winner.overfit_gap > OVERFIT_WARNING_GAP {
        format!(
            "Training and validation scores differ by {:.3}; the model may be overfitting.",
            winner.overfit_gap
        )
    } else {
        "Training and validation scores are consistent.".to_string()
    }
}
