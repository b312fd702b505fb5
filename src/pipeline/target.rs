//! Target column resolution
//!
//! Resolves the prediction target either from a user-supplied name (exact,
//! then fuzzy) or automatically, by combining the semantic, statistical,
//! domain and association scores of every eligible column.

use serde::{Deserialize, Serialize};

use super::association::{association_strategy, AssociationScorer};
use super::domain::{infer_domain, Domain};
use super::profile::{ColumnKind, ColumnProfile, Dataset};
use super::scoring::{domain_bonus, semantic_score, statistical_score};

/// Minimum combined score for an automatically detected target
pub const ACCEPTANCE_THRESHOLD: f64 = 6.0;

/// Minimum name similarity for a fuzzy suggestion
pub const FUZZY_CUTOFF: f64 = 0.4;

/// Maximum number of fuzzy suggestions returned
pub const MAX_SUGGESTIONS: usize = 3;

/// How a target column was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Auto,
    UserExact,
    AutoFallback,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Auto => "auto",
            ResolutionSource::UserExact => "user_exact",
            ResolutionSource::AutoFallback => "auto_fallback",
        }
    }
}

/// Outcome of target resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetResolution {
    Resolved {
        column: String,
        source: ResolutionSource,
    },
    /// The user named a column that does not exist but resembles others
    NeedsUserInput {
        attempted_name: String,
        suggestions: Vec<String>,
        all_columns: Vec<String>,
    },
    Unsupervised {
        reason: String,
    },
}

impl TargetResolution {
    /// The resolved target column, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            TargetResolution::Resolved { column, .. } => Some(column),
            _ => None,
        }
    }
}

/// Why a column was not scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    Constant,
    Identifier,
    Datetime,
}

/// Per-column score with every addend kept separately
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub column: String,
    pub semantic: f64,
    pub statistical: f64,
    pub domain: f64,
    pub association: f64,
    pub total: f64,
}

/// Everything the automatic detection looked at
#[derive(Debug, Clone, Serialize)]
pub struct TargetDetection {
    pub domain: Domain,
    pub association: &'static str,
    /// Scores of eligible columns, in dataset order
    pub scores: Vec<ScoreBreakdown>,
    pub excluded: Vec<(String, Exclusion)>,
    pub threshold: f64,
}

impl TargetDetection {
    /// Highest-scoring column; the first in dataset order wins ties
    pub fn best(&self) -> Option<&ScoreBreakdown> {
        self.scores.iter().fold(None, |best, s| match best {
            Some(b) if b.total >= s.total => Some(b),
            _ => Some(s),
        })
    }
}

/// Check whether a column may be considered as a target at all
pub fn exclusion(profile: &ColumnProfile) -> Option<Exclusion> {
    if profile.is_constant() {
        Some(Exclusion::Constant)
    } else if profile.is_identifier() {
        Some(Exclusion::Identifier)
    } else if profile.kind == ColumnKind::Datetime {
        Some(Exclusion::Datetime)
    } else {
        None
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Suggest up to [`MAX_SUGGESTIONS`] columns whose names resemble `user_input`.
///
/// Similarity is the sequence-matcher ratio `2 * M / T` over lower-cased,
/// trimmed names, where `M` counts characters in matching blocks and `T` is
/// the combined length. Results are ordered by decreasing ratio, ties in
/// column order.
pub fn suggest_target_columns<S: AsRef<str>>(
    user_input: &str,
    columns: &[S],
    cutoff: f64,
) -> Vec<String> {
    let wanted = normalize(user_input);
    if wanted.is_empty() {
        return Vec::new();
    }

    // get_close_matches panics outside [0, 1]
    let cutoff = if cutoff.is_nan() { 1.0 } else { cutoff.clamp(0.0, 1.0) };

    let candidates: Vec<String> = columns.iter().map(|c| normalize(c.as_ref())).collect();
    let possibilities: Vec<&str> = candidates
        .iter()
        .map(String::as_str)
        .filter(|c| !c.is_empty())
        .collect();

    difflib::get_close_matches(&wanted, possibilities, MAX_SUGGESTIONS, cutoff as f32)
        .into_iter()
        .filter_map(|hit| {
            candidates
                .iter()
                .position(|c| std::ptr::eq(c.as_str(), hit))
        })
        .map(|i| columns[i].as_ref().to_string())
        .collect()
}

/// Target resolver with its thresholds and association strategy fixed at construction
pub struct TargetResolver {
    acceptance_threshold: f64,
    fuzzy_cutoff: f64,
    association: Box<dyn AssociationScorer>,
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new(ACCEPTANCE_THRESHOLD, FUZZY_CUTOFF, association_strategy(true))
    }
}

impl TargetResolver {
    pub fn new(
        acceptance_threshold: f64,
        fuzzy_cutoff: f64,
        association: Box<dyn AssociationScorer>,
    ) -> Self {
        Self {
            acceptance_threshold,
            fuzzy_cutoff,
            association,
        }
    }

    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }

    pub fn association_name(&self) -> &'static str {
        self.association.name()
    }

    /// Score every eligible column of the dataset
    pub fn detect(&self, dataset: &Dataset) -> TargetDetection {
        let domain = infer_domain(dataset.columns());

        let mut excluded = Vec::new();
        let mut eligible: Vec<&ColumnProfile> = Vec::new();
        for profile in dataset.profiles() {
            match exclusion(profile) {
                Some(reason) => excluded.push((profile.name.clone(), reason)),
                None => eligible.push(profile),
            }
        }

        let names: Vec<&str> = eligible.iter().map(|p| p.name.as_str()).collect();
        let association = if names.is_empty() {
            Default::default()
        } else {
            self.association.scores(dataset, &names)
        };

        let scores = eligible
            .iter()
            .map(|profile| {
                let semantic = semantic_score(&profile.name);
                let statistical = statistical_score(profile);
                let bonus = domain_bonus(&profile.name, domain);
                let association = association.get(&profile.name).copied().unwrap_or(0.0);
                ScoreBreakdown {
                    column: profile.name.clone(),
                    semantic,
                    statistical,
                    domain: bonus,
                    association,
                    total: semantic + statistical + bonus + association,
                }
            })
            .collect();

        TargetDetection {
            domain,
            association: self.association.name(),
            scores,
            excluded,
            threshold: self.acceptance_threshold,
        }
    }

    /// Resolve the target column
    pub fn resolve(&self, dataset: &Dataset, user_target: Option<&str>) -> TargetResolution {
        self.resolve_explained(dataset, user_target).0
    }

    /// Resolve the target column and return the automatic detection when it ran
    pub fn resolve_explained(
        &self,
        dataset: &Dataset,
        user_target: Option<&str>,
    ) -> (TargetResolution, Option<TargetDetection>) {
        let asserted = user_target.map(str::trim).filter(|t| !t.is_empty());

        let source = match asserted {
            Some(name) => {
                if let Some(column) = dataset.find_column_ignore_case(name) {
                    tracing::info!(column, "Target matched user input");
                    return (
                        TargetResolution::Resolved {
                            column: column.to_string(),
                            source: ResolutionSource::UserExact,
                        },
                        None,
                    );
                }

                let suggestions =
                    suggest_target_columns(name, dataset.columns(), self.fuzzy_cutoff);
                if !suggestions.is_empty() {
                    tracing::info!(attempted = name, ?suggestions, "Target needs user input");
                    return (
                        TargetResolution::NeedsUserInput {
                            attempted_name: name.to_string(),
                            suggestions,
                            all_columns: dataset.columns().to_vec(),
                        },
                        None,
                    );
                }

                tracing::warn!(
                    attempted = name,
                    "No column resembles user target, detecting automatically"
                );
                ResolutionSource::AutoFallback
            }
            None => ResolutionSource::Auto,
        };

        let detection = self.detect(dataset);
        let resolution = match detection.best() {
            None => TargetResolution::Unsupervised {
                reason: "no eligible target columns".to_string(),
            },
            Some(best) if best.total < self.acceptance_threshold => TargetResolution::Unsupervised {
                reason: format!(
                    "best candidate '{}' scored {:.2}, below acceptance threshold {:.2}",
                    best.column, best.total, self.acceptance_threshold
                ),
            },
            Some(best) => {
                tracing::info!(
                    column = best.column.as_str(),
                    score = best.total,
                    source = source.as_str(),
                    "Target detected"
                );
                TargetResolution::Resolved {
                    column: best.column.clone(),
                    source,
                }
            }
        };

        (resolution, Some(detection))
    }
}
