//! Association signal: how predictable a column is from all the others
//!
//! A column that behaves like a downstream effect of the remaining features
//! shares a lot of information with them. The signal is advisory: any
//! failure while computing it is logged and counted as zero.
//!
//! The scorer is chosen once, when the engine is configured, through
//! [`association_strategy`]. When the `mutual-info` feature is compiled out
//! or the signal is disabled, [`NoAssociation`] is used and always returns 0.

use std::collections::HashMap;

use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;

use super::profile::{ColumnKind, Dataset};
use super::stats;

/// Upper bound of the association contribution
pub const MAX_ASSOCIATION_SCORE: f64 = 5.0;

/// Numeric candidates with more distinct values use the regression-style estimator
pub const REGRESSION_MIN_DISTINCT: usize = 10;

/// Number of equal-frequency bins used for continuous values
const MAX_BINS: usize = 10;

/// Label given to missing values of encoded categorical columns
const MISSING_LABEL: &str = "<NA>";

#[derive(Debug, Error)]
pub enum AssociationError {
    #[error("no other columns to associate '{0}' with")]
    NoFeatures(String),

    #[error("column '{0}' encodes to a single value")]
    Degenerate(String),

    #[error("column '{0}' not found")]
    UnknownColumn(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Strategy computing the association contribution of each candidate column
pub trait AssociationScorer: Send + Sync {
    /// Short name for logs and reports
    fn name(&self) -> &'static str;

    /// Contribution in `[0, MAX_ASSOCIATION_SCORE]` for each candidate.
    ///
    /// Never fails: candidates whose signal cannot be computed get 0.
    fn scores(&self, dataset: &Dataset, candidates: &[&str]) -> HashMap<String, f64>;
}

/// Pick the association strategy once, at configuration time
pub fn association_strategy(enabled: bool) -> Box<dyn AssociationScorer> {
    if enabled && cfg!(feature = "mutual-info") {
        Box::new(MutualInfoScorer)
    } else {
        Box::new(NoAssociation)
    }
}

/// Scorer used when the association signal is unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssociation;

impl AssociationScorer for NoAssociation {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn scores(&self, _dataset: &Dataset, candidates: &[&str]) -> HashMap<String, f64> {
        candidates.iter().map(|c| (c.to_string(), 0.0)).collect()
    }
}

/// Binned mutual information between a candidate and every other column
#[derive(Debug, Clone, Copy, Default)]
pub struct MutualInfoScorer;

impl AssociationScorer for MutualInfoScorer {
    fn name(&self) -> &'static str {
        "mutual_information"
    }

    fn scores(&self, dataset: &Dataset, candidates: &[&str]) -> HashMap<String, f64> {
        let features = match encode_features(dataset) {
            Ok(features) => features,
            Err(e) => {
                tracing::warn!(error = %e, "Association matrix unavailable, signal skipped");
                return candidates.iter().map(|c| (c.to_string(), 0.0)).collect();
            }
        };

        candidates
            .par_iter()
            .map(|candidate| {
                let score = match candidate_signal(dataset, &features, candidate) {
                    Ok(mi) => (mi * MAX_ASSOCIATION_SCORE).clamp(0.0, MAX_ASSOCIATION_SCORE),
                    Err(e) => {
                        tracing::debug!(
                            column = *candidate,
                            error = %e,
                            "Association signal failed"
                        );
                        0.0
                    }
                };
                (candidate.to_string(), score)
            })
            .collect()
    }
}

/// A column encoded into discrete codes
#[derive(Debug, Clone)]
struct EncodedFeature {
    name: String,
    codes: Vec<usize>,
    levels: usize,
}

/// Encode every column once: numeric columns median-imputed, the rest label-encoded
fn encode_features(dataset: &Dataset) -> Result<Vec<EncodedFeature>, AssociationError> {
    dataset
        .columns()
        .par_iter()
        .map(|name| {
            let values = encode_column(dataset, name)?;
            let (codes, levels) = discretize(&values);
            Ok(EncodedFeature {
                name: name.clone(),
                codes,
                levels,
            })
        })
        .collect()
}

/// Numeric encoding of one column
fn encode_column(dataset: &Dataset, name: &str) -> Result<Vec<f64>, AssociationError> {
    let profile = dataset
        .profile(name)
        .ok_or_else(|| AssociationError::UnknownColumn(name.to_string()))?;
    let col = dataset
        .column(name)
        .map_err(|_| AssociationError::UnknownColumn(name.to_string()))?;

    match profile.kind {
        ColumnKind::Numeric | ColumnKind::Boolean => Ok(median_imputed(col)?),
        _ => {
            let (codes, _) = label_encode(&stats::string_values(col)?);
            Ok(codes.into_iter().map(|c| c as f64).collect())
        }
    }
}

fn median_imputed(col: &Column) -> PolarsResult<Vec<f64>> {
    let values = stats::numeric_values(col)?;
    let fill = stats::median(&stats::present(&values)).unwrap_or(0.0);
    Ok(values.into_iter().map(|v| v.unwrap_or(fill)).collect())
}

/// Sorted-label encoding; missing values become their own label
fn label_encode(values: &[Option<String>]) -> (Vec<usize>, usize) {
    let labels: Vec<&str> = values
        .iter()
        .map(|v| v.as_deref().unwrap_or(MISSING_LABEL))
        .collect();
    let mut classes = labels.clone();
    classes.sort_unstable();
    classes.dedup();

    let codes = labels
        .iter()
        .map(|l| classes.binary_search(l).unwrap_or(0))
        .collect();
    (codes, classes.len())
}

/// Map values onto at most `MAX_BINS` discrete levels.
///
/// Columns with few distinct values keep one level per value; others are cut
/// at equal-frequency quantiles.
fn discretize(values: &[f64]) -> (Vec<usize>, usize) {
    let mut distinct = values.to_vec();
    distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    distinct.dedup();

    if distinct.len() <= MAX_BINS {
        let codes = values
            .iter()
            .map(|v| distinct.partition_point(|d| d < v))
            .collect();
        return (codes, distinct.len().max(1));
    }

    let mut cuts: Vec<f64> = (1..MAX_BINS)
        .filter_map(|k| stats::quantile(values, k as f64 / MAX_BINS as f64))
        .collect();
    cuts.dedup();

    let codes = values
        .iter()
        .map(|v| cuts.partition_point(|c| c < v))
        .collect();
    (codes, cuts.len() + 1)
}

/// Mean mutual information between `candidate` and every other column
fn candidate_signal(
    dataset: &Dataset,
    features: &[EncodedFeature],
    candidate: &str,
) -> Result<f64, AssociationError> {
    let others: Vec<&EncodedFeature> = features.iter().filter(|f| f.name != candidate).collect();
    if others.is_empty() {
        return Err(AssociationError::NoFeatures(candidate.to_string()));
    }

    let profile = dataset
        .profile(candidate)
        .ok_or_else(|| AssociationError::UnknownColumn(candidate.to_string()))?;
    let col = dataset
        .column(candidate)
        .map_err(|_| AssociationError::UnknownColumn(candidate.to_string()))?;

    // Regression-style: continuous target cut into quantile bins.
    // Classification-style: one level per label.
    let (target, levels) =
        if profile.kind == ColumnKind::Numeric && profile.unique_count > REGRESSION_MIN_DISTINCT {
            discretize(&median_imputed(col)?)
        } else {
            label_encode(&stats::string_values(col)?)
        };

    if levels < 2 {
        return Err(AssociationError::Degenerate(candidate.to_string()));
    }

    let total: f64 = others
        .iter()
        .map(|f| mutual_information(&f.codes, f.levels, &target, levels))
        .sum();
    Ok(total / others.len() as f64)
}

/// Plug-in mutual information in nats with the Miller-Madow bias correction, floored at 0
fn mutual_information(x: &[usize], x_levels: usize, y: &[usize], y_levels: usize) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }

    let mut joint = vec![0usize; x_levels * y_levels];
    let mut px = vec![0usize; x_levels];
    let mut py = vec![0usize; y_levels];
    for (&a, &b) in x.iter().zip(y.iter()) {
        joint[a * y_levels + b] += 1;
        px[a] += 1;
        py[b] += 1;
    }

    let nf = n as f64;
    let mut mi = 0.0;
    for (a, &ca) in px.iter().enumerate() {
        for (b, &cb) in py.iter().enumerate() {
            let c = joint[a * y_levels + b];
            if c == 0 {
                continue;
            }
            let pxy = c as f64 / nf;
            mi += pxy * (pxy * nf * nf / (ca as f64 * cb as f64)).ln();
        }
    }

    let kx = px.iter().filter(|&&c| c > 0).count();
    let ky = py.iter().filter(|&&c| c > 0).count();
    let correction = (kx.saturating_sub(1) * ky.saturating_sub(1)) as f64 / (2.0 * nf);

    (mi - correction).max(0.0)
}
