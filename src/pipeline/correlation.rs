//! Pearson correlation between numeric columns

use faer::Mat;
use rayon::prelude::*;
use serde::Serialize;

use super::profile::Dataset;
use super::stats;

/// Default absolute correlation above which a pair is reported
pub const STRONG_CORRELATION: f64 = 0.8;

/// Column count at which the matrix path takes over from pairwise scans
const MATRIX_METHOD_COLUMN_THRESHOLD: usize = 15;

/// A pair of strongly correlated numeric features
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelatedPair {
    pub feature1: String,
    pub feature2: String,
    pub correlation: f64,
}

/// Numeric columns as f64 vectors, in dataset order
fn numeric_columns(dataset: &Dataset) -> Vec<(String, Vec<Option<f64>>)> {
    dataset
        .profiles()
        .filter(|p| p.is_numeric())
        .filter_map(|p| {
            let col = dataset.column(&p.name).ok()?;
            let values = stats::numeric_values(col).ok()?;
            Some((p.name.clone(), values))
        })
        .collect()
}

/// Find numeric pairs with `|r| > threshold`, strongest first.
///
/// Picks the matrix method for wide datasets and pairwise scans otherwise.
pub fn find_correlated_pairs(dataset: &Dataset, threshold: f64) -> Vec<CorrelatedPair> {
    let columns = numeric_columns(dataset);
    if columns.len() < 2 {
        return Vec::new();
    }

    let has_missing = columns
        .iter()
        .any(|(_, values)| values.iter().any(Option::is_none));

    let mut pairs = if columns.len() >= MATRIX_METHOD_COLUMN_THRESHOLD && !has_missing {
        correlated_pairs_matrix(&columns, threshold)
    } else {
        correlated_pairs_pairwise(&columns, threshold)
    };

    pairs.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::debug!(
        columns = columns.len(),
        pairs = pairs.len(),
        "Computed numeric correlations"
    );

    pairs
}

fn correlated_pairs_pairwise(
    columns: &[(String, Vec<Option<f64>>)],
    threshold: f64,
) -> Vec<CorrelatedPair> {
    let n = columns.len();
    let index_pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    index_pairs
        .par_iter()
        .filter_map(|&(i, j)| {
            let (name1, values1) = &columns[i];
            let (name2, values2) = &columns[j];
            let corr = pearson(values1, values2)?;
            (corr.abs() > threshold).then(|| CorrelatedPair {
                feature1: name1.clone(),
                feature2: name2.clone(),
                correlation: corr,
            })
        })
        .collect()
}

/// Pearson correlation over rows where both values are present
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    // Welford
    for (a, b) in x.iter().zip(y.iter()) {
        if let (Some(a), Some(b)) = (a, b) {
            n += 1.0;
            let dx = a - mean_x;
            let dy = b - mean_y;
            mean_x += dx / n;
            mean_y += dy / n;
            var_x += dx * (a - mean_x);
            var_y += dy * (b - mean_y);
            cov_xy += dx * (b - mean_y);
        }
    }

    if n < 2.0 || var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    stats::finite(cov_xy / (var_x.sqrt() * var_y.sqrt()))
}

/// Correlation matrix as `Z^T Z` over standardized columns with no missing values
fn correlated_pairs_matrix(
    columns: &[(String, Vec<Option<f64>>)],
    threshold: f64,
) -> Vec<CorrelatedPair> {
    let standardized: Vec<(&str, Vec<f64>)> = columns
        .par_iter()
        .filter_map(|(name, values)| {
            let present = stats::present(values);
            let mean = stats::mean(&present)?;
            let std = stats::population_std(&present)?;
            if std == 0.0 {
                return None;
            }
            let scale = (present.len() as f64).sqrt() * std;
            let z = present.iter().map(|v| (v - mean) / scale).collect();
            Some((name.as_str(), z))
        })
        .collect();

    if standardized.len() < 2 {
        return Vec::new();
    }

    let n_rows = standardized[0].1.len();
    let n_cols = standardized.len();
    let mut z = Mat::<f64>::zeros(n_rows, n_cols);
    for (col_idx, (_, values)) in standardized.iter().enumerate() {
        for (row_idx, &v) in values.iter().enumerate() {
            z[(row_idx, col_idx)] = v;
        }
    }

    let corr = z.transpose() * &z;

    let mut pairs = Vec::new();
    for i in 0..n_cols {
        for j in (i + 1)..n_cols {
            let c = corr[(i, j)];
            if c.abs() > threshold && c.is_finite() {
                pairs.push(CorrelatedPair {
                    feature1: standardized[i].0.to_string(),
                    feature2: standardized[j].0.to_string(),
                    correlation: c,
                });
            }
        }
    }
    pairs
}
