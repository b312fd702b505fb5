//! Column profiling
//!
//! Builds the immutable [`Dataset`] that every scorer, the problem-type
//! classifier and the preprocessing planner read from.

use std::collections::HashMap;

use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};
use super::stats;

/// Coarse type class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Boolean,
    Datetime,
    Other,
}

impl ColumnKind {
    /// Classify a polars dtype
    pub fn from_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Boolean => ColumnKind::Boolean,
            d if d.is_primitive_numeric() => ColumnKind::Numeric,
            DataType::String | DataType::Categorical(_, _) | DataType::Enum(_, _) => {
                ColumnKind::Categorical
            }
            DataType::Date | DataType::Datetime(_, _) | DataType::Time | DataType::Duration(_) => {
                ColumnKind::Datetime
            }
            _ => ColumnKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Datetime => "datetime",
            ColumnKind::Other => "other",
        }
    }
}

/// Descriptive statistics of a numeric column. Absent when not computable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub skewness: Option<f64>,
}

impl NumericStats {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            mean: stats::mean(values),
            median: stats::median(values),
            std: stats::sample_std(values),
            min: stats::min(values),
            max: stats::max(values),
            skewness: stats::skewness(values),
        }
    }
}

/// Per-column statistics used by every downstream scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub row_count: usize,
    /// Distinct non-missing values
    pub unique_count: usize,
    pub missing_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
}

impl ColumnProfile {
    pub fn missing_ratio(&self) -> f64 {
        if self.row_count == 0 {
            return 0.0;
        }
        self.missing_count as f64 / self.row_count as f64
    }

    /// Distinct non-missing values over total rows
    pub fn unique_ratio(&self) -> f64 {
        self.unique_count as f64 / self.row_count.max(1) as f64
    }

    /// Distinct values when a missing value counts as one more value
    pub fn distinct_with_missing(&self) -> usize {
        self.unique_count + usize::from(self.missing_count > 0)
    }

    /// Every row carries a different value
    pub fn is_identifier(&self) -> bool {
        self.row_count > 0 && self.distinct_with_missing() == self.row_count
    }

    /// At most one distinct value, missing included
    pub fn is_constant(&self) -> bool {
        self.distinct_with_missing() <= 1
    }

    pub fn present_count(&self) -> usize {
        self.row_count - self.missing_count
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }
}

/// A profiled dataset for one analysis run.
///
/// Column order is the order of the source frame and is the order used for
/// reporting and for breaking score ties.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    profiles: HashMap<String, ColumnProfile>,
    row_count: usize,
    frame: DataFrame,
}

impl Dataset {
    /// Profile every column of `frame`.
    ///
    /// Fails with [`EngineError::NoColumns`] or [`EngineError::EmptyDataset`]
    /// before any profiling work is done.
    pub fn from_frame(frame: DataFrame) -> EngineResult<Self> {
        if frame.width() == 0 {
            return Err(EngineError::NoColumns);
        }
        if frame.height() == 0 {
            return Err(EngineError::EmptyDataset);
        }

        let row_count = frame.height();
        let profiles: Vec<ColumnProfile> = frame
            .get_columns()
            .par_iter()
            .map(|col| profile_column(col, row_count))
            .collect::<PolarsResult<Vec<_>>>()?;

        let columns: Vec<String> = profiles.iter().map(|p| p.name.clone()).collect();
        let profiles = profiles.into_iter().map(|p| (p.name.clone(), p)).collect();

        Ok(Self {
            columns,
            profiles,
            row_count,
            frame,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn profile(&self, name: &str) -> Option<&ColumnProfile> {
        self.profiles.get(name)
    }

    /// Profiles in dataset order
    pub fn profiles(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.iter().filter_map(|c| self.profiles.get(c))
    }

    /// Look up a column by name ignoring case
    pub fn find_column_ignore_case(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        self.columns
            .iter()
            .find(|c| c.to_lowercase() == wanted)
            .map(|c| c.as_str())
    }

    pub fn column(&self, name: &str) -> EngineResult<&Column> {
        self.frame
            .column(name)
            .map_err(|_| EngineError::UnknownColumn(name.to_string()))
    }
}

/// Compute the profile of a single column.
///
/// Float NaN and infinities count as missing, the same values the
/// preprocessing stage imputes.
pub fn profile_column(col: &Column, row_count: usize) -> PolarsResult<ColumnProfile> {
    let kind = ColumnKind::from_dtype(col.dtype());

    let present = if kind == ColumnKind::Numeric {
        Some(stats::present(&stats::numeric_values(col)?))
    } else {
        None
    };

    let (missing_count, unique_count) = match &present {
        Some(values) if col.dtype().is_float() => {
            (row_count.saturating_sub(values.len()), distinct_floats(values))
        }
        _ => (
            col.null_count(),
            col.as_materialized_series().drop_nulls().n_unique()?,
        ),
    };

    Ok(ColumnProfile {
        name: col.name().to_string(),
        kind,
        row_count,
        unique_count: unique_count.min(row_count),
        missing_count,
        numeric: present.map(|values| NumericStats::from_values(&values)),
    })
}

fn distinct_floats(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_from_dtypes() {
        let df = df! {
            "num" => [1i32, 2, 3],
            "float" => [1.0f64, 2.5, 3.0],
            "cat" => ["a", "b", "a"],
            "flag" => [true, false, true],
        }
        .unwrap();

        let ds = Dataset::from_frame(df).unwrap();
        assert_eq!(ds.profile("num").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(ds.profile("float").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(ds.profile("cat").unwrap().kind, ColumnKind::Categorical);
        assert_eq!(ds.profile("flag").unwrap().kind, ColumnKind::Boolean);
    }

    #[test]
    fn test_counts_and_ratios() {
        let df = df! {
            "x" => [Some(1.0f64), None, Some(1.0), Some(2.0)],
        }
        .unwrap();

        let ds = Dataset::from_frame(df).unwrap();
        let p = ds.profile("x").unwrap();
        assert_eq!(p.row_count, 4);
        assert_eq!(p.missing_count, 1);
        assert_eq!(p.unique_count, 2);
        assert_eq!(p.distinct_with_missing(), 3);
        assert!((p.missing_ratio() - 0.25).abs() < 1e-12);
        assert!((p.unique_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_stats_skip_missing() {
        let df = df! {
            "x" => [Some(1.0f64), None, Some(3.0), Some(5.0)],
        }
        .unwrap();

        let ds = Dataset::from_frame(df).unwrap();
        let stats = ds.profile("x").unwrap().numeric.clone().unwrap();
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.median, Some(3.0));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(5.0));
        assert_eq!(stats.std, Some(2.0));
    }

    #[test]
    fn test_all_missing_numeric_has_absent_stats() {
        let df = df! {
            "x" => [None::<f64>, None, None],
            "y" => [1i32, 2, 3],
        }
        .unwrap();

        let ds = Dataset::from_frame(df).unwrap();
        let stats = ds.profile("x").unwrap().numeric.clone().unwrap();
        assert_eq!(stats, NumericStats::default());
    }

    #[test]
    fn test_nan_values_never_leak() {
        let df = df! {
            "x" => [1.0f64, f64::NAN, f64::INFINITY, 3.0],
        }
        .unwrap();

        let ds = Dataset::from_frame(df).unwrap();
        let stats = ds.profile("x").unwrap().numeric.clone().unwrap();
        assert_eq!(stats.mean, Some(2.0));
        assert!(stats.std.unwrap().is_finite());
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let df = df! {
            "x" => [1.0f64, f64::NAN, f64::NAN, f64::NAN, 5.0, 6.0],
            "y" => [Some(2.0f64), None, Some(f64::NAN), Some(2.0), Some(0.0), Some(-0.0)],
        }
        .unwrap();

        let ds = Dataset::from_frame(df).unwrap();
        let x = ds.profile("x").unwrap();
        assert_eq!(x.missing_count, 3);
        assert_eq!(x.unique_count, 3);
        assert!((x.missing_ratio() - 0.5).abs() < 1e-12);

        // null and NaN both missing; signed zeros are one value
        let y = ds.profile("y").unwrap();
        assert_eq!(y.missing_count, 2);
        assert_eq!(y.unique_count, 2);
    }

    #[test]
    fn test_identifier_and_constant() {
        let df = df! {
            "id" => [1i32, 2, 3, 4],
            "const" => ["a", "a", "a", "a"],
        }
        .unwrap();

        let ds = Dataset::from_frame(df).unwrap();
        assert!(ds.profile("id").unwrap().is_identifier());
        assert!(!ds.profile("id").unwrap().is_constant());
        assert!(ds.profile("const").unwrap().is_constant());
    }

    #[test]
    fn test_empty_inputs_are_errors() {
        let empty_rows = df! { "a" => Vec::<i32>::new() }.unwrap();
        assert!(matches!(
            Dataset::from_frame(empty_rows),
            Err(EngineError::EmptyDataset)
        ));
        assert!(matches!(
            Dataset::from_frame(DataFrame::empty()),
            Err(EngineError::NoColumns)
        ));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let df = df! { "Revenue" => [1i32, 2] }.unwrap();
        let ds = Dataset::from_frame(df).unwrap();
        assert_eq!(ds.find_column_ignore_case(" revenue "), Some("Revenue"));
        assert_eq!(ds.find_column_ignore_case("sales"), None);
    }
}
