//! Preprocessing planning and execution
//!
//! The planner decides, per feature column, how missing values are filled and
//! how the column is scaled or encoded. Outliers are diagnosed with the IQR
//! rule and reported; rows are never removed.

use std::collections::{HashMap, HashSet};

use polars::prelude::*;
use serde::Serialize;

use super::error::{EngineError, EngineResult};
use super::profile::{ColumnKind, ColumnProfile, Dataset};
use super::stats;

/// Fixed processing stages, in order, used for reporting
pub const PIPELINE_STAGES: [&str; 6] = [
    "Raw Dataset",
    "Missing Value Handling",
    "Outlier Diagnostics",
    "Categorical Encoding",
    "Numerical Scaling",
    "Model Ready Dataset",
];

/// Dataset-level row policy
pub const ROW_POLICY: &str = "no row removal";

/// IQR multiplier for outlier bounds
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Fill value for categorical columns with no present values
const MISSING_CATEGORY: &str = "missing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    None,
    Median,
    MostFrequent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    None,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    None,
    OneHot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierPolicy {
    /// Outliers are counted and reported, never removed
    ReportOnly,
    NotApplicable,
}

/// Plan for a single feature column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnPlan {
    pub column: String,
    pub kind: ColumnKind,
    pub missing_strategy: MissingStrategy,
    pub scaling: Scaling,
    pub encoding: Encoding,
    pub outlier_policy: OutlierPolicy,
    /// Datetime and other columns are left out of the model-ready matrix
    pub included: bool,
}

/// IQR outlier count for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub column: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub count: usize,
}

/// Outlier counts before and after imputation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlierDiagnostics {
    pub before: Vec<OutlierReport>,
    pub after: Vec<OutlierReport>,
}

impl OutlierDiagnostics {
    pub fn total_before(&self) -> usize {
        self.before.iter().map(|r| r.count).sum()
    }

    pub fn total_after(&self) -> usize {
        self.after.iter().map(|r| r.count).sum()
    }
}

/// Preprocessing plan for one dataset and target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreprocessingPlan {
    pub target: Option<String>,
    pub columns: Vec<ColumnPlan>,
    pub outliers: OutlierDiagnostics,
    pub row_policy: &'static str,
    pub stages: Vec<String>,
}

impl PreprocessingPlan {
    pub fn column(&self, name: &str) -> Option<&ColumnPlan> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Names of included columns of the given kinds
    pub fn columns_of(&self, kinds: &[ColumnKind]) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.included && kinds.contains(&c.kind))
            .map(|c| c.column.clone())
            .collect()
    }

    pub fn excluded_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.included)
            .map(|c| c.column.clone())
            .collect()
    }
}

/// Plan a single column from its profile
pub fn plan_column(profile: &ColumnProfile) -> ColumnPlan {
    let has_missing = profile.missing_count > 0;
    let (missing_strategy, scaling, encoding, outlier_policy, included) = match profile.kind {
        ColumnKind::Numeric => (
            if has_missing {
                MissingStrategy::Median
            } else {
                MissingStrategy::None
            },
            if profile.unique_count > 2 {
                Scaling::Standard
            } else {
                Scaling::None
            },
            Encoding::None,
            OutlierPolicy::ReportOnly,
            true,
        ),
        ColumnKind::Categorical | ColumnKind::Boolean => (
            if has_missing {
                MissingStrategy::MostFrequent
            } else {
                MissingStrategy::None
            },
            Scaling::None,
            Encoding::OneHot,
            OutlierPolicy::NotApplicable,
            true,
        ),
        ColumnKind::Datetime | ColumnKind::Other => (
            MissingStrategy::None,
            Scaling::None,
            Encoding::None,
            OutlierPolicy::NotApplicable,
            false,
        ),
    };

    ColumnPlan {
        column: profile.name.clone(),
        kind: profile.kind,
        missing_strategy,
        scaling,
        encoding,
        outlier_policy,
        included,
    }
}

/// Build the preprocessing plan for every non-target column
pub fn plan_preprocessing(dataset: &Dataset, target: Option<&str>) -> PreprocessingPlan {
    let columns: Vec<ColumnPlan> = dataset
        .profiles()
        .filter(|p| Some(p.name.as_str()) != target)
        .map(plan_column)
        .collect();

    let mut outliers = OutlierDiagnostics::default();
    for plan in columns
        .iter()
        .filter(|c| c.outlier_policy == OutlierPolicy::ReportOnly)
    {
        let values = match dataset.column(&plan.column).map(stats::numeric_values) {
            Ok(Ok(values)) => values,
            _ => continue,
        };

        let present = stats::present(&values);
        if let Some(report) = iqr_outliers(&plan.column, &present) {
            outliers.before.push(report);
        }

        let fill = stats::median(&present).unwrap_or(0.0);
        let imputed: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill)).collect();
        if let Some(report) = iqr_outliers(&plan.column, &imputed) {
            outliers.after.push(report);
        }
    }

    PreprocessingPlan {
        target: target.map(str::to_string),
        columns,
        outliers,
        row_policy: ROW_POLICY,
        stages: PIPELINE_STAGES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Count values outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`
pub fn iqr_outliers(column: &str, values: &[f64]) -> Option<OutlierReport> {
    let q1 = stats::quantile(values, 0.25)?;
    let q3 = stats::quantile(values, 0.75)?;
    let iqr = q3 - q1;
    let lower_bound = q1 - IQR_MULTIPLIER * iqr;
    let upper_bound = q3 + IQR_MULTIPLIER * iqr;
    let count = values
        .iter()
        .filter(|&&v| v < lower_bound || v > upper_bound)
        .count();

    Some(OutlierReport {
        column: column.to_string(),
        lower_bound,
        upper_bound,
        count,
    })
}

/// Model-ready features produced by [`apply_plan`]
#[derive(Debug, Clone)]
pub struct ProcessedFeatures {
    pub features: DataFrame,
    pub target: Option<Column>,
    /// Non-target columns before encoding
    pub features_before: usize,
    /// Columns in the model-ready matrix
    pub features_after: usize,
}

/// Execute a plan: impute, scale and one-hot encode every included column
pub fn apply_plan(dataset: &Dataset, plan: &PreprocessingPlan) -> EngineResult<ProcessedFeatures> {
    let mut output: Vec<Column> = Vec::new();
    // Source names stay reserved so indicators never shadow a numeric feature
    let mut taken: HashSet<String> = dataset.columns().iter().cloned().collect();

    for column_plan in plan.columns.iter().filter(|c| c.included) {
        let col = dataset.column(&column_plan.column)?;
        match column_plan.encoding {
            Encoding::OneHot => output.extend(one_hot(col, column_plan, &mut taken)?),
            Encoding::None => output.push(numeric_feature(col, column_plan)?),
        }
    }

    if output.is_empty() {
        return Err(EngineError::Pipeline(
            "no valid columns found for preprocessing".to_string(),
        ));
    }

    let target = match plan.target.as_deref() {
        Some(name) => Some(dataset.column(name)?.clone()),
        None => None,
    };

    let features_after = output.len();
    let features = DataFrame::new(output)?;

    tracing::debug!(
        before = plan.columns.len(),
        after = features_after,
        "Applied preprocessing plan"
    );

    Ok(ProcessedFeatures {
        features,
        target,
        features_before: plan.columns.len(),
        features_after,
    })
}

fn numeric_feature(col: &Column, plan: &ColumnPlan) -> EngineResult<Column> {
    let values = stats::numeric_values(col)?;
    let fill = stats::median(&stats::present(&values)).unwrap_or(0.0);
    let mut filled: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(fill)).collect();

    if plan.scaling == Scaling::Standard {
        let mean = stats::mean(&filled).unwrap_or(0.0);
        let std = match stats::population_std(&filled) {
            Some(s) if s > 0.0 => s,
            _ => 1.0,
        };
        for v in filled.iter_mut() {
            *v = (*v - mean) / std;
        }
    }

    Ok(Column::new(plan.column.as_str().into(), filled))
}

fn one_hot(
    col: &Column,
    plan: &ColumnPlan,
    taken: &mut HashSet<String>,
) -> EngineResult<Vec<Column>> {
    let values = stats::string_values(col)?;
    let fill = most_frequent(&values).unwrap_or_else(|| MISSING_CATEGORY.to_string());
    let filled: Vec<String> = values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill.clone()))
        .collect();

    let mut categories: Vec<&str> = filled.iter().map(|s| s.as_str()).collect();
    categories.sort_unstable();
    categories.dedup();

    Ok(categories
        .iter()
        .map(|category| {
            let indicator: Vec<f64> = filled
                .iter()
                .map(|v| if v == category { 1.0 } else { 0.0 })
                .collect();
            let name = unique_name(format!("{}_{}", plan.column, category), taken);
            Column::new(name.into(), indicator)
        })
        .collect())
}

/// Append `_1`, `_2`, ... to `base` until it is not taken, then reserve it
fn unique_name(base: String, taken: &mut HashSet<String>) -> String {
    let mut name = base.clone();
    let mut suffix = 1;
    while taken.contains(&name) {
        name = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    taken.insert(name.clone());
    name
}

/// Most frequent present value; ties go to the smallest value
fn most_frequent(values: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values.iter().flatten() {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(v, _)| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let df = df! {
            "age" => [
                Some(20.0f64), Some(30.0), None, Some(40.0),
                Some(35.0), Some(25.0), Some(200.0), Some(28.0),
            ],
            "binary" => [0i32, 1, 0, 1, 0, 1, 0, 1],
            "city" => [
                Some("a"), Some("b"), None, Some("b"),
                Some("a"), Some("b"), Some("c"), Some("b"),
            ],
            "active" => [true, false, true, true, false, true, true, false],
            "target" => [0i32, 1, 0, 1, 1, 0, 1, 0],
        }
        .unwrap();
        Dataset::from_frame(df).unwrap()
    }

    #[test]
    fn test_target_is_not_planned() {
        let plan = plan_preprocessing(&dataset(), Some("target"));
        assert!(plan.column("target").is_none());
        assert_eq!(plan.columns.len(), 4);
        assert_eq!(plan.target.as_deref(), Some("target"));
    }

    #[test]
    fn test_numeric_plans() {
        let plan = plan_preprocessing(&dataset(), Some("target"));
        let age = plan.column("age").unwrap();
        assert_eq!(age.missing_strategy, MissingStrategy::Median);
        assert_eq!(age.scaling, Scaling::Standard);
        assert_eq!(age.encoding, Encoding::None);
        assert_eq!(age.outlier_policy, OutlierPolicy::ReportOnly);

        let binary = plan.column("binary").unwrap();
        assert_eq!(binary.missing_strategy, MissingStrategy::None);
        assert_eq!(binary.scaling, Scaling::None);
    }

    #[test]
    fn test_categorical_and_boolean_plans() {
        let plan = plan_preprocessing(&dataset(), Some("target"));
        let city = plan.column("city").unwrap();
        assert_eq!(city.missing_strategy, MissingStrategy::MostFrequent);
        assert_eq!(city.encoding, Encoding::OneHot);
        assert_eq!(city.scaling, Scaling::None);

        let active = plan.column("active").unwrap();
        assert_eq!(active.missing_strategy, MissingStrategy::None);
        assert_eq!(active.encoding, Encoding::OneHot);
    }

    #[test]
    fn test_outliers_reported_not_removed() {
        let ds = dataset();
        let plan = plan_preprocessing(&ds, Some("target"));
        let age = plan.outliers.before.iter().find(|r| r.column == "age").unwrap();
        assert_eq!(age.count, 1);
        assert_eq!(plan.row_policy, "no row removal");

        let processed = apply_plan(&ds, &plan).unwrap();
        assert_eq!(processed.features.height(), ds.row_count());
    }

    #[test]
    fn test_six_stages() {
        let plan = plan_preprocessing(&dataset(), None);
        assert_eq!(plan.stages.len(), 6);
        assert_eq!(plan.stages[0], "Raw Dataset");
        assert_eq!(plan.stages[5], "Model Ready Dataset");
    }

    #[test]
    fn test_iqr_bounds() {
        let report = iqr_outliers("x", &[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        // q1 = 2.25, q3 = 4.75, iqr = 2.5
        assert!((report.lower_bound - -1.5).abs() < 1e-12);
        assert!((report.upper_bound - 8.5).abs() < 1e-12);
        assert_eq!(report.count, 1);
        assert!(iqr_outliers("x", &[]).is_none());
    }

    #[test]
    fn test_apply_plan_encodes_and_scales() {
        let ds = dataset();
        let plan = plan_preprocessing(&ds, Some("target"));
        let processed = apply_plan(&ds, &plan).unwrap();

        // age + binary + city_{a,b,c} + active_{false,true}
        assert_eq!(processed.features_before, 4);
        assert_eq!(processed.features_after, 7);
        assert!(processed.target.is_some());

        let names: Vec<String> = processed
            .features
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(names.contains(&"city_b".to_string()));
        assert!(names.contains(&"active_true".to_string()));

        // missing city filled with the most frequent value "b"
        let city_b = processed.features.column("city_b").unwrap().f64().unwrap();
        assert_eq!(city_b.get(2), Some(1.0));

        // standard-scaled age has zero mean
        let age = processed.features.column("age").unwrap().f64().unwrap();
        let mean: f64 = age.into_iter().flatten().sum::<f64>() / age.len() as f64;
        assert!(mean.abs() < 1e-9);
    }

    #[test]
    fn test_datetime_columns_excluded() {
        let df = df! {
            "x" => [1.0f64, 2.0, 3.0],
        }
        .unwrap();
        let dates = Column::new("when".into(), [1i32, 2, 3])
            .cast(&DataType::Date)
            .unwrap();
        let df = df.hstack(&[dates]).unwrap();

        let ds = Dataset::from_frame(df).unwrap();
        let plan = plan_preprocessing(&ds, None);
        assert_eq!(plan.excluded_columns(), vec!["when".to_string()]);

        let processed = apply_plan(&ds, &plan).unwrap();
        assert_eq!(processed.features_after, 1);
    }

    #[test]
    fn test_nothing_to_process_is_error() {
        let df = df! { "target" => [1i32, 2, 3] }.unwrap();
        let ds = Dataset::from_frame(df).unwrap();
        let plan = plan_preprocessing(&ds, Some("target"));
        assert!(matches!(apply_plan(&ds, &plan), Err(EngineError::Pipeline(_))));
    }

    #[test]
    fn test_indicator_names_avoid_existing_columns() {
        let df = df! {
            "plan" => ["a", "b", "a", "b", "a", "b"],
            "plan_a" => [1.5f64, 2.5, 3.5, 4.5, 5.5, 6.5],
            "plan_b" => ["x", "y", "x", "y", "x", "x"],
        }
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();
        let plan = plan_preprocessing(&ds, None);
        let processed = apply_plan(&ds, &plan).unwrap();

        let names: Vec<String> = processed
            .features
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["plan_a_1", "plan_b_1", "plan_a", "plan_b_x", "plan_b_y"]
        );

        // the numeric column keeps its own values
        let numeric = processed.features.column("plan_a").unwrap().f64().unwrap();
        assert!(numeric.into_iter().flatten().any(|v| v != 0.0 && v != 1.0));
    }

    #[test]
    fn test_nan_column_planned_for_imputation() {
        let df = df! {
            "x" => [1.0f64, f64::NAN, f64::NAN, f64::NAN, 5.0, 6.0],
        }
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();
        let plan = plan_preprocessing(&ds, None);
        assert_eq!(plan.column("x").unwrap().missing_strategy, MissingStrategy::Median);

        let processed = apply_plan(&ds, &plan).unwrap();
        let x = processed.features.column("x").unwrap().f64().unwrap();
        assert!(x.into_iter().flatten().all(f64::is_finite));
    }

    #[test]
    fn test_unique_name_counts_up() {
        let mut taken: HashSet<String> = ["x_a", "x_a_1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unique_name("x_a".to_string(), &mut taken), "x_a_2");
        assert_eq!(unique_name("x_b".to_string(), &mut taken), "x_b");
        assert!(taken.contains("x_a_2"));
    }

    #[test]
    fn test_most_frequent_tie_takes_smallest() {
        let values = vec![Some("b".to_string()), Some("a".to_string()), None];
        assert_eq!(most_frequent(&values), Some("a".to_string()));
    }
}
