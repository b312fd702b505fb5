//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

use dataiq::pipeline::{ModelMetricBundle, ProblemType};

/// Fraud dataset: binary `is_fraud` plus nine continuous features
///
/// Feature names carry no ontology words, and every feature value is
/// distinct, so `is_fraud` is the only plausible target.
pub fn create_fraud_dataframe(rows: usize) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(7);

    let mut columns: Vec<Column> = Vec::with_capacity(10);
    let is_fraud: Vec<i32> = (0..rows).map(|i| (i % 2) as i32).collect();
    columns.push(Column::new("is_fraud".into(), is_fraud));

    for f in 1..=9 {
        let values: Vec<f64> = (0..rows)
            .map(|i| i as f64 + rng.gen_range(0.0..0.5))
            .collect();
        columns.push(Column::new(format!("f{}", f).into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Identifier plus an all-distinct price column
pub fn create_identifier_dataframe(rows: usize) -> DataFrame {
    df! {
        "id" => (0..rows as i64).collect::<Vec<_>>(),
        "price" => (0..rows).map(|i| 10.0 + i as f64 * 0.25).collect::<Vec<_>>(),
    }
    .unwrap()
}

/// Retail dataset used for misspelled-target tests
pub fn create_retail_dataframe() -> DataFrame {
    let rows = 50;
    df! {
        "revenue" => (0..rows).map(|i| (i % 17) as f64 * 12.5).collect::<Vec<_>>(),
        "price" => (0..rows).map(|i| (i % 7) as f64 + 0.99).collect::<Vec<_>>(),
        "quantity" => (0..rows).map(|i| (i % 5) as i32).collect::<Vec<_>>(),
        "store_id" => (0..rows).map(|i| (i % 4) as i32).collect::<Vec<_>>(),
    }
    .unwrap()
}

/// Mixed dataset with missing values, categoricals and a constant column
pub fn create_mixed_dataframe() -> DataFrame {
    df! {
        "age" => [
            Some(34.0f64), Some(51.0), None, Some(29.0), Some(42.0),
            Some(38.0), Some(95.0), Some(47.0), Some(31.0), None,
        ],
        "region" => [
            Some("north"), Some("south"), Some("south"), None, Some("east"),
            Some("north"), Some("south"), Some("east"), Some("south"), Some("north"),
        ],
        "member" => [true, false, true, true, false, false, true, true, false, true],
        "country" => ["za"; 10],
        "visits" => [3i32, 1, 4, 1, 5, 9, 2, 6, 5, 3],
        "outcome" => ["won", "lost", "won", "won", "lost", "won", "lost", "won", "lost", "won"],
    }
    .unwrap()
}

/// Random dataset for stress tests
pub fn create_large_test_dataframe(rows: usize, cols: usize) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(42);

    let mut columns: Vec<Column> = Vec::with_capacity(cols + 1);
    let target: Vec<i32> = (0..rows).map(|_| rng.gen_range(0..2)).collect();
    columns.push(Column::new("target".into(), target));

    for i in 0..cols {
        let values: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
        columns.push(Column::new(format!("feature_{}", i).into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Classification bundles with f1 = [0.9, 0.85, 0.95] and cv_std = [0.01, 0.02, 0.20]
pub fn create_stability_bundles() -> Vec<ModelMetricBundle> {
    let bundle = |name: &str, f1: f64, train: f64, cv_mean: f64, cv_std: f64| ModelMetricBundle {
        accuracy: Some(f1),
        f1: Some(f1),
        recall: Some(f1),
        train_score: Some(train),
        cv_mean: Some(cv_mean),
        cv_std: Some(cv_std),
        ..ModelMetricBundle::new(name)
    };
    vec![
        bundle("LogisticRegression", 0.90, 0.92, 0.90, 0.01),
        bundle("DecisionTreeClassifier", 0.85, 0.87, 0.85, 0.02),
        bundle("RandomForestClassifier", 0.95, 1.00, 0.85, 0.20),
    ]
}

/// Write metric bundles as a JSON list
pub fn create_temp_metrics(bundles: &[ModelMetricBundle]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("metrics.json");
    std::fs::write(&path, serde_json::to_string(bundles).unwrap()).unwrap();
    (temp_dir, path)
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Every problem type, for exhaustive checks
pub fn all_problem_types() -> [ProblemType; 3] {
    [
        ProblemType::Classification,
        ProblemType::Regression,
        ProblemType::Unsupervised,
    ]
}
