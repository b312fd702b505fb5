//! Error types for the dataset intelligence engine.

use thiserror::Error;

/// Errors surfaced by the engine to its host.
///
/// Ambiguous targets, missing association signal, empty metric batches and
/// datasets without an eligible target are not errors: they are represented
/// by `TargetResolution::NeedsUserInput`, a zero score, `None` and
/// `TargetResolution::Unsupervised` respectively.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The dataset has columns but no rows.
    #[error("dataset is empty: no rows to analyze")]
    EmptyDataset,

    /// The dataset has no columns at all.
    #[error("dataset has no columns")]
    NoColumns,

    /// A column was requested that does not exist in the dataset.
    #[error("column '{0}' not found in dataset")]
    UnknownColumn(String),

    /// Polars failed while reading column data.
    #[error("failed to read column data: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Opaque failure during preprocessing or training.
    #[error("analysis pipeline failed: {0}")]
    Pipeline(String),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
