//! Host-side record of datasets and the state of their analysis
//!
//! Each record moves through `analyzing` to one of `needs_user_input`,
//! `completed` or `failed`. Results are written only when a run finishes, so a
//! reader never sees a half-written analysis.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::analysis::{analyze_dataset, AnalysisOutcome, EngineConfig};
use super::profile::Dataset;
use super::trainer::ModelTrainer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No record exists for the id
    #[error("Unknown dataset '{0}'")]
    UnknownDataset(String),

    /// A record with the id already exists
    #[error("Dataset '{0}' is already registered")]
    AlreadyRegistered(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Analyzing,
    NeedsUserInput,
    Completed,
    Failed,
}

/// State of the retrieval index built for a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Pending,
    Indexing,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetRecord {
    pub id: String,
    pub file_path: PathBuf,
    pub analysis_status: AnalysisStatus,
    pub index_status: IndexStatus,
    pub error_message: Option<String>,
    pub index_error: Option<String>,
    pub outcome: Option<AnalysisOutcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Thread-safe map of dataset id to record
#[derive(Debug, Default)]
pub struct DatasetRegistry {
    records: Mutex<HashMap<String, DatasetRecord>>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DatasetRecord>> {
        // A panic while holding the lock leaves records intact
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update<F>(&self, id: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut DatasetRecord),
    {
        let mut records = self.lock();
        let record = records
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownDataset(id.to_string()))?;
        f(record);
        record.updated_at = Utc::now();
        Ok(())
    }

    /// Add a new record in the `analyzing` state
    pub fn register(&self, id: &str, file_path: &Path) -> Result<(), RegistryError> {
        let mut records = self.lock();
        if records.contains_key(id) {
            return Err(RegistryError::AlreadyRegistered(id.to_string()));
        }
        let now = Utc::now();
        records.insert(
            id.to_string(),
            DatasetRecord {
                id: id.to_string(),
                file_path: file_path.to_path_buf(),
                analysis_status: AnalysisStatus::Analyzing,
                index_status: IndexStatus::Pending,
                error_message: None,
                index_error: None,
                outcome: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    /// Snapshot of a record
    pub fn get(&self, id: &str) -> Option<DatasetRecord> {
        self.lock().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn remove(&self, id: &str) -> Option<DatasetRecord> {
        self.lock().remove(id)
    }

    /// Start a new run. The previous run's result is dropped.
    pub fn mark_analyzing(&self, id: &str) -> Result<(), RegistryError> {
        self.update(id, |record| {
            record.analysis_status = AnalysisStatus::Analyzing;
            record.error_message = None;
            record.outcome = None;
        })
    }

    /// Store the outcome of a finished run
    pub fn record_outcome(&self, id: &str, outcome: AnalysisOutcome) -> Result<(), RegistryError> {
        self.update(id, |record| {
            record.analysis_status = match outcome {
                AnalysisOutcome::Completed(_) => AnalysisStatus::Completed,
                AnalysisOutcome::NeedsUserInput { .. } => AnalysisStatus::NeedsUserInput,
            };
            record.error_message = None;
            record.outcome = Some(outcome);
        })
    }

    /// Mark a run as failed. Any earlier result is discarded.
    pub fn mark_failed(&self, id: &str, message: impl Into<String>) -> Result<(), RegistryError> {
        let message = message.into();
        self.update(id, |record| {
            record.analysis_status = AnalysisStatus::Failed;
            record.error_message = Some(message);
            record.outcome = None;
        })
    }

    pub fn set_index_status(
        &self,
        id: &str,
        status: IndexStatus,
        error: Option<String>,
    ) -> Result<(), RegistryError> {
        self.update(id, |record| {
            record.index_status = status;
            record.index_error = error;
        })
    }

    /// Run an analysis for a registered dataset and record how it ended
    pub fn run_analysis(
        &self,
        id: &str,
        dataset: &Dataset,
        user_target: Option<&str>,
        config: &EngineConfig,
        trainer: &dyn ModelTrainer,
    ) -> Result<AnalysisStatus, RegistryError> {
        self.mark_analyzing(id)?;

        match analyze_dataset(dataset, user_target, config, trainer) {
            Ok(outcome) => self.record_outcome(id, outcome)?,
            Err(err) => {
                tracing::error!(dataset = id, error = %format!("{:#}", err), "Analysis failed");
                self.mark_failed(id, format!("{:#}", err))?;
            }
        }

        self.get(id)
            .map(|record| record.analysis_status)
            .ok_or_else(|| RegistryError::UnknownDataset(id.to_string()))
    }
}
