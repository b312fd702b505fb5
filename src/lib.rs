//! dataiq: Dataset Intelligence Library
//!
//! Profiles a tabular dataset, works out which column is the prediction
//! target and what kind of problem it poses, plans preprocessing, and picks
//! the best model from reported metrics.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
