//! Report module - summarizing analysis results

pub mod analysis_report;
pub mod summary;

pub use analysis_report::*;
pub use summary::*;
