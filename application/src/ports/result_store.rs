//! Result store port
//!
//! Persists results as durable documents (see
//! [`ResultDocument`](crosslint_domain::ResultDocument)). A result list is
//! stored as an array of such documents.

use crosslint_domain::AnalysisResult;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by result stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed result document {path}: {message}")]
    Format { path: PathBuf, message: String },
}

/// Port for saving and loading results
///
/// Implementations live in the infrastructure layer.
pub trait ResultStore: Send + Sync {
    fn save_result(&self, path: &Path, result: &AnalysisResult) -> Result<(), StoreError>;

    fn load_result(&self, path: &Path) -> Result<AnalysisResult, StoreError>;

    fn save_results(&self, path: &Path, results: &[AnalysisResult]) -> Result<(), StoreError>;

    fn load_results(&self, path: &Path) -> Result<Vec<AnalysisResult>, StoreError>;
}
