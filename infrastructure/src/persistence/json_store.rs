//! JSON implementation of the [`ResultStore`] port
//!
//! Documents are pretty printed. Parent directories are created on save.
//! Timestamps are written as RFC 3339 with millisecond precision.

use crosslint_application::{ResultStore, StoreError};
use crosslint_domain::AnalysisResult;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Stores results as JSON documents on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResultStore;

impl JsonResultStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a file holding either one document or an array of documents.
    pub fn load_any(&self, path: &Path) -> Result<Vec<AnalysisResult>, StoreError> {
        let content = read(path)?;
        let value: serde_json::Value = parse(path, &content)?;
        if value.is_array() {
            from_value(path, value)
        } else {
            from_value(path, value).map(|result| vec![result])
        }
    }

    fn write<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }

        let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Format {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, json).map_err(|source| io_error(path, source))?;
        debug!(path = %path.display(), "Saved results");
        Ok(())
    }
}

impl ResultStore for JsonResultStore {
    fn save_result(&self, path: &Path, result: &AnalysisResult) -> Result<(), StoreError> {
        self.write(path, result)
    }

    fn load_result(&self, path: &Path) -> Result<AnalysisResult, StoreError> {
        parse(path, &read(path)?)
    }

    fn save_results(&self, path: &Path, results: &[AnalysisResult]) -> Result<(), StoreError> {
        self.write(path, results)
    }

    fn load_results(&self, path: &Path) -> Result<Vec<AnalysisResult>, StoreError> {
        parse(path, &read(path)?)
    }
}

fn read(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|source| io_error(path, source))
}

fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, StoreError> {
    serde_json::from_str(content).map_err(|e| StoreError::Format {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn from_value<T: DeserializeOwned>(path: &Path, value: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Format {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}
