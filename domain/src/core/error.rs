//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These only arise when parsing values that come from outside the process
/// (persisted documents, configuration files, tool output).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid severity: {0}")]
    InvalidSeverity(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid tool kind: {0}")]
    InvalidToolKind(String),

    #[error("Invalid result document: {0}")]
    InvalidDocument(String),
}
