//! Tool adapter port
//!
//! Defines the contract every external analyzer binding satisfies so the
//! orchestrator can drive cppcheck, clang-tidy or any other program without
//! knowing which one it is talking to.
//!
//! # Failure contract
//!
//! | Condition | Surfaced as |
//! |-----------|-------------|
//! | adapter has no configuration | `Err(AdapterError::ConfigurationMissing)` |
//! | wrong [`ToolConfig`] variant | `Err(AdapterError::InvalidConfigType)` |
//! | program missing, non-zero exit, unparsable output | `Ok(result)` with `success == false` |
//!
//! Runtime failures are data. Only programmer errors come back as `Err`
//! from [`ToolAdapter::execute`] and [`ToolAdapter::execute_async`].
//!
//! # Cancellation
//!
//! [`ToolAdapter::cancel_analysis`] only delivers a stop request. An already
//! spawned external process may keep running until the adapter's own loop
//! observes the request.

use async_trait::async_trait;
use crosslint_domain::{
    AnalysisRequest, AnalysisResult, DomainError, Progress, ToolConfig, ToolKind,
    ValidationResult,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Receives progress snapshots during [`ToolAdapter::execute_async`].
///
/// May be called from a worker thread.
pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Receives raw output lines from the external program.
pub type OutputCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Errors raised by adapters
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Adapter was used before any configuration was set
    #[error("Adapter '{0}' has no configuration")]
    ConfigurationMissing(String),

    /// Configuration variant does not belong to this adapter
    #[error("Invalid configuration type for '{adapter}': expected {expected}, got {actual}")]
    InvalidConfigType {
        adapter: String,
        expected: ToolKind,
        actual: ToolKind,
    },

    /// External program cannot be located or invoked
    #[error("Tool unavailable: {0}")]
    ToolUnavailable(String),

    /// External program failed or produced unusable output
    #[error("Execution failed: {0}")]
    ExecutionFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AdapterError {
    /// Programmer errors are the only kinds the orchestrator lets escape a
    /// single run.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            AdapterError::ConfigurationMissing(_) | AdapterError::InvalidConfigType { .. }
        )
    }
}

/// Binding between the orchestrator and one external analysis program.
///
/// Implementations own their configuration and their running flag; callers
/// only go through this trait. An adapter runs at most one analysis at a
/// time.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    // ==================== Metadata ====================

    /// Unique name the adapter is registered under
    fn name(&self) -> &str;

    /// Version string of the external program.
    ///
    /// May invoke the program once and cache the answer.
    fn version(&self) -> String;

    fn description(&self) -> String;

    /// File extensions (without dot) the program understands
    fn supported_extensions(&self) -> Vec<String>;

    /// Output artifact formats the program can write
    fn supported_output_formats(&self) -> Vec<String>;

    fn help_text(&self) -> String {
        format!(
            "{} ({})\nExtensions: {}",
            self.name(),
            self.description(),
            self.supported_extensions().join(", ")
        )
    }

    // ==================== Configuration ====================

    /// Replace the configuration wholesale.
    ///
    /// Fails with [`AdapterError::InvalidConfigType`] when `config` is a
    /// variant for another adapter kind.
    fn set_configuration(&self, config: ToolConfig) -> Result<(), AdapterError>;

    fn configuration(&self) -> Option<ToolConfig>;

    fn default_config(&self) -> ToolConfig;

    /// Validate the current configuration without changing it.
    fn validate_configuration(&self) -> ValidationResult {
        match self.configuration() {
            Some(config) => config.validate(),
            None => {
                let mut result = ValidationResult::new();
                result.add_error(format!("'{}' has no configuration", self.name()));
                result
            }
        }
    }

    // ==================== Availability ====================

    /// Whether the external program can be located and invoked.
    fn is_available(&self) -> bool;

    /// Resolved path of the external program, empty when unresolved
    fn executable_path(&self) -> PathBuf;

    fn system_requirements(&self) -> String;

    // ==================== Execution ====================

    /// Run to completion on the calling thread.
    fn execute(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AdapterError>;

    /// Run without blocking the caller.
    ///
    /// `progress` receives snapshots with non-decreasing processed-file
    /// counts. The default runs [`ToolAdapter::execute`] inline and reports
    /// one start and one completion snapshot.
    async fn execute_async(
        &self,
        request: &AnalysisRequest,
        progress: Option<ProgressCallback>,
        _output: Option<OutputCallback>,
    ) -> Result<AnalysisResult, AdapterError> {
        if let Some(cb) = &progress {
            cb(&Progress::new(1).with_status(format!("Running {}", self.name())));
        }
        let result = self.execute(request)?;
        if let Some(cb) = &progress {
            let processed = result.files_analyzed.max(1);
            cb(&Progress::new(processed)
                .with_processed(processed, "")
                .with_status("Finished"));
        }
        Ok(result)
    }

    /// Request a cooperative stop. Returns true if the request was delivered.
    fn cancel_analysis(&self) -> bool;

    fn is_analysis_running(&self) -> bool;

    // ==================== Offline ====================

    /// Re-derive a result from an output artifact written by an earlier run.
    fn parse_results_file(&self, path: &Path) -> Result<AnalysisResult, AdapterError>;

    /// Arguments (program first) this adapter would run for `request`
    /// under `config`. Pure: nothing is spawned.
    fn build_command_line(
        &self,
        config: &ToolConfig,
        request: &AnalysisRequest,
    ) -> Result<Vec<String>, AdapterError>;
}

/// Shared check for [`ToolAdapter::set_configuration`] implementations.
pub fn ensure_config_kind(
    adapter: &str,
    expected: ToolKind,
    config: &ToolConfig,
) -> Result<(), AdapterError> {
    if config.kind() == expected {
        Ok(())
    } else {
        Err(AdapterError::InvalidConfigType {
            adapter: adapter.to_string(),
            expected,
            actual: config.kind(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosslint_domain::{ClangTidyConfig, CppcheckConfig};

    #[test]
    fn test_ensure_config_kind() {
        let config = ToolConfig::Cppcheck(CppcheckConfig::default());
        assert!(ensure_config_kind("cppcheck", ToolKind::Cppcheck, &config).is_ok());

        let err = ensure_config_kind("cppcheck", ToolKind::Cppcheck, &ToolConfig::ClangTidy(
            ClangTidyConfig::default(),
        ))
        .unwrap_err();
        assert!(err.is_programmer_error());
        assert_eq!(
            err.to_string(),
            "Invalid configuration type for 'cppcheck': expected cppcheck, got clang_tidy"
        );
    }

    #[test]
    fn test_runtime_errors_are_not_programmer_errors() {
        assert!(!AdapterError::ToolUnavailable("x".into()).is_programmer_error());
        assert!(!AdapterError::ExecutionFailure("x".into()).is_programmer_error());
        assert!(AdapterError::ConfigurationMissing("x".into()).is_programmer_error());
    }
}
