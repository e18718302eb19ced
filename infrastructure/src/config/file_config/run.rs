//! Run defaults from TOML (`[run]` section)
//!
//! ```toml
//! [run]
//! tools = ["cppcheck", "clang-tidy"]
//! include_paths = ["include"]
//! definitions = ["NDEBUG"]
//! output_dir = "build/crosslint"
//! min_severity = "warning"
//! ```

use crosslint_domain::{AnalysisRequest, Severity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw run configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunConfig {
    /// Tools used when the command line names none
    pub tools: Vec<String>,
    pub include_paths: Vec<PathBuf>,
    pub definitions: Vec<String>,
    /// Directory receiving per-tool output artifacts
    pub output_dir: Option<PathBuf>,
    /// Drop issues below this severity from reports
    pub min_severity: Option<Severity>,
    /// Run tools concurrently
    pub parallel: bool,
}

impl Default for FileRunConfig {
    fn default() -> Self {
        Self {
            tools: vec!["cppcheck".to_string()],
            include_paths: Vec::new(),
            definitions: Vec::new(),
            output_dir: None,
            min_severity: None,
            parallel: false,
        }
    }
}

impl FileRunConfig {
    /// Request for `source` carrying the configured include paths and
    /// definitions. The output artifact is `<output_dir>/report.txt`; the
    /// orchestrator suffixes it per tool.
    pub fn request(&self, source: impl AsRef<Path>) -> AnalysisRequest {
        let mut request = AnalysisRequest::new(source.as_ref());
        if let Some(dir) = &self.output_dir {
            request = request.with_output(dir.join("report.txt"));
        }
        for include in &self.include_paths {
            request = request.with_include(include);
        }
        for definition in &self.definitions {
            request = request.with_definition(definition);
        }
        request
    }
}
