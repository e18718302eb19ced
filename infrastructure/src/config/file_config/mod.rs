//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod output;
mod run;
mod tools;

pub use output::FileOutputConfig;
pub use run::FileRunConfig;
pub use tools::FileToolsConfig;

use crosslint_domain::ValidationResult;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Defaults for `crosslint run`
    pub run: FileRunConfig,
    /// Per-tool settings
    pub tools: FileToolsConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate every section, returning `(section, result)` pairs for the
    /// sections that produced errors or warnings.
    pub fn validate(&self) -> Vec<(String, ValidationResult)> {
        let mut reports = Vec::new();

        let mut run = ValidationResult::new();
        if self.run.tools.is_empty() {
            run.add_warning("run.tools is empty; tools must be named on the command line");
        }
        if self.run.tools.iter().any(|t| t.trim().is_empty()) {
            run.add_error("run.tools must not contain empty names");
        }
        if self.output.top_files == 0 {
            run.add_warning("output.top_files = 0 hides the top files listing");
        }
        reports.push(("run".to_string(), run));

        for (name, config) in self.tools.tool_configs() {
            reports.push((format!("tools.{}", name), config.validate()));
        }

        reports
            .into_iter()
            .filter(|(_, result)| !result.errors().is_empty() || !result.warnings().is_empty())
            .collect()
    }

    /// Whether no section reports an error.
    pub fn is_valid(&self) -> bool {
        self.validate().iter().all(|(_, result)| result.is_valid())
    }
}
