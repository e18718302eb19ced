//! Output configuration from TOML (`[output]` section)

use crosslint_domain::{DEFAULT_TOP_FILES, OutputFormat};
use serde::{Deserialize, Serialize};

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Report format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Number of files listed in statistics
    pub top_files: usize,
    /// Show progress bars during async runs
    pub progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            top_files: DEFAULT_TOP_FILES,
            progress: true,
        }
    }
}
