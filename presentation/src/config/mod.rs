//! Presentation-level configuration
//!
//! Settings that decide how results are rendered. File values come in
//! through the binary; command-line flags override them.

use crosslint_domain::{DEFAULT_TOP_FILES, OutputFormat, Severity};

/// Rendering options for reports
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Files listed in the statistics block
    pub top_files: usize,
    /// Issues below this severity are not shown
    pub min_severity: Option<Severity>,
    /// Show progress bars during concurrent runs
    pub show_progress: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Full,
            color: true,
            top_files: DEFAULT_TOP_FILES,
            min_severity: None,
            show_progress: true,
        }
    }
}

impl ReportConfig {
    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        self
    }

    pub fn with_min_severity(mut self, severity: Option<Severity>) -> Self {
        if severity.is_some() {
            self.min_severity = severity;
        }
        self
    }

    pub fn without_color(mut self, disabled: bool) -> Self {
        self.color &= !disabled;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_progress &= !quiet;
        self
    }

    /// Apply the color setting to all terminal output of this process.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }

    /// JSON output never draws progress bars on top of the document.
    pub fn progress_enabled(&self) -> bool {
        self.show_progress && self.format != OutputFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let config = ReportConfig::default()
            .with_format(Some(OutputFormat::Summary))
            .with_format(None)
            .with_min_severity(Some(Severity::Error))
            .with_min_severity(None)
            .without_color(true)
            .quiet(false);

        assert_eq!(config.format, OutputFormat::Summary);
        assert_eq!(config.min_severity, Some(Severity::Error));
        assert!(!config.color);
        assert!(config.progress_enabled());
    }

    #[test]
    fn test_json_disables_progress() {
        let config = ReportConfig::default().with_format(Some(OutputFormat::Json));
        assert!(!config.progress_enabled());
    }
}
