//! Analysis request value object

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Input to one analysis run.
///
/// A request is not changed once a run starts. For multi-tool batches the
/// orchestrator derives one copy per tool with [`AnalysisRequest::for_tool`]
/// so that tools never write to the same output file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// File or directory to analyze
    pub source_path: PathBuf,
    /// Where the tool's raw output artifact is written (may be empty)
    #[serde(default)]
    pub output_path: PathBuf,
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Preprocessor definitions, `NAME` or `NAME=VALUE`
    #[serde(default)]
    pub definitions: Vec<String>,
    /// Tool-specific options, interpreted by the adapter only
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl AnalysisRequest {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Default::default()
        }
    }

    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_include(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definitions.push(definition.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Copy of this request whose output path is disambiguated for `tool_name`:
    /// `dir/report.xml` becomes `dir/report_cppcheck.xml`.
    ///
    /// An empty output path stays empty.
    pub fn for_tool(&self, tool_name: &str) -> AnalysisRequest {
        let mut copy = self.clone();
        copy.output_path = tool_output_path(&self.output_path, tool_name);
        copy
    }
}

fn tool_output_path(output: &Path, tool_name: &str) -> PathBuf {
    if output.as_os_str().is_empty() {
        return PathBuf::new();
    }

    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match output.extension() {
        Some(ext) => format!("{}_{}.{}", stem, tool_name, ext.to_string_lossy()),
        None => format!("{}_{}", stem, tool_name),
    };

    match output.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
