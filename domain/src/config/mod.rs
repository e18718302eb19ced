//! Configuration value objects for the domain layer
//!
//! - [`ToolConfig`]: closed set of per-adapter settings
//! - [`ValidationResult`]: outcome of validating a [`ToolConfig`]
//! - [`OutputFormat`]: how reports are rendered

mod output_format;
pub mod tool_config;
pub mod validation;

pub use output_format::OutputFormat;
pub use tool_config::{
    ClangTidyConfig, CommandToolConfig, CppcheckConfig, OUTPUT_PLACEHOLDER, SOURCE_PLACEHOLDER,
    ToolConfig, ToolKind,
};
pub use validation::ValidationResult;
