//! Infrastructure layer for crosslint
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: process-backed analyzers, the JSON result
//! store and configuration file loading.

pub mod adapters;
pub mod config;
pub mod persistence;

// Re-export commonly used types
pub use adapters::{
    CLANG_TIDY, CPPCHECK, ClangTidyAdapter, CommandAdapter, CppcheckAdapter, ExternalToolAdapter,
    ToolProfile, adapter_for, register_builtin_adapters, register_command_tools,
};
pub use config::{ConfigLoader, FileConfig, FileOutputConfig, FileRunConfig, FileToolsConfig};
pub use persistence::JsonResultStore;
