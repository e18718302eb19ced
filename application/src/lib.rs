//! Application layer for crosslint
//!
//! This crate contains the tool adapter port, the process-wide tool
//! registry, and the orchestrator use case. It depends only on the domain
//! layer; concrete adapters and stores live in the infrastructure layer.

pub mod ports;
pub mod registry;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use ports::{
    result_store::{ResultStore, StoreError},
    tool_adapter::{
        AdapterError, OutputCallback, ProgressCallback, ToolAdapter, ensure_config_kind,
    },
};
pub use registry::{AdapterFactory, ToolRegistry};
pub use use_cases::orchestrator::{
    AnalysisOrchestrator, BatchHandle, BatchProgressCallback, CompletionCallback,
    OrchestratorError,
};
