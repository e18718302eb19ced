//! Use cases (application services)

pub mod orchestrator;
