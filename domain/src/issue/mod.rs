//! Issue domain module
//!
//! An [`Issue`] is one defect reported by one external analysis tool. It
//! carries its producing tool's name, so provenance survives aggregation.

pub mod entities;
pub mod value_objects;

pub use entities::{Issue, IssueKey};
pub use value_objects::{Category, Severity};
