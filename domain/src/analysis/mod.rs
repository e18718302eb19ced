//! Analysis run data model
//!
//! ```text
//! AnalysisRequest ──▶ adapter run ──▶ AnalysisResult
//!                         │
//!                         └─▶ Progress (async runs only)
//! ```

pub mod progress;
pub mod request;
pub mod result;

pub use progress::Progress;
pub use request::AnalysisRequest;
pub use result::{AnalysisResult, ResultDocument, UNKNOWN_ERROR};
