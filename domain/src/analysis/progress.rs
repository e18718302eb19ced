//! Progress snapshot emitted during asynchronous execution

use serde::{Deserialize, Serialize};

/// Transient snapshot of a running analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total_files: usize,
    pub processed_files: usize,
    pub current_file: String,
    pub status_message: String,
}

impl Progress {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            ..Default::default()
        }
    }

    pub fn with_processed(mut self, processed: usize, current_file: impl Into<String>) -> Self {
        self.processed_files = processed;
        self.current_file = current_file.into();
        self
    }

    pub fn with_status(mut self, message: impl Into<String>) -> Self {
        self.status_message = message.into();
        self
    }

    /// Completion percentage in `0..=100`. Unknown totals report 0.
    pub fn percent(&self) -> u8 {
        if self.total_files == 0 {
            return 0;
        }
        let done = self.processed_files.min(self.total_files);
        ((done * 100) / self.total_files) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.total_files > 0 && self.processed_files >= self.total_files
    }
}
