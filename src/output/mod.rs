//! Output artifact generation
//!
//! Consumers of the finished run result: the Markdown report renderer and
//! the JSON data writer. Both receive the result read-only after the
//! orchestrator has handed it off.

mod json_writer;
mod report;

pub use json_writer::write_json_data;
pub use report::{render_report, write_report};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
