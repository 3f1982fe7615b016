//! JSON data file writer
//!
//! Serializes the full run result, outcome by outcome, preserving every
//! field of the metadata record. Failures appear as explicit tagged error
//! objects, never as missing entries.

use crate::crawler::RunResult;
use crate::output::OutputResult;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes the run result to a JSON file
///
/// # Arguments
///
/// * `result` - The finished run result
/// * `path` - Destination file path
pub fn write_json_data(result: &RunResult, path: &Path) -> OutputResult<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, result)?;

    tracing::info!("Data file written: {}", path.display());
    Ok(())
}
