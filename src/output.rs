//! Output formatting and persistence for classified samples and reports.
//!
//! Supports JSON rendering and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::sample::Sample;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Renders any report view as pretty-printed JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes a report view as pretty-printed JSON to `path`, replacing it.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    std::fs::write(path, to_json(value)?)?;
    debug!(path, "Wrote JSON report");
    Ok(())
}

/// Appends graded samples as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_samples(path: &str, samples: &[Sample]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = samples.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for sample in samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;

    Ok(())
}
