//! Built-in JSON-lines file exporter.

use std::fs::OpenOptions;
use std::io::Write;

use anyhow::Context;
use serde_json::{json, Value};

use super::{Exporter, SinkResponse};
use crate::config::SinkConfig;
use crate::report::Record;

/// Appends each record as one JSON line to a local file.
///
/// The reference implementation of the [`Exporter`] contract, registered
/// by default under class `File`.
///
/// Options:
/// - `path` (required): destination file, created on first write.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExporter;

impl FileExporter {
    /// Registry class name for this exporter.
    pub const CLASS: &'static str = "File";
}

impl Exporter for FileExporter {
    fn name(&self) -> &str {
        Self::CLASS
    }

    fn export(&self, record: &Record, config: &SinkConfig) -> anyhow::Result<SinkResponse> {
        let path = config
            .option("path")
            .and_then(Value::as_str)
            .context("File exporter requires a 'path' option")?;

        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening '{path}' for append"))?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;

        let mut response = Record::new();
        response.insert("path".to_string(), json!(path));
        response.insert("bytes_written".to_string(), json!(line.len() + 1));
        Ok(SinkResponse::Single(response))
    }
}
