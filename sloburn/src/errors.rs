//! Error types for the sloburn pipeline.
//!
//! The taxonomy distinguishes failures that abort a run (report
//! construction) from failures that are data (per-sink export failures,
//! captured in the outcome sequence unless fail-fast mode is requested).

use thiserror::Error;

/// The main error type for sloburn operations.
#[derive(Debug, Error)]
pub enum SloburnError {
    /// Report construction failed for a policy step.
    ///
    /// Construction errors are configuration or backend errors, not
    /// expected per-step outcomes; a single failing step aborts the
    /// remaining steps of the run.
    #[error("report construction failed for {step}: {source}")]
    Report {
        /// Label of the policy step whose report could not be built.
        step: String,
        /// The underlying builder error.
        #[source]
        source: anyhow::Error,
    },

    /// An export error escalated out of the dispatcher.
    #[error("{0}")]
    Export(#[from] ExportError),

    /// Record serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while dispatching a record to sinks.
///
/// Both variants are caught per sink by the dispatcher and converted into
/// failure outcomes; they only propagate in fail-fast mode.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No exporter is registered under the requested class name.
    #[error("unknown exporter class: {0}")]
    UnknownExporter(String),

    /// An exporter failed while handling a record.
    #[error("exporter '{exporter}' failed: {source}")]
    Sink {
        /// Class name of the failing exporter.
        exporter: String,
        /// The underlying exporter error.
        #[source]
        source: anyhow::Error,
    },
}
