//! Export dispatch: fan a serialized report out to configured sinks.
//!
//! Sinks are independent, externally-owned integrations; one sink's outage
//! must not prevent delivery to the others. The dispatcher therefore
//! isolates failures per sink by default: a captured failure value takes
//! the failing sink's position in the outcome sequence, and processing
//! continues. Fail-fast semantics are opt-in via `raise_on_error`.

mod file;
mod registry;

pub use file::FileExporter;
pub use registry::{ExporterFactory, SinkRegistry};

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::{SinkConfig, SinkConfigs};
use crate::errors::ExportError;
use crate::report::Record;

/// A downstream destination receiving computed reports.
///
/// Implementations may fail with arbitrary errors; the dispatcher treats
/// them uniformly regardless of cause. Export is synchronous: invocation
/// duration is bounded only by the implementation itself.
pub trait Exporter: Send + Sync {
    /// The exporter's canonical name (its registry class).
    fn name(&self) -> &str;

    /// Forwards one record, reading sink-specific options from `config`.
    fn export(&self, record: &Record, config: &SinkConfig) -> anyhow::Result<SinkResponse>;
}

// `Result::unwrap_err` in tests needs the Ok type (`Box<dyn Exporter>`)
// to be `Debug`.
#[cfg(test)]
impl std::fmt::Debug for dyn Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter").field("name", &self.name()).finish()
    }
}

/// A sink's successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SinkResponse {
    /// A single response mapping.
    Single(Record),
    /// Multiple sub-results, e.g. one per destination metric.
    ///
    /// The dispatcher annotates every element with the originating sink's
    /// class name under the `exporter` key.
    Batch(Vec<Record>),
}

/// A captured per-sink failure value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkFailure {
    /// Class name of the failing sink.
    pub exporter: String,
    /// The failure's full message chain.
    pub error: String,
}

/// Outcome of dispatching one record to one sink.
///
/// Successes and failures share positions in the outcome sequence, so the
/// caller can tell them apart positionally; failures are data here, not
/// control flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportOutcome {
    /// The sink's response value.
    Success(SinkResponse),
    /// The captured failure value.
    Failure(SinkFailure),
}

impl ExportOutcome {
    /// Whether the sink succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether the sink failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The response, when the sink succeeded.
    #[must_use]
    pub const fn response(&self) -> Option<&SinkResponse> {
        match self {
            Self::Success(response) => Some(response),
            Self::Failure(_) => None,
        }
    }

    /// The captured failure, when the sink failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&SinkFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

/// Fans one serialized report out to each configured sink, in order.
#[derive(Debug, Clone)]
pub struct ExportDispatcher {
    registry: Arc<SinkRegistry>,
}

impl ExportDispatcher {
    /// Creates a dispatcher over a shared sink registry.
    #[must_use]
    pub fn new(registry: Arc<SinkRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher resolves sinks against.
    #[must_use]
    pub fn registry(&self) -> &Arc<SinkRegistry> {
        &self.registry
    }

    /// Dispatches `record` to every sink in `sinks`.
    ///
    /// Produces exactly one outcome per sink configuration, preserving
    /// their order. A failure while resolving, instantiating, or invoking
    /// a sink is captured in that sink's position and processing continues
    /// with the next sink. If `raise_on_error` is true, the failure
    /// propagates immediately instead and the remaining sinks are skipped.
    pub fn export(
        &self,
        record: &Record,
        sinks: &SinkConfigs,
        raise_on_error: bool,
    ) -> Result<Vec<ExportOutcome>, ExportError> {
        debug!(sinks = ?sinks, "dispatching record");
        debug!(record = ?record, "record to export");

        let mut outcomes = Vec::with_capacity(sinks.len());
        for config in sinks.as_slice() {
            match self.dispatch_one(record, config) {
                Ok(response) => outcomes.push(ExportOutcome::Success(response)),
                Err(err) => {
                    error!(exporter = %config.class, error = ?err, "exporter failed");
                    error!("{} exporter failed. Passing.", config.class);
                    if raise_on_error {
                        return Err(err);
                    }
                    outcomes.push(ExportOutcome::Failure(SinkFailure {
                        exporter: config.class.clone(),
                        error: failure_message(&err),
                    }));
                }
            }
        }
        Ok(outcomes)
    }

    fn dispatch_one(
        &self,
        record: &Record,
        config: &SinkConfig,
    ) -> Result<SinkResponse, ExportError> {
        info!(exporter = %config.class, "exporting results");
        debug!(config = ?config, "exporter config");

        let exporter = self.registry.resolve(&config.class)?;
        let mut response = exporter
            .export(record, config)
            .map_err(|source| ExportError::Sink {
                exporter: config.class.clone(),
                source,
            })?;

        if let SinkResponse::Batch(elements) = &mut response {
            for element in elements.iter_mut() {
                element.insert(
                    "exporter".to_string(),
                    Value::String(config.class.clone()),
                );
            }
        }
        Ok(response)
    }
}

/// Flattens an export error into the message stored on a failure outcome.
///
/// Sink errors keep their full source chain so the original error identity
/// survives the capture.
fn failure_message(err: &ExportError) -> String {
    match err {
        ExportError::Sink { source, .. } => format!("{source:#}"),
        other => other.to_string(),
    }
}
