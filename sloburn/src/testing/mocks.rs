//! Mock report builders and exporters for testing.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::{SinkConfig, SloConfig};
use crate::export::{Exporter, SinkResponse};
use crate::policy::PolicyStep;
use crate::report::{BuildContext, Record, ReportBuilder, SloReport};

/// Converts a `json!` object literal into a record mapping.
///
/// Panics if `value` is not a JSON object; test helper only.
#[must_use]
pub fn as_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// One scripted per-step outcome for [`StaticReportBuilder`].
#[derive(Debug, Clone)]
pub enum ScriptedReport {
    /// A valid report carrying this record.
    Valid(Record),
    /// An invalid report.
    Invalid,
    /// A construction failure with this message.
    Fail(String),
}

/// Inputs observed during one build call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCall {
    /// The reporting instant the builder saw.
    pub timestamp: i64,
    /// Whether the run was in delete mode.
    pub delete: bool,
    /// Whether a backend client was supplied.
    pub had_client: bool,
}

/// A report builder that replays a scripted sequence of outcomes, one per
/// build call, and records the inputs it observed.
///
/// An exhausted script yields invalid reports.
pub struct StaticReportBuilder {
    script: Mutex<VecDeque<ScriptedReport>>,
    always_valid: bool,
    calls: Arc<Mutex<Vec<BuildCall>>>,
}

impl StaticReportBuilder {
    /// Creates a builder replaying `script` in order.
    #[must_use]
    pub fn script(script: Vec<ScriptedReport>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            always_valid: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a builder that yields a valid report for every step,
    /// echoing the step's fields and the reporting instant.
    #[must_use]
    pub fn always_valid() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            always_valid: true,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded build calls.
    ///
    /// Grab this before boxing the builder into a pipeline.
    #[must_use]
    pub fn calls(&self) -> Arc<Mutex<Vec<BuildCall>>> {
        Arc::clone(&self.calls)
    }

    /// Number of build calls observed so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<C: ?Sized> ReportBuilder<C> for StaticReportBuilder {
    fn build(
        &self,
        _config: &SloConfig,
        step: &PolicyStep,
        ctx: &BuildContext<'_, C>,
    ) -> anyhow::Result<SloReport> {
        self.calls.lock().push(BuildCall {
            timestamp: ctx.timestamp,
            delete: ctx.delete,
            had_client: ctx.client.is_some(),
        });

        if self.always_valid {
            let mut record = step.fields().clone();
            record.insert("timestamp".to_string(), Value::from(ctx.timestamp));
            return Ok(SloReport::valid(record));
        }

        match self.script.lock().pop_front() {
            Some(ScriptedReport::Valid(record)) => Ok(SloReport::valid(record)),
            Some(ScriptedReport::Fail(message)) => Err(anyhow::anyhow!(message)),
            Some(ScriptedReport::Invalid) | None => Ok(SloReport::invalid()),
        }
    }
}

/// An exporter returning a fixed, configurable response.
#[derive(Debug, Clone)]
pub struct StaticExporter {
    name: String,
    response: SinkResponse,
}

impl StaticExporter {
    /// Creates an exporter returning a single-mapping response built from
    /// the given fields.
    #[must_use]
    pub fn single(name: impl Into<String>, fields: &[(&str, Value)]) -> Self {
        let mut record = Record::new();
        for (key, value) in fields {
            record.insert((*key).to_string(), value.clone());
        }
        Self {
            name: name.into(),
            response: SinkResponse::Single(record),
        }
    }

    /// Creates an exporter returning a batch response.
    #[must_use]
    pub fn batch(name: impl Into<String>, elements: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            response: SinkResponse::Batch(elements),
        }
    }
}

impl Exporter for StaticExporter {
    fn name(&self) -> &str {
        &self.name
    }

    fn export(&self, _record: &Record, _config: &SinkConfig) -> anyhow::Result<SinkResponse> {
        Ok(self.response.clone())
    }
}

/// An exporter that always fails with a fixed message.
#[derive(Debug, Clone)]
pub struct FailingExporter {
    name: String,
    message: String,
}

impl FailingExporter {
    /// Creates a failing exporter.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl Exporter for FailingExporter {
    fn name(&self) -> &str {
        &self.name
    }

    fn export(&self, _record: &Record, _config: &SinkConfig) -> anyhow::Result<SinkResponse> {
        Err(anyhow::anyhow!(self.message.clone()))
    }
}

/// An exporter that records every record it receives.
///
/// Clones share state, so a registry factory can hand out fresh instances
/// while the test keeps one handle to observe deliveries.
#[derive(Debug, Clone, Default)]
pub struct RecordingExporter {
    records: Arc<Mutex<Vec<Record>>>,
}

impl RecordingExporter {
    /// Registry class name used by convention in tests.
    pub const CLASS: &'static str = "Recording";

    /// Creates a recording exporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The records delivered so far, in order.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Number of deliveries observed.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.records.lock().len()
    }
}

impl Exporter for RecordingExporter {
    fn name(&self) -> &str {
        Self::CLASS
    }

    fn export(&self, record: &Record, _config: &SinkConfig) -> anyhow::Result<SinkResponse> {
        self.records.lock().push(record.clone());
        let mut response = Record::new();
        response.insert("delivered".to_string(), Value::Bool(true));
        Ok(SinkResponse::Single(response))
    }
}
