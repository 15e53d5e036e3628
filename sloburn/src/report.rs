//! The report builder contract and the report it produces.
//!
//! The statistical/query logic that turns raw metrics into a compliance
//! report lives behind [`ReportBuilder`]; the pipeline treats it as opaque
//! beyond validity and a serialize-to-record operation.

use crate::config::SloConfig;
use crate::policy::PolicyStep;

/// A transport-neutral mapping record.
///
/// Serialized reports, sink responses, and sink options all share this
/// shape.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Per-run inputs shared by every step's report construction.
pub struct BuildContext<'a, C: ?Sized> {
    /// Reporting instant as UNIX epoch seconds.
    ///
    /// Resolved once per run so that every report in the run shares one
    /// reporting instant.
    pub timestamp: i64,

    /// Optional pre-initialized metrics backend client.
    ///
    /// Reused read-only across steps to amortize connection/auth cost;
    /// the pipeline never mutates it.
    pub client: Option<&'a C>,

    /// Whether this run is a delete/cleanup pass.
    ///
    /// Builders may use this to perform cleanup side effects of their own;
    /// the pipeline discards every report built in delete mode.
    pub delete: bool,
}

/// A computed SLO report for one policy step.
///
/// Carries a validity flag and, when valid, the serialized record. Only
/// valid, non-deleted reports progress through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SloReport {
    valid: bool,
    record: Option<Record>,
}

impl SloReport {
    /// Creates a valid report carrying its serialized record.
    #[must_use]
    pub fn valid(record: Record) -> Self {
        Self {
            valid: true,
            record: Some(record),
        }
    }

    /// Creates an invalid report.
    ///
    /// Invalidity is a normal outcome, not an error: the step may not
    /// apply to this SLO type, or the data it needs may be unavailable.
    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            valid: false,
            record: None,
        }
    }

    /// Whether the report is usable.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Consumes the report, yielding its record when valid.
    #[must_use]
    pub fn into_record(self) -> Option<Record> {
        self.record
    }
}

/// Builds one compliance report per policy step.
///
/// `C` is the opaque metrics-backend client type the builder understands.
///
/// Implementations should return [`SloReport::invalid`] for steps that
/// simply do not apply; returning an error is reserved for configuration
/// or backend failures and aborts the whole run.
pub trait ReportBuilder<C: ?Sized>: Send + Sync {
    /// Builds the report for `step`.
    fn build(
        &self,
        config: &SloConfig,
        step: &PolicyStep,
        ctx: &BuildContext<'_, C>,
    ) -> anyhow::Result<SloReport>;
}
