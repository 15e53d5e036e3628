//! The pipeline runner: one report per policy step, optional export.
//!
//! The runner iterates policy steps strictly in order on the calling
//! thread. Invalid reports are filtered, not escalated; report
//! construction errors are the one case that aborts a run.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SloConfig;
use crate::errors::SloburnError;
use crate::export::{ExportDispatcher, SinkRegistry};
use crate::policy::ErrorBudgetPolicy;
use crate::report::{BuildContext, Record, ReportBuilder};
use crate::utils::unix_now;

/// Ordered sequence of serialized reports returned by a run.
///
/// One record per valid, non-deleted policy step, in step order. When
/// export was requested, each record carries its per-sink outcome sequence
/// under the `exporters` key.
pub type ResultSequence = Vec<Record>;

/// Per-run options for [`ComputePipeline::compute`].
pub struct RunOptions<'a, C: ?Sized> {
    /// Reporting instant as UNIX epoch seconds; defaults to now.
    ///
    /// Resolved once so that every report in the run shares one reporting
    /// instant.
    pub timestamp: Option<i64>,

    /// Pre-initialized metrics backend client, reused read-only across
    /// steps to amortize connection/auth cost.
    pub client: Option<&'a C>,

    /// Whether to forward serialized reports to the configured sinks.
    pub do_export: bool,

    /// Delete/cleanup mode.
    ///
    /// Reports are still built, so the builder can perform cleanup side
    /// effects of its own, but nothing is exported or returned.
    pub delete: bool,
}

impl<C: ?Sized> Default for RunOptions<'_, C> {
    fn default() -> Self {
        Self {
            timestamp: None,
            client: None,
            do_export: false,
            delete: false,
        }
    }
}

impl<'a, C: ?Sized> RunOptions<'a, C> {
    /// Creates the default options: timestamp now, no client, no export,
    /// no delete.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reporting instant.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Supplies an existing backend client.
    #[must_use]
    pub const fn with_client(mut self, client: &'a C) -> Self {
        self.client = Some(client);
        self
    }

    /// Enables export to the configured sinks.
    #[must_use]
    pub const fn with_export(mut self) -> Self {
        self.do_export = true;
        self
    }

    /// Enables delete/cleanup mode.
    #[must_use]
    pub const fn with_delete(mut self) -> Self {
        self.delete = true;
        self
    }
}

/// Runs the two-stage compute/export pipeline.
///
/// `C` is the opaque metrics-backend client type handed through to the
/// report builder.
pub struct ComputePipeline<C: ?Sized> {
    builder: Box<dyn ReportBuilder<C>>,
    dispatcher: ExportDispatcher,
}

impl<C: ?Sized> ComputePipeline<C> {
    /// Creates a pipeline from a report builder and a sink registry.
    #[must_use]
    pub fn new(builder: Box<dyn ReportBuilder<C>>, registry: Arc<SinkRegistry>) -> Self {
        Self {
            builder,
            dispatcher: ExportDispatcher::new(registry),
        }
    }

    /// The dispatcher backing this pipeline's exports.
    #[must_use]
    pub const fn dispatcher(&self) -> &ExportDispatcher {
        &self.dispatcher
    }

    /// Computes one report per policy step and returns the serialized
    /// records in step order.
    ///
    /// Invalid reports are skipped silently. In delete mode every report
    /// is skipped without exporting, so the result is always empty. When
    /// `opts.do_export` is set and the configuration declares sinks, each
    /// record carries its per-sink outcome sequence under the `exporters`
    /// key; sink failures are captured there, never escalated. Report
    /// construction errors propagate and abort the remaining steps.
    pub fn compute(
        &self,
        config: &SloConfig,
        policy: &ErrorBudgetPolicy,
        opts: RunOptions<'_, C>,
    ) -> Result<ResultSequence, SloburnError> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let timestamp = opts.timestamp.unwrap_or_else(unix_now);
        let ctx = BuildContext {
            timestamp,
            client: opts.client,
            delete: opts.delete,
        };

        let mut reports = ResultSequence::new();
        for (index, step) in policy.iter().enumerate() {
            let label = step.label(index);
            let report = self
                .builder
                .build(config, step, &ctx)
                .map_err(|source| SloburnError::Report {
                    step: label.clone(),
                    source,
                })?;

            if !report.is_valid() {
                debug!(run_id = %run_id, step = %label, "report not valid, skipping");
                continue;
            }
            if opts.delete {
                continue;
            }
            let Some(mut record) = report.into_record() else {
                continue;
            };
            info!(run_id = %run_id, step = %label, record = ?record, "computed report");

            if opts.do_export {
                if let Some(sinks) = config.exporters.as_ref() {
                    let outcomes = self.dispatcher.export(&record, sinks, false)?;
                    record.insert("exporters".to_string(), serde_json::to_value(outcomes)?);
                }
            }
            reports.push(record);
        }

        debug!(run_id = %run_id, reports = ?reports, "run reports");
        debug!(
            run_id = %run_id,
            duration_secs = start.elapsed().as_secs_f64(),
            "run finished successfully"
        );
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{as_record, ScriptedReport, StaticReportBuilder};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn policy_of(len: usize) -> ErrorBudgetPolicy {
        (0..len)
            .map(|i| {
                serde_json::from_value(json!({
                    "error_budget_policy_step_name": format!("window {i}"),
                    "measurement_window_seconds": 3600 * (i + 1),
                }))
                .unwrap()
            })
            .collect()
    }

    fn pipeline(builder: StaticReportBuilder) -> ComputePipeline<()> {
        ComputePipeline::new(Box::new(builder), Arc::new(SinkRegistry::new()))
    }

    #[test]
    fn test_all_valid_steps_produce_one_record_each_in_order() {
        let builder = StaticReportBuilder::script(vec![
            ScriptedReport::Valid(as_record(json!({"step": 0}))),
            ScriptedReport::Valid(as_record(json!({"step": 1}))),
            ScriptedReport::Valid(as_record(json!({"step": 2}))),
        ]);
        let reports = pipeline(builder)
            .compute(&SloConfig::new(), &policy_of(3), RunOptions::new())
            .unwrap();

        assert_eq!(reports.len(), 3);
        for (i, record) in reports.iter().enumerate() {
            assert_eq!(record.get("step"), Some(&json!(i)));
        }
    }

    #[test]
    fn test_invalid_reports_are_skipped_not_replaced() {
        let builder = StaticReportBuilder::script(vec![
            ScriptedReport::Valid(as_record(json!({"step": 0}))),
            ScriptedReport::Invalid,
            ScriptedReport::Valid(as_record(json!({"step": 2}))),
        ]);
        let reports = pipeline(builder)
            .compute(&SloConfig::new(), &policy_of(3), RunOptions::new())
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].get("step"), Some(&json!(0)));
        assert_eq!(reports[1].get("step"), Some(&json!(2)));
    }

    #[test]
    fn test_delete_mode_returns_empty_but_still_builds_every_step() {
        let builder = StaticReportBuilder::always_valid();
        let calls = builder.calls();
        let reports = pipeline(builder)
            .compute(
                &SloConfig::new(),
                &policy_of(4),
                RunOptions::new().with_delete(),
            )
            .unwrap();

        assert!(reports.is_empty());
        let recorded = calls.lock().clone();
        assert_eq!(recorded.len(), 4);
        assert!(recorded.iter().all(|call| call.delete));
    }

    #[test]
    fn test_construction_error_aborts_the_run() {
        let builder = StaticReportBuilder::script(vec![
            ScriptedReport::Valid(as_record(json!({"step": 0}))),
            ScriptedReport::Fail("backend unreachable".to_string()),
            ScriptedReport::Valid(as_record(json!({"step": 2}))),
        ]);
        let err = pipeline(builder)
            .compute(&SloConfig::new(), &policy_of(3), RunOptions::new())
            .unwrap_err();

        let SloburnError::Report { step, source } = err else {
            panic!("expected a report construction error");
        };
        assert_eq!(step, "step 'window 1'");
        assert!(source.to_string().contains("backend unreachable"));
    }

    #[test]
    fn test_timestamp_is_shared_across_all_steps() {
        let builder = StaticReportBuilder::always_valid();
        let calls = builder.calls();
        pipeline(builder)
            .compute(
                &SloConfig::new(),
                &policy_of(3),
                RunOptions::new().with_timestamp(1_700_000_000),
            )
            .unwrap();

        let recorded = calls.lock().clone();
        assert_eq!(recorded.len(), 3);
        assert!(recorded.iter().all(|call| call.timestamp == 1_700_000_000));
    }

    #[test]
    fn test_default_timestamp_is_current_epoch_seconds() {
        let builder = StaticReportBuilder::always_valid();
        let calls = builder.calls();
        let before = unix_now();
        pipeline(builder)
            .compute(&SloConfig::new(), &policy_of(1), RunOptions::new())
            .unwrap();
        let after = unix_now();

        let recorded = calls.lock().clone();
        assert!(recorded[0].timestamp >= before && recorded[0].timestamp <= after);
    }

    #[test]
    fn test_client_handle_reaches_the_builder() {
        let builder = StaticReportBuilder::always_valid();
        let calls = builder.calls();
        let client = ();
        let pipeline: ComputePipeline<()> =
            ComputePipeline::new(Box::new(builder), Arc::new(SinkRegistry::new()));
        pipeline
            .compute(
                &SloConfig::new(),
                &policy_of(2),
                RunOptions::new().with_client(&client),
            )
            .unwrap();

        let recorded = calls.lock().clone();
        assert!(recorded.iter().all(|call| call.had_client));
    }

    #[test]
    fn test_no_export_without_do_export_flag() {
        // Config declares sinks, but the flag stays off.
        let config = SloConfig::new().with_exporters(vec![crate::config::SinkConfig::new(
            "Unregistered",
        )]);
        let builder = StaticReportBuilder::always_valid();
        let reports = pipeline(builder)
            .compute(&config, &policy_of(1), RunOptions::new())
            .unwrap();

        assert!(!reports[0].contains_key("exporters"));
    }

    #[test]
    fn test_no_export_without_configured_sinks() {
        let builder = StaticReportBuilder::always_valid();
        let reports = pipeline(builder)
            .compute(
                &SloConfig::new(),
                &policy_of(1),
                RunOptions::new().with_export(),
            )
            .unwrap();

        assert!(!reports[0].contains_key("exporters"));
    }
}
