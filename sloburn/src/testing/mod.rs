//! Testing utilities for sloburn pipelines.
//!
//! This module provides:
//! - Mock report builders with scripted per-step outcomes
//! - Mock exporters (static, failing, recording)
//! - Record fixture helpers

mod mocks;

pub use mocks::{
    as_record, BuildCall, FailingExporter, RecordingExporter, ScriptedReport,
    StaticExporter, StaticReportBuilder,
};
