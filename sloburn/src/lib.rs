//! # Sloburn
//!
//! A pipeline for computing Service Level Objective (SLO) compliance
//! reports and fanning them out to downstream sinks ("exporters").
//!
//! Sloburn runs a two-stage pipeline:
//!
//! - **Report computation**: iterate the ordered steps of an error-budget
//!   policy and build one compliance report per step, sharing a single
//!   reporting instant and an optional pre-initialized backend client
//!   across the run
//! - **Export fan-out**: forward each serialized report to every configured
//!   sink, resolving sink implementations by name from an explicit
//!   registry, with per-sink failure isolation so one sink's outage never
//!   prevents delivery to the others
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sloburn::prelude::*;
//!
//! let registry = Arc::new(SinkRegistry::with_defaults());
//! let pipeline = ComputePipeline::new(Box::new(MyReportBuilder), registry);
//!
//! let reports = pipeline.compute(
//!     &config,
//!     &policy,
//!     RunOptions::new().with_export(),
//! )?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod compute;
pub mod config;
pub mod errors;
pub mod export;
pub mod policy;
pub mod report;
pub mod testing;
pub mod utils;


/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::compute::{ComputePipeline, ResultSequence, RunOptions};
    pub use crate::config::{SinkConfig, SinkConfigs, SloConfig};
    pub use crate::errors::{ExportError, SloburnError};
    pub use crate::export::{
        Exporter, ExportDispatcher, ExportOutcome, FileExporter, SinkFailure,
        SinkRegistry, SinkResponse,
    };
    pub use crate::policy::{ErrorBudgetPolicy, PolicyStep};
    pub use crate::report::{BuildContext, Record, ReportBuilder, SloReport};
    pub use crate::utils::unix_now;
}
