//! SLO and sink configuration types.
//!
//! Configurations are read-only inputs owned by the caller. Both the SLO
//! target description and sink-specific options are open mapping bags:
//! unknown keys are kept and forwarded verbatim to the collaborator that
//! understands them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::Record;

/// Configuration for the SLO a run computes reports for.
///
/// Beyond the optional sink entries, the shape of the target description is
/// owned by the report builder; this core only forwards it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SloConfig {
    /// Sinks to forward computed reports to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exporters: Option<SinkConfigs>,

    /// SLO target description, forwarded verbatim to the report builder.
    #[serde(flatten, default)]
    pub slo: Record,
}

impl SloConfig {
    /// Creates an empty configuration with no sinks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sink configurations.
    #[must_use]
    pub fn with_exporters(mut self, exporters: impl Into<SinkConfigs>) -> Self {
        self.exporters = Some(exporters.into());
        self
    }

    /// Adds an entry to the SLO target description.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.slo.insert(key.into(), value.into());
        self
    }

    /// Looks up a field of the target description.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.slo.get(key)
    }
}

/// Configuration for one sink.
///
/// A fixed `class` field names the sink implementation; every other key is
/// an open, sink-specific option passed through opaquely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SinkConfig {
    /// Sink implementation name, resolved against the registry.
    pub class: String,

    /// Sink-specific options, forwarded verbatim to the implementation.
    #[serde(flatten, default)]
    pub options: Record,
}

impl SinkConfig {
    /// Creates a sink configuration with no options.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            options: Record::new(),
        }
    }

    /// Adds a sink-specific option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Looks up a sink-specific option.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

/// One or many sink configurations.
///
/// A bare single mapping is accepted as shorthand for a one-element
/// sequence, for caller convenience.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SinkConfigs {
    /// A single sink configuration.
    One(SinkConfig),
    /// An ordered sequence of sink configurations.
    Many(Vec<SinkConfig>),
}

impl SinkConfigs {
    /// Returns the configurations as an ordered slice.
    #[must_use]
    pub fn as_slice(&self) -> &[SinkConfig] {
        match self {
            Self::One(config) => std::slice::from_ref(config),
            Self::Many(configs) => configs,
        }
    }

    /// Normalizes to an owned ordered sequence.
    #[must_use]
    pub fn into_vec(self) -> Vec<SinkConfig> {
        match self {
            Self::One(config) => vec![config],
            Self::Many(configs) => configs,
        }
    }

    /// Number of configured sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether no sinks are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<SinkConfig> for SinkConfigs {
    fn from(config: SinkConfig) -> Self {
        Self::One(config)
    }
}

impl From<Vec<SinkConfig>> for SinkConfigs {
    fn from(configs: Vec<SinkConfig>) -> Self {
        Self::Many(configs)
    }
}
