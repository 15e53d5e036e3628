//! Error-budget policy types.
//!
//! A policy is an ordered sequence of steps, each describing one evaluation
//! window/threshold used to compute compliance and burn rate. Steps are
//! opaque to the pipeline beyond being passed through to the report
//! builder, in order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::Record;

/// Field carrying a step's human-readable name, when present.
const STEP_NAME_KEY: &str = "error_budget_policy_step_name";

/// One ordered element of an error-budget policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PolicyStep(Record);

impl PolicyStep {
    /// Creates a step from its raw fields.
    #[must_use]
    pub const fn new(fields: Record) -> Self {
        Self(fields)
    }

    /// The step's raw fields.
    #[must_use]
    pub const fn fields(&self) -> &Record {
        &self.0
    }

    /// Looks up a step field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The step's human-readable name, when configured.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get(STEP_NAME_KEY).and_then(Value::as_str)
    }

    /// A label for logs and errors: the configured name, or the step's
    /// position in the policy.
    #[must_use]
    pub fn label(&self, index: usize) -> String {
        self.name()
            .map_or_else(|| format!("step #{index}"), |name| format!("step '{name}'"))
    }
}

/// Ordered, caller-owned sequence of policy steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ErrorBudgetPolicy(Vec<PolicyStep>);

impl ErrorBudgetPolicy {
    /// Creates a policy from its steps.
    #[must_use]
    pub const fn new(steps: Vec<PolicyStep>) -> Self {
        Self(steps)
    }

    /// The policy's steps, in order.
    #[must_use]
    pub fn steps(&self) -> &[PolicyStep] {
        &self.0
    }

    /// Iterates the steps in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PolicyStep> {
        self.0.iter()
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the policy has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ErrorBudgetPolicy {
    type Item = &'a PolicyStep;
    type IntoIter = std::slice::Iter<'a, PolicyStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<PolicyStep> for ErrorBudgetPolicy {
    fn from_iter<I: IntoIterator<Item = PolicyStep>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn step(value: serde_json::Value) -> PolicyStep {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_policy_parses_as_plain_sequence() {
        let policy: ErrorBudgetPolicy = serde_json::from_value(json!([
            {
                "error_budget_policy_step_name": "1 hour",
                "measurement_window_seconds": 3600,
                "alerting_burn_rate_threshold": 9,
            },
            {
                "error_budget_policy_step_name": "1 day",
                "measurement_window_seconds": 86400,
                "alerting_burn_rate_threshold": 3,
            },
        ]))
        .unwrap();

        assert_eq!(policy.len(), 2);
        assert_eq!(policy.steps()[0].name(), Some("1 hour"));
        assert_eq!(
            policy.steps()[1].get("measurement_window_seconds"),
            Some(&json!(86400))
        );
    }

    #[test]
    fn test_step_label_prefers_configured_name() {
        let named = step(json!({"error_budget_policy_step_name": "1 hour"}));
        assert_eq!(named.label(0), "step '1 hour'");

        let anonymous = step(json!({"measurement_window_seconds": 60}));
        assert_eq!(anonymous.label(3), "step #3");
    }

    #[test]
    fn test_policy_preserves_step_order() {
        let policy: ErrorBudgetPolicy = (0..5)
            .map(|i| step(json!({"position": i})))
            .collect();

        let positions: Vec<_> = policy
            .iter()
            .map(|s| s.get("position").cloned().unwrap())
            .collect();
        assert_eq!(positions, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);
    }
}
