//! Validator configuration

use std::time::Duration;

/// Rule name used for outcomes produced by faulted predicates.
pub const DEFAULT_FAULT_RULE: &str = "fault";

/// What the driver does with a running job once a newer request is queued behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CancelPolicy {
    /// Let the running job finish and discard its result.
    #[default]
    Discard,
    /// Abort the running job as soon as it is superseded.
    Abort,
}

/// Configuration shared by every field of a [`Validator`](crate::Validator).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use verdict::{CancelPolicy, ValidatorConfig};
///
/// let config = ValidatorConfig::default()
///     .with_default_delay(Duration::from_millis(300))
///     .with_cancel_policy(CancelPolicy::Abort);
/// assert_eq!(config.fault_rule, "fault");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Rule name given to failures produced by predicate faults.
    ///
    /// Default: `"fault"`
    pub fault_rule: String,

    /// Delay applied to requests that do not specify one.
    ///
    /// Default: zero (synchronous rules run immediately)
    pub default_delay: Duration,

    /// Whether an async request drops a field's previous result while it runs.
    ///
    /// Default: `false`
    pub clear_when_validating: bool,

    /// How superseded running jobs are handled.
    ///
    /// Default: [`CancelPolicy::Discard`]
    pub cancel_policy: CancelPolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            fault_rule: DEFAULT_FAULT_RULE.to_string(),
            default_delay: Duration::ZERO,
            clear_when_validating: false,
            cancel_policy: CancelPolicy::Discard,
        }
    }
}

impl ValidatorConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fault rule name.
    pub fn with_fault_rule(mut self, rule: impl Into<String>) -> Self {
        self.fault_rule = rule.into();
        self
    }

    /// Sets the default request delay.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Sets whether async requests clear a field's previous result.
    pub fn with_clear_when_validating(mut self, clear: bool) -> Self {
        self.clear_when_validating = clear;
        self
    }

    /// Sets the cancellation policy for superseded jobs.
    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }
}
