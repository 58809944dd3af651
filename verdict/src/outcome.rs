//! The value vocabulary produced by every rule.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured context attached to a failure, used to render a message.
pub type Data = BTreeMap<String, Value>;

/// Key under which a failure's rule name is always present in its data.
pub const NAME_KEY: &str = "name";

/// A failed check: the rule that rejected the value plus its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    rule: String,
    data: Data,
}

impl Failure {
    /// Creates a failure for `rule`, stamping the rule name into `data`.
    pub fn new(rule: impl Into<String>, mut data: Data) -> Self {
        let rule = rule.into();
        data.insert(NAME_KEY.to_string(), Value::String(rule.clone()));
        Self { rule, data }
    }

    /// Returns the name of the rule that failed.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Returns the structured failure context.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Returns one entry of the failure context.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Adds an entry to the failure context.
    ///
    /// The rule name entry cannot be overwritten.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != NAME_KEY {
            self.data.insert(key, value.into());
        }
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed {}", self.rule)
    }
}

/// Result of running a rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// The value satisfied the rule.
    #[default]
    Passed,
    /// The value was rejected.
    Failed(Failure),
}

impl Outcome {
    /// Creates a failure for `rule` with an empty context.
    pub fn fail(rule: impl Into<String>) -> Self {
        Self::Failed(Failure::new(rule, Data::new()))
    }

    /// Creates a failure for `rule` with the given context.
    pub fn failed(rule: impl Into<String>, data: Data) -> Self {
        Self::Failed(Failure::new(rule, data))
    }

    /// Returns `Passed` when `ok` holds, otherwise the failure built by `on_fail`.
    pub fn check(ok: bool, on_fail: impl FnOnce() -> Failure) -> Self {
        if ok { Self::Passed } else { Self::Failed(on_fail()) }
    }

    /// Check if the rule passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if the rule failed.
    pub fn is_failed(&self) -> bool {
        !self.is_passed()
    }

    /// Get the failure, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Passed => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// Get the failing rule name, if any.
    pub fn rule(&self) -> Option<&str> {
        self.failure().map(Failure::rule)
    }
}

impl From<Failure> for Outcome {
    fn from(failure: Failure) -> Self {
        Self::Failed(failure)
    }
}

/// Builds a [`Data`] bag from `key => value` pairs.
///
/// Values go through `serde_json::to_value`; anything that fails to serialize reads as `null`.
#[macro_export]
macro_rules! data {
    () => {
        $crate::Data::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut data = $crate::Data::new();
        $(data.insert(
            ::std::string::String::from($key),
            $crate::__private::to_value(&$value).unwrap_or($crate::__private::Value::Null),
        );)+
        data
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_carries_rule_name() {
        let outcome = Outcome::fail("is");
        let failure = outcome.failure().unwrap();

        assert_eq!(failure.rule(), "is");
        assert_eq!(failure.get(NAME_KEY), Some(&json!("is")));
    }

    #[test]
    fn test_with_cannot_overwrite_name() {
        let failure = Failure::new("has_min_length", data! { "expected" => 2 })
            .with("name", "other")
            .with("given", "a");

        assert_eq!(failure.get("name"), Some(&json!("has_min_length")));
        assert_eq!(failure.get("given"), Some(&json!("a")));
        assert_eq!(failure.get("expected"), Some(&json!(2)));
    }

    #[test]
    fn test_check() {
        assert!(Outcome::check(true, || Failure::new("x", Data::new())).is_passed());
        assert_eq!(
            Outcome::check(false, || Failure::new("x", Data::new())).rule(),
            Some("x")
        );
    }
}
