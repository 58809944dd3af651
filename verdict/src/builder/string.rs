// Built-in rules for String values

use regex::Regex;

use super::{Builder, given};
use crate::data;
use crate::outcome::{Failure, Outcome};
use crate::record::Record;
use crate::rule::SyncRule;

/// Shared shape of the format checks: empty input passes.
fn format_rule<R: Record>(
    name: &'static str,
    accepts: impl Fn(&str) -> bool + Send + Sync + 'static,
) -> SyncRule<R, String> {
    SyncRule::new(move |value: &String, _| {
        Outcome::check(value.is_empty() || accepts(value), || {
            Failure::new(name, data! { "given" => value })
        })
    })
}

/// Shared shape of the length checks: `{expected, given, length}`.
fn length_rule<R: Record>(
    name: &'static str,
    expected: usize,
    accepts: impl Fn(usize) -> bool + Send + Sync + 'static,
) -> SyncRule<R, String> {
    SyncRule::new(move |value: &String, _| {
        let length = value.chars().count();
        Outcome::check(accepts(length), || {
            Failure::new(
                name,
                data! { "expected" => expected, "given" => value, "length" => length },
            )
        })
    })
}

impl<R: Record> Builder<R, String> {
    /// Require the field to be non-empty (ignoring surrounding whitespace).
    pub fn is_required(self) -> SyncRule<R, String> {
        SyncRule::new(|value: &String, _| {
            Outcome::check(!value.trim().is_empty(), || {
                Failure::new("is_required", data! { "given" => value })
            })
        })
    }

    /// Require at least `min` characters.
    pub fn has_min_length(self, min: usize) -> SyncRule<R, String> {
        length_rule("has_min_length", min, move |len| len >= min)
    }

    /// Require at most `max` characters.
    pub fn has_max_length(self, max: usize) -> SyncRule<R, String> {
        length_rule("has_max_length", max, move |len| len <= max)
    }

    /// Require exactly `len` characters.
    pub fn has_length(self, len: usize) -> SyncRule<R, String> {
        length_rule("has_length", len, move |actual| actual == len)
    }

    /// Require letters and digits only.
    pub fn is_alphanumeric(self) -> SyncRule<R, String> {
        format_rule("is_alphanumeric", |v| v.chars().all(char::is_alphanumeric))
    }

    /// Require letters only.
    pub fn is_alpha(self) -> SyncRule<R, String> {
        format_rule("is_alpha", |v| v.chars().all(char::is_alphabetic))
    }

    /// Require ASCII digits only.
    pub fn is_numeric(self) -> SyncRule<R, String> {
        format_rule("is_numeric", |v| v.chars().all(|c| c.is_ascii_digit()))
    }

    /// Require a valid email address.
    pub fn is_email(self) -> SyncRule<R, String> {
        format_rule("is_email", email_address::EmailAddress::is_valid)
    }

    /// Require an absolute URL.
    pub fn is_url(self) -> SyncRule<R, String> {
        format_rule("is_url", |v| url::Url::parse(v).is_ok())
    }

    /// Require the value to match a regex pattern.
    pub fn matches(self, pattern: Regex) -> SyncRule<R, String> {
        SyncRule::new(move |value: &String, _| {
            Outcome::check(value.is_empty() || pattern.is_match(value), || {
                Failure::new(
                    "matches",
                    data! { "pattern" => pattern.as_str(), "given" => value },
                )
            })
        })
    }

    /// Require the value to contain a substring.
    pub fn contains(self, needle: impl Into<String>) -> SyncRule<R, String> {
        let needle = needle.into();
        SyncRule::new(move |value: &String, _| {
            Outcome::check(value.contains(needle.as_str()), || {
                Failure::new("contains", data! { "expected" => needle, "given" => given(value) })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn b() -> Builder<(), String> {
        Builder::new()
    }

    fn run(rule: &SyncRule<(), String>, value: &str) -> Outcome {
        rule.run(&value.to_string(), &())
    }

    #[test]
    fn test_required_ignores_whitespace() {
        let rule = b().is_required();

        assert!(run(&rule, "x").is_passed());
        assert_eq!(run(&rule, "   ").rule(), Some("is_required"));
        assert_eq!(run(&rule, "").rule(), Some("is_required"));
    }

    #[test]
    fn test_min_length_data() {
        let outcome = run(&b().has_min_length(3), "ab");
        let failure = outcome.failure().unwrap();

        assert_eq!(failure.rule(), "has_min_length");
        assert_eq!(failure.get("expected"), Some(&json!(3)));
        assert_eq!(failure.get("given"), Some(&json!("ab")));
        assert_eq!(failure.get("length"), Some(&json!(2)));
    }

    #[test]
    fn test_length_counts_chars() {
        assert!(run(&b().has_max_length(2), "éé").is_passed());
        assert!(run(&b().has_length(3), "日本語").is_passed());
        assert_eq!(run(&b().has_length(3), "日本").rule(), Some("has_length"));
    }

    #[test]
    fn test_min_length_then_alphanumeric() {
        let rule = b().has_min_length(2).and(b().is_alphanumeric());

        let outcome = run(&rule, "a1!");
        let failure = outcome.failure().unwrap();

        assert_eq!(failure.rule(), "is_alphanumeric");
        assert_eq!(failure.get("given"), Some(&json!("a1!")));
        assert!(run(&rule, "a1").is_passed());
    }

    #[test]
    fn test_format_rules_accept_empty() {
        for rule in [
            b().is_alphanumeric(),
            b().is_alpha(),
            b().is_numeric(),
            b().is_email(),
            b().is_url(),
        ] {
            assert!(run(&rule, "").is_passed());
        }
    }

    #[test]
    fn test_email_and_url() {
        assert!(run(&b().is_email(), "user@example.com").is_passed());
        assert_eq!(run(&b().is_email(), "user@").rule(), Some("is_email"));
        assert!(run(&b().is_url(), "https://example.com/a").is_passed());
        assert_eq!(run(&b().is_url(), "example").rule(), Some("is_url"));
    }

    #[test]
    fn test_matches_carries_pattern() {
        let rule = b().matches(Regex::new(r"^\d{4}$").unwrap());

        assert!(run(&rule, "2024").is_passed());
        let outcome = run(&rule, "20x4");
        assert_eq!(outcome.failure().unwrap().get("pattern"), Some(&json!(r"^\d{4}$")));
    }

    #[test]
    fn test_contains() {
        assert!(run(&b().contains("@"), "a@b").is_passed());
        assert_eq!(run(&b().contains("@"), "ab").rule(), Some("contains"));
    }

    #[test]
    fn test_numeric_and_alpha() {
        assert!(run(&b().is_numeric(), "0123").is_passed());
        assert_eq!(run(&b().is_numeric(), "1.5").rule(), Some("is_numeric"));
        assert!(run(&b().is_alpha(), "abc").is_passed());
        assert_eq!(run(&b().is_alpha(), "ab1").rule(), Some("is_alpha"));
    }
}
