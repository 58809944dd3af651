//! Schema: one rule per validated field.

use std::sync::Arc;

use log::warn;
use serde::de::DeserializeOwned;

use crate::builder::Builder;
use crate::outcome::Outcome;
use crate::record::Record;
use crate::rule::{BoxFuture, Checked, Rule};

type SyncFieldCheck<R> = dyn Fn(&R) -> Outcome + Send + Sync;
type AsyncFieldCheck<R> = dyn Fn(&R) -> BoxFuture<'static, Checked> + Send + Sync;

/// A field's rule with the value projection folded in.
///
/// Synchronous rules keep both forms: the direct check for zero-delay runs
/// and a lifted check for delayed ones.
pub struct FieldRule<R> {
    sync: Option<Arc<SyncFieldCheck<R>>>,
    lifted: Arc<AsyncFieldCheck<R>>,
}

impl<R: Record> FieldRule<R> {
    fn new<P, F>(project: F, rule: Rule<R, P>) -> Self
    where
        P: Send + Sync + 'static,
        F: Fn(&R) -> P + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        match rule {
            Rule::Sync(rule) => {
                let lifted = rule.to_async();
                let project_lifted = Arc::clone(&project);
                Self {
                    sync: Some(Arc::new(move |root: &R| rule.run(&project(root), root))),
                    lifted: Arc::new(move |root: &R| lifted.run(project_lifted(root), root.clone())),
                }
            }
            Rule::Async(rule) => Self {
                sync: None,
                lifted: Arc::new(move |root: &R| rule.run(project(root), root.clone())),
            },
        }
    }

    /// Check if the rule can only run through a job.
    pub fn is_async(&self) -> bool {
        self.sync.is_none()
    }

    /// Runs a synchronous rule in place; `None` for asynchronous rules.
    pub(crate) fn run_sync(&self, root: &R) -> Option<Outcome> {
        self.sync.as_ref().map(|check| check(root))
    }

    /// Starts the rule as a future over an owned snapshot of the record.
    pub(crate) fn start(&self, root: &R) -> BoxFuture<'static, Checked> {
        (self.lifted)(root)
    }

    /// Returns `true` if both handles point at the same rule.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lifted, &other.lifted)
    }
}

impl<R> Clone for FieldRule<R> {
    fn clone(&self) -> Self {
        Self {
            sync: self.sync.clone(),
            lifted: Arc::clone(&self.lifted),
        }
    }
}

impl<R> std::fmt::Debug for FieldRule<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("is_async", &self.sync.is_none())
            .finish_non_exhaustive()
    }
}

/// Maps field names to rules.
///
/// Only fields named here are ever validated; the rest of the record is
/// visible to cross-field rules but never checked itself.
///
/// # Example
///
/// ```
/// use verdict::{Record, Schema};
/// use serde::Serialize;
///
/// #[derive(Clone, Serialize, Record)]
/// struct Signup {
///     name: String,
///     accept: bool,
///     nickname: Option<String>,
/// }
///
/// let schema = Schema::<Signup>::new()
///     .field("name", |s| s.name.clone(), |b| b.has_min_length(2).and(b.is_alphanumeric()))
///     .field("accept", |s| s.accept, |b| b.is(true))
///     .optional("nickname", |s| s.nickname.clone(), |b| b.has_max_length(12));
///
/// assert_eq!(schema.len(), 3);
/// ```
pub struct Schema<R> {
    fields: Vec<(String, FieldRule<R>)>,
}

impl<R: Record> Schema<R> {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field whose value is projected out of the record by `project`.
    ///
    /// Redefining a field replaces its rule in place.
    pub fn field<P, F, B, T>(mut self, name: impl Into<String>, project: F, build: B) -> Self
    where
        P: Send + Sync + 'static,
        F: Fn(&R) -> P + Send + Sync + 'static,
        B: FnOnce(Builder<R, P>) -> T,
        T: Into<Rule<R, P>>,
    {
        let name = name.into();
        let rule = FieldRule::new(project, build(Builder::new()).into());

        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => {
                warn!("Schema field '{}' defined twice; keeping the last rule", name);
                slot.1 = rule;
            }
            None => self.fields.push((name, rule)),
        }
        self
    }

    /// Adds a field whose projection may be absent; `None` validates as `P::default()`.
    pub fn optional<P, F, B, T>(self, name: impl Into<String>, project: F, build: B) -> Self
    where
        P: Default + Send + Sync + 'static,
        F: Fn(&R) -> Option<P> + Send + Sync + 'static,
        B: FnOnce(Builder<R, P>) -> T,
        T: Into<Rule<R, P>>,
    {
        self.field(name, move |root| project(root).unwrap_or_default(), build)
    }

    /// Adds a field read through [`Record::get`] under the same name.
    ///
    /// Absent, `null` and mistyped values all validate as `P::default()`.
    pub fn keyed<P, B, T>(self, name: impl Into<String>, build: B) -> Self
    where
        P: DeserializeOwned + Default + Send + Sync + 'static,
        B: FnOnce(Builder<R, P>) -> T,
        T: Into<Rule<R, P>>,
    {
        let name = name.into();
        let key = name.clone();
        self.field(
            name,
            move |root: &R| {
                root.get(&key)
                    .and_then(|value| serde_json::from_value(value).ok())
                    .unwrap_or_default()
            },
            build,
        )
    }

    /// Number of fields with a rule.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field has a rule.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn into_fields(self) -> Vec<(String, FieldRule<R>)> {
        self.fields
    }
}

impl<R: Record> Default for Schema<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|(name, _)| name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::*;

    type Dynamic = Map<String, Value>;

    fn record(value: Value) -> Dynamic {
        match value {
            Value::Object(map) => map,
            _ => Dynamic::new(),
        }
    }

    #[test]
    fn test_keyed_projects_missing_as_default() {
        let schema = Schema::<Dynamic>::new()
            .keyed("name", |b: Builder<Dynamic, String>| b.is_required())
            .keyed("accept", |b: Builder<Dynamic, bool>| b.is(true));
        let fields = schema.into_fields();

        let empty = Dynamic::new();
        assert_eq!(fields[0].1.run_sync(&empty).unwrap().rule(), Some("is_required"));
        assert_eq!(fields[1].1.run_sync(&empty).unwrap().rule(), Some("is"));

        let filled = record(json!({"name": "Ada", "accept": true}));
        assert!(fields[0].1.run_sync(&filled).unwrap().is_passed());
        assert!(fields[1].1.run_sync(&filled).unwrap().is_passed());
    }

    #[test]
    fn test_keyed_mistyped_reads_default() {
        let schema = Schema::<Dynamic>::new().keyed("age", |b: Builder<Dynamic, f64>| b.is_min(0.0));
        let fields = schema.into_fields();

        let outcome = fields[0].1.run_sync(&record(json!({"age": "old"}))).unwrap();
        assert!(outcome.is_passed());
    }

    #[test]
    fn test_redefinition_keeps_position() {
        let schema = Schema::<Dynamic>::new()
            .keyed("a", |b: Builder<Dynamic, String>| b.is_required())
            .keyed("b", |b: Builder<Dynamic, String>| b.is_required())
            .keyed("a", |b: Builder<Dynamic, String>| b.has_min_length(3));

        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["a", "b"]);
        let fields = schema.into_fields();
        let outcome = fields[0].1.run_sync(&record(json!({"a": "xy"}))).unwrap();
        assert_eq!(outcome.rule(), Some("has_min_length"));
    }

    #[test]
    fn test_async_rule_has_no_sync_path() {
        let schema = Schema::<Dynamic>::new().keyed("email", |b: Builder<Dynamic, String>| {
            b.from_promise(|_, _| async { Outcome::Passed })
        });
        let fields = schema.into_fields();

        assert!(fields[0].1.is_async());
        assert!(fields[0].1.run_sync(&Dynamic::new()).is_none());
    }

    #[tokio::test]
    async fn test_sync_rule_lifts_for_jobs() {
        let schema = Schema::<Dynamic>::new().keyed("name", |b: Builder<Dynamic, String>| b.is_required());
        let fields = schema.into_fields();

        let outcome = fields[0].1.start(&Dynamic::new()).await.unwrap();
        assert_eq!(outcome.rule(), Some("is_required"));
    }
}
