//! The validator aggregate: every field's state plus whole-record queries.

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::config::ValidatorConfig;
use crate::field::{FieldState, Kind};
use crate::message::{Lookup, MessageOptions, render};
use crate::outcome::{Failure, Outcome};
use crate::record::Record;
use crate::schema::Schema;

/// Which fields a validation request touches, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateRequest {
    field: Option<String>,
    delay: Option<Duration>,
    clear_when_validating: Option<bool>,
}

impl ValidateRequest {
    /// Validate every field.
    pub fn all() -> Self {
        Self::default()
    }

    /// Validate a single field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            field: Some(name.into()),
            ..Self::default()
        }
    }

    /// Wait `delay` before running the rule. Overrides the configured default.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Drop shown results while the job runs. Overrides the configured default.
    pub fn clear_when_validating(mut self, clear: bool) -> Self {
        self.clear_when_validating = Some(clear);
        self
    }
}

/// Field counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Fields with no result and no request.
    pub unvalidated: usize,
    /// Fields waiting for their first result.
    pub validating: usize,
    /// Fields showing a passed result.
    pub passed: usize,
    /// Fields showing a failed result.
    pub failed: usize,
}

impl Summary {
    /// Total number of fields.
    pub fn total(&self) -> usize {
        self.unvalidated + self.validating + self.passed + self.failed
    }
}

/// Immutable snapshot of a record's validation.
///
/// Every mutation returns a new snapshot and leaves the receiver untouched,
/// so callers can keep old snapshots around for comparison.
///
/// # Example
///
/// ```
/// use serde_json::{json, Map, Value};
/// use verdict::{Builder, Kind, Schema, Validator};
///
/// type Form = Map<String, Value>;
///
/// let schema = Schema::<Form>::new()
///     .keyed("accept", |b: Builder<Form, bool>| b.is(true));
/// let validator = Validator::new(schema);
///
/// let record = json!({"accept": false}).as_object().cloned().unwrap_or_default();
/// let checked = validator.validate(&record);
///
/// assert_eq!(validator.kind(), Kind::Unvalidated);
/// assert_eq!(checked.kind(), Kind::Validated);
/// assert!(checked.error("accept"));
/// ```
pub struct Validator<R> {
    fields: Arc<[String]>,
    states: Vec<FieldState<R>>,
    config: Arc<ValidatorConfig>,
}

impl<R: Record> Validator<R> {
    /// Creates a validator with every field unvalidated.
    pub fn new(schema: Schema<R>) -> Self {
        Self::with_config(schema, ValidatorConfig::default())
    }

    /// Creates a validator with a custom configuration.
    pub fn with_config(schema: Schema<R>, config: ValidatorConfig) -> Self {
        let (names, states): (Vec<_>, Vec<_>) = schema
            .into_fields()
            .into_iter()
            .map(|(name, rule)| (name, FieldState::new(rule)))
            .unzip();
        Self {
            fields: names.into(),
            states,
            config: Arc::new(config),
        }
    }

    /// The configuration shared by all fields.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    fn index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|name| name == field)
    }

    fn with_states(&self, states: Vec<FieldState<R>>) -> Self {
        Self {
            fields: Arc::clone(&self.fields),
            states,
            config: Arc::clone(&self.config),
        }
    }

    /// Validates every field against `record`.
    pub fn validate(&self, record: &R) -> Self {
        self.validate_with(record, ValidateRequest::all())
    }

    /// Validates one field against `record`; other fields are left untouched.
    pub fn validate_field(&self, record: &R, field: &str) -> Self {
        self.validate_with(record, ValidateRequest::field(field))
    }

    /// Validates according to `request`.
    ///
    /// Requests naming a field without a rule return an unchanged snapshot.
    pub fn validate_with(&self, record: &R, request: ValidateRequest) -> Self {
        let delay = request.delay.unwrap_or(self.config.default_delay);
        let clear = request
            .clear_when_validating
            .unwrap_or(self.config.clear_when_validating);

        self.update(request.field.as_deref(), |state| {
            state.validate(record, delay, clear, &self.config.fault_rule)
        })
    }

    /// Clears every field.
    pub fn clear(&self) -> Self {
        self.update(None, FieldState::clear)
    }

    /// Clears one field.
    pub fn clear_field(&self, field: &str) -> Self {
        self.update(Some(field), FieldState::clear)
    }

    fn update(&self, field: Option<&str>, f: impl Fn(&FieldState<R>) -> FieldState<R>) -> Self {
        match field {
            None => self.with_states(self.states.iter().map(f).collect()),
            Some(name) => match self.index(name) {
                Some(index) => {
                    let mut states = self.states.clone();
                    states[index] = f(&self.states[index]);
                    self.with_states(states)
                }
                None => {
                    debug!("No rule for field '{}'; request ignored", name);
                    self.clone()
                }
            },
        }
    }

    /// The state of one field.
    pub fn state(&self, field: &str) -> Option<&FieldState<R>> {
        self.index(field).map(|index| &self.states[index])
    }

    pub(crate) fn state_at(&self, index: usize) -> Option<&FieldState<R>> {
        self.states.get(index)
    }

    /// Replaces the state at `index`, for the driver.
    pub(crate) fn replace(&mut self, index: usize, state: FieldState<R>) {
        if let Some(slot) = self.states.get_mut(index) {
            *slot = state;
        }
    }

    /// Fields and their states, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldState<R>)> {
        self.field_names().zip(self.states.iter())
    }

    /// Field names in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if the schema had no fields.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// `true` unless the field is validated and passed.
    ///
    /// Unvalidated and validating fields read as erroring. Fields without a
    /// rule are never in error.
    pub fn error(&self, field: &str) -> bool {
        self.state(field).is_some_and(|state| !state.passed())
    }

    /// `true` if any field reports [`error`](Self::error).
    pub fn any_error(&self) -> bool {
        self.states.iter().any(|state| !state.passed())
    }

    /// `true` only if the field is validated and passed.
    pub fn passed(&self, field: &str) -> bool {
        self.state(field).is_some_and(FieldState::passed)
    }

    /// The field's shown result.
    pub fn outcome(&self, field: &str) -> Option<&Outcome> {
        self.state(field).and_then(FieldState::outcome)
    }

    /// The field's shown failure.
    pub fn failure(&self, field: &str) -> Option<&Failure> {
        self.outcome(field).and_then(Outcome::failure)
    }

    /// Overall status: validating if any field is, else unvalidated if any
    /// field is not validated, else validated.
    pub fn kind(&self) -> Kind {
        let kinds = || self.states.iter().map(FieldState::kind);
        if kinds().any(|kind| kind == Kind::Validating) {
            Kind::Validating
        } else if kinds().any(|kind| kind != Kind::Validated) {
            Kind::Unvalidated
        } else {
            Kind::Validated
        }
    }

    /// Per-status field counts, for callers that need more than [`kind`](Self::kind).
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for state in &self.states {
            match state.outcome() {
                Some(Outcome::Passed) => summary.passed += 1,
                Some(Outcome::Failed(_)) => summary.failed += 1,
                None if state.kind() == Kind::Validating => summary.validating += 1,
                None => summary.unvalidated += 1,
            }
        }
        summary
    }

    /// Check if any field has a job queued or in flight.
    pub fn is_pending(&self) -> bool {
        self.states.iter().any(FieldState::is_pending)
    }

    /// Renders the field's failure through `lookup`.
    ///
    /// Returns `None` unless the field is validated and failed.
    pub fn message(&self, field: &str, lookup: &impl Lookup, options: MessageOptions) -> Option<String> {
        self.failure(field)
            .map(|failure| render(failure, field, lookup, options))
    }
}

impl<R> Clone for Validator<R> {
    fn clone(&self) -> Self {
        Self {
            fields: Arc::clone(&self.fields),
            states: self.states.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R: Record> PartialEq for Validator<R> {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && self.states == other.states && self.config == other.config
    }
}

impl<R> std::fmt::Debug for Validator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().zip(self.states.iter().map(FieldState::status)))
            .finish()
    }
}
