//! Per-field validation lifecycle.
//!
//! ```text
//! Unvalidated ──validate──▶ Validating ──job settles──▶ Validated
//!      ▲                                                    │
//!      └──────────────────────── clear ─────────────────────┘
//! ```
//!
//! Zero-delay synchronous rules skip `Validating` and never create a job.
//! Every transition returns a new [`FieldState`]; previous values stay valid.

mod jobs;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use log::{debug, trace, warn};

pub use jobs::{JobFuture, JobId, Jobs, PendingJob, RunningJob};

use crate::data;
use crate::error::RuleError;
use crate::outcome::Outcome;
use crate::record::Record;
use crate::rule::Checked;
use crate::schema::FieldRule;

/// Coarse lifecycle state of a field, or of a whole validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Not checked since creation or the last clear.
    Unvalidated,
    /// A job was requested and no result is shown yet.
    Validating,
    /// A result is available.
    Validated,
}

impl Kind {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unvalidated => "unvalidated",
            Self::Validating => "validating",
            Self::Validated => "validated",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state with the result, when there is one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Status {
    /// Not checked since creation or the last clear.
    #[default]
    Unvalidated,
    /// A job was requested and no result is shown yet.
    Validating,
    /// The field's current result.
    Validated(Outcome),
}

impl Status {
    /// The status without its payload.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Unvalidated => Kind::Unvalidated,
            Self::Validating => Kind::Validating,
            Self::Validated(_) => Kind::Validated,
        }
    }
}

/// One field's rule, lifecycle status, and job slots.
pub struct FieldState<R> {
    rule: FieldRule<R>,
    status: Status,
    jobs: Jobs,
}

impl<R> FieldState<R> {
    /// The field's rule.
    pub fn rule(&self) -> &FieldRule<R> {
        &self.rule
    }

    /// Current status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Current status without its payload.
    pub fn kind(&self) -> Kind {
        self.status.kind()
    }

    /// Job slots.
    pub fn jobs(&self) -> &Jobs {
        &self.jobs
    }

    /// The shown result, if the field is validated.
    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.status {
            Status::Validated(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// `true` only when validated and passed. Unvalidated and validating
    /// fields are neither passed nor failed.
    pub fn passed(&self) -> bool {
        matches!(self.status, Status::Validated(Outcome::Passed))
    }

    /// Check if a job is queued or in flight.
    pub fn is_pending(&self) -> bool {
        !self.jobs.is_empty()
    }
}

impl<R: Record> FieldState<R> {
    pub(crate) fn new(rule: FieldRule<R>) -> Self {
        Self {
            rule,
            status: Status::Unvalidated,
            jobs: Jobs::default(),
        }
    }

    fn with(&self, status: Status, jobs: Jobs) -> Self {
        Self {
            rule: self.rule.clone(),
            status,
            jobs,
        }
    }

    /// Requests validation of `root`.
    ///
    /// With a zero `delay`, a synchronous rule runs right away. Anything else
    /// queues a job in `next`, replacing whatever was queued there. A
    /// validated field keeps showing its result while the job runs unless
    /// `clear_when_validating` is set. A synchronous rule that panics is
    /// reported as a failure of `fault_rule`, as the driver does for jobs.
    pub fn validate(&self, root: &R, delay: Duration, clear_when_validating: bool, fault_rule: &str) -> Self {
        if delay.is_zero()
            && let Some(outcome) = self.run_sync(root, fault_rule)
        {
            trace!("Synchronous validation: {:?}", outcome);
            return self.with(Status::Validated(outcome), self.superseded());
        }

        let rule = self.rule.clone();
        let root = root.clone();
        let job = PendingJob::check(delay, move || rule.start(&root));
        trace!("Queued {} (delay {:?})", job.id(), delay);

        let status = match &self.status {
            Status::Validated(outcome) if !clear_when_validating => Status::Validated(outcome.clone()),
            _ => Status::Validating,
        };
        let jobs = Jobs {
            current: self.jobs.current.clone(),
            next: Some(job),
        };
        self.with(status, jobs)
    }

    fn run_sync(&self, root: &R, fault_rule: &str) -> Option<Outcome> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.rule.run_sync(root))) {
            Ok(outcome) => outcome,
            Err(payload) => Some(fault(fault_rule, &RuleError::from_panic(payload.as_ref()))),
        }
    }

    /// Returns to `Unvalidated` and neutralizes queued or running work.
    pub fn clear(&self) -> Self {
        self.with(Status::Unvalidated, self.superseded())
    }

    /// Job slots after an update that must not be overwritten by older jobs:
    /// the queued job is dropped, and a running one gets a barrier behind it.
    fn superseded(&self) -> Jobs {
        let next = self.jobs.current.as_ref().map(|_| PendingJob::barrier());
        Jobs {
            current: self.jobs.current.clone(),
            next,
        }
    }

    /// Moves the queued job `pending` into the running slot.
    ///
    /// Returns `None` if the slots changed since the job was started.
    pub(crate) fn promote(&self, pending: JobId, running: RunningJob) -> Option<Self> {
        let queued = self.jobs.next.as_ref()?;
        if self.jobs.current.is_some() || queued.id() != pending {
            return None;
        }
        debug!("Promoted {}", pending);
        let jobs = Jobs {
            current: Some(running),
            next: None,
        };
        Some(self.with(self.status.clone(), jobs))
    }

    /// Folds the settled output of the running job `job` into the state.
    ///
    /// The output is shown only if nothing was queued behind the job and the
    /// job is not a barrier. Returns `None` if `job` is no longer running.
    pub(crate) fn settle(&self, job: JobId, output: Checked, fault_rule: &str) -> Option<Self> {
        let running = self.jobs.current.as_ref()?;
        if running.id() != job {
            return None;
        }
        let jobs = Jobs {
            current: None,
            next: self.jobs.next.clone(),
        };

        if jobs.next.is_some() {
            debug!("Discarded {}: superseded while running", job);
            return Some(self.with(self.status.clone(), jobs));
        }
        if running.is_barrier() {
            return Some(self.with(self.status.clone(), jobs));
        }

        let outcome = match output {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => {
                debug!("Discarded {}: cancelled", job);
                return Some(self.with(self.status.clone(), jobs));
            }
            Err(err) => fault(fault_rule, &err),
        };
        debug!("Settled {}: {:?}", job, outcome);
        Some(self.with(Status::Validated(outcome), jobs))
    }
}

/// Failure reported in place of a faulted rule's outcome.
fn fault(fault_rule: &str, err: &RuleError) -> Outcome {
    warn!("Rule fault: {}", err);
    Outcome::failed(fault_rule, data! { "error" => err.to_string() })
}

impl<R> Clone for FieldState<R> {
    fn clone(&self) -> Self {
        Self {
            rule: self.rule.clone(),
            status: self.status.clone(),
            jobs: self.jobs.clone(),
        }
    }
}

impl<R: Record> PartialEq for FieldState<R> {
    fn eq(&self, other: &Self) -> bool {
        self.rule.ptr_eq(&other.rule) && self.status == other.status && self.jobs == other.jobs
    }
}

impl<R> fmt::Debug for FieldState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldState")
            .field("status", &self.status)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use futures::future::AbortHandle;
    use serde_json::{Map, Value, json};

    use super::*;
    use crate::builder::Builder;
    use crate::schema::Schema;

    type Dynamic = Map<String, Value>;

    fn record(value: Value) -> Dynamic {
        match value {
            Value::Object(map) => map,
            _ => Dynamic::new(),
        }
    }

    fn sync_field() -> FieldState<Dynamic> {
        let schema = Schema::<Dynamic>::new().keyed("name", |b: Builder<Dynamic, String>| b.is_required());
        FieldState::new(schema.into_fields().remove(0).1)
    }

    fn async_field() -> FieldState<Dynamic> {
        let schema = Schema::<Dynamic>::new().keyed("email", |b: Builder<Dynamic, String>| {
            b.from_promise(|value, _| async move {
                if value.contains("taken") { Outcome::fail("taken") } else { Outcome::Passed }
            })
        });
        FieldState::new(schema.into_fields().remove(0).1)
    }

    fn running(job: &PendingJob, output: Checked) -> RunningJob {
        let (abort, _registration) = AbortHandle::new_pair();
        let fut: JobFuture = futures::future::ready(output).boxed();
        let shared = fut.shared();
        let _ = shared.clone().now_or_never();
        RunningJob::new(job.id(), job.is_barrier(), shared, abort)
    }

    #[test]
    fn test_sync_zero_delay_validates_immediately() {
        let state = sync_field().validate(&record(json!({"name": ""})), Duration::ZERO, false, "fault");

        assert_eq!(state.kind(), Kind::Validated);
        assert_eq!(state.outcome().unwrap().rule(), Some("is_required"));
        assert!(!state.passed());
        assert!(!state.is_pending());
    }

    #[test]
    fn test_sync_panic_becomes_fault() {
        let schema = Schema::<Dynamic>::new().keyed("name", |b: Builder<Dynamic, String>| {
            b.custom(|value: &String, _| {
                let tenth = value.as_bytes()[10];
                Outcome::check(tenth != 0, || crate::Failure::new("tenth", crate::Data::new()))
            })
        });
        let field = FieldState::new(schema.into_fields().remove(0).1);

        let state = field.validate(&Dynamic::new(), Duration::ZERO, false, "fault");

        assert_eq!(state.kind(), Kind::Validated);
        let failure = state.outcome().unwrap().failure().unwrap();
        assert_eq!(failure.rule(), "fault");
        assert!(
            failure
                .get("error")
                .and_then(Value::as_str)
                .is_some_and(|error| error.starts_with("Predicate panicked: index out of bounds"))
        );
    }

    #[test]
    fn test_sync_with_delay_queues_job() {
        let state = sync_field().validate(&Dynamic::new(), Duration::from_millis(300), false, "fault");

        assert_eq!(state.kind(), Kind::Validating);
        assert_eq!(state.jobs().next().unwrap().delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_async_request_replaces_next() {
        let field = async_field();
        let first = field.validate(&Dynamic::new(), Duration::ZERO, false, "fault");
        let second = first.validate(&Dynamic::new(), Duration::ZERO, false, "fault");

        let first_id = first.jobs().next().unwrap().id();
        let second_id = second.jobs().next().unwrap().id();
        assert_ne!(first_id, second_id);
        assert_eq!(first.jobs().next().unwrap().id(), first_id);
    }

    #[test]
    fn test_validated_field_does_not_flicker() {
        let field = async_field();
        let queued = field.validate(&Dynamic::new(), Duration::ZERO, false, "fault");
        let pending = queued.jobs().next().unwrap().clone();
        let validated = queued
            .promote(pending.id(), running(&pending, Ok(Outcome::Passed)))
            .unwrap()
            .settle(pending.id(), Ok(Outcome::Passed), "fault")
            .unwrap();
        assert!(validated.passed());

        let kept = validated.validate(&Dynamic::new(), Duration::ZERO, false, "fault");
        assert_eq!(kept.kind(), Kind::Validated);

        let cleared = validated.validate(&Dynamic::new(), Duration::ZERO, true, "fault");
        assert_eq!(cleared.kind(), Kind::Validating);
    }

    #[test]
    fn test_settle_discards_when_superseded() {
        let field = async_field();
        let queued = field.validate(&Dynamic::new(), Duration::ZERO, false, "fault");
        let pending = queued.jobs().next().unwrap().clone();
        let started = queued
            .promote(pending.id(), running(&pending, Ok(Outcome::fail("taken"))))
            .unwrap();
        let requeued = started.validate(&Dynamic::new(), Duration::ZERO, false, "fault");

        let folded = requeued
            .settle(pending.id(), Ok(Outcome::fail("taken")), "fault")
            .unwrap();

        assert_eq!(folded.kind(), Kind::Validating);
        assert!(folded.jobs().current().is_none());
        assert!(folded.jobs().is_promotable());
    }

    #[test]
    fn test_stale_promotion_is_rejected() {
        let field = async_field();
        let queued = field.validate(&Dynamic::new(), Duration::ZERO, false, "fault");
        let stale = queued.jobs().next().unwrap().clone();
        let requeued = queued.validate(&Dynamic::new(), Duration::ZERO, false, "fault");

        assert!(requeued.promote(stale.id(), running(&stale, Ok(Outcome::Passed))).is_none());
    }

    #[test]
    fn test_fault_becomes_failure() {
        let field = async_field();
        let queued = field.validate(&Dynamic::new(), Duration::ZERO, false, "fault");
        let pending = queued.jobs().next().unwrap().clone();
        let err = crate::error::RuleError::Panicked("boom".into());
        let folded = queued
            .promote(pending.id(), running(&pending, Err(err.clone())))
            .unwrap()
            .settle(pending.id(), Err(err), "fault")
            .unwrap();

        let outcome = folded.outcome().unwrap();
        assert_eq!(outcome.rule(), Some("fault"));
        assert_eq!(
            outcome.failure().unwrap().get("error"),
            Some(&json!("Predicate panicked: boom"))
        );
    }

    #[test]
    fn test_clear_with_running_job_queues_barrier() {
        let field = async_field();
        let queued = field.validate(&Dynamic::new(), Duration::ZERO, false, "fault");
        let pending = queued.jobs().next().unwrap().clone();
        let started = queued
            .promote(pending.id(), running(&pending, Ok(Outcome::fail("taken"))))
            .unwrap();

        let cleared = started.clear();
        assert_eq!(cleared.kind(), Kind::Unvalidated);
        assert!(cleared.jobs().next().unwrap().is_barrier());

        let folded = cleared
            .settle(pending.id(), Ok(Outcome::fail("taken")), "fault")
            .unwrap();
        assert_eq!(folded.kind(), Kind::Unvalidated);
    }

    #[test]
    fn test_clear_drops_queued_job() {
        let queued = async_field().validate(&Dynamic::new(), Duration::ZERO, false, "fault");
        let cleared = queued.clear();

        assert_eq!(cleared.kind(), Kind::Unvalidated);
        assert!(cleared.jobs().is_empty());
    }

    #[test]
    fn test_barrier_settle_keeps_status() {
        let field = sync_field();
        let delayed = field.validate(&Dynamic::new(), Duration::from_millis(10), false, "fault");
        let pending = delayed.jobs().next().unwrap().clone();
        let started = delayed
            .promote(pending.id(), running(&pending, Ok(Outcome::fail("is_required"))))
            .unwrap();

        let now = started.validate(&record(json!({"name": "Ada"})), Duration::ZERO, false, "fault");
        assert!(now.passed());
        let barrier = now.jobs().next().unwrap().clone();
        assert!(barrier.is_barrier());

        let after_old = now
            .settle(pending.id(), Ok(Outcome::fail("is_required")), "fault")
            .unwrap();
        assert!(after_old.passed());

        let after_barrier = after_old
            .promote(barrier.id(), running(&barrier, Ok(Outcome::Passed)))
            .unwrap()
            .settle(barrier.id(), Ok(Outcome::Passed), "fault")
            .unwrap();
        assert!(after_barrier.passed());
        assert!(!after_barrier.is_pending());
    }
}
