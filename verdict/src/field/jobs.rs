//! The two-slot job queue held by every field.
//!
//! `next` holds at most one requested-but-not-started job and is only written
//! by `validate`/`clear`; `current` holds the job in flight and is only
//! written by the driver. Writing `next` always replaces what was there.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{AbortHandle, Shared};

use crate::outcome::Outcome;
use crate::rule::{BoxFuture, Checked};

/// Future type of a started job.
pub type JobFuture = BoxFuture<'static, Checked>;

type Start = Arc<dyn Fn() -> JobFuture + Send + Sync>;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    fn next() -> Self {
        Self(NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for logging.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

#[derive(Clone)]
enum Task {
    /// Wait `delay`, then start the rule.
    Check { delay: Duration, start: Start },
    /// Resolve to `Passed` without touching the field's status on fold.
    Barrier,
}

/// A requested job that has not started yet.
#[derive(Clone)]
pub struct PendingJob {
    id: JobId,
    task: Task,
}

impl PendingJob {
    pub(crate) fn check(delay: Duration, start: impl Fn() -> JobFuture + Send + Sync + 'static) -> Self {
        Self {
            id: JobId::next(),
            task: Task::Check {
                delay,
                start: Arc::new(start),
            },
        }
    }

    /// A trivial job whose only purpose is to supersede the job in flight.
    pub(crate) fn barrier() -> Self {
        Self {
            id: JobId::next(),
            task: Task::Barrier,
        }
    }

    /// Job identifier.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Check if this is a barrier job.
    pub fn is_barrier(&self) -> bool {
        matches!(self.task, Task::Barrier)
    }

    /// Delay before the rule starts (zero for barriers).
    pub fn delay(&self) -> Duration {
        match &self.task {
            Task::Check { delay, .. } => *delay,
            Task::Barrier => Duration::ZERO,
        }
    }

    /// Builds the job's future. Nothing runs until it is polled; the delay
    /// elapses before the rule itself is started.
    pub(crate) fn start(&self) -> JobFuture {
        match &self.task {
            Task::Check { delay, start } if delay.is_zero() => start(),
            Task::Check { delay, start } => {
                let (delay, start) = (*delay, Arc::clone(start));
                Box::pin(async move {
                    tokio::time::sleep(delay).await;
                    start().await
                })
            }
            Task::Barrier => futures::future::ready(Ok(Outcome::Passed)).boxed(),
        }
    }
}

impl std::fmt::Debug for PendingJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingJob")
            .field("id", &self.id)
            .field("barrier", &self.is_barrier())
            .field("delay", &self.delay())
            .finish()
    }
}

/// A job that has been started by the driver.
#[derive(Clone)]
pub struct RunningJob {
    id: JobId,
    barrier: bool,
    output: Shared<JobFuture>,
    abort: AbortHandle,
}

impl RunningJob {
    pub(crate) fn new(id: JobId, barrier: bool, output: Shared<JobFuture>, abort: AbortHandle) -> Self {
        Self {
            id,
            barrier,
            output,
            abort,
        }
    }

    /// Job identifier (same as when it was pending).
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Check if this is a barrier job.
    pub fn is_barrier(&self) -> bool {
        self.barrier
    }

    /// The job's output, once it has settled.
    pub fn settled(&self) -> Option<Checked> {
        self.output.peek().cloned()
    }

    /// Check if the job has settled.
    pub fn is_settled(&self) -> bool {
        self.output.peek().is_some()
    }

    /// Requests the job to stop; it then settles as cancelled.
    pub(crate) fn abort(&self) {
        self.abort.abort();
    }
}

impl std::fmt::Debug for RunningJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningJob")
            .field("id", &self.id)
            .field("barrier", &self.barrier)
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// A field's job slots.
#[derive(Debug, Clone, Default)]
pub struct Jobs {
    pub(crate) current: Option<RunningJob>,
    pub(crate) next: Option<PendingJob>,
}

impl Jobs {
    /// The job in flight, if any.
    pub fn current(&self) -> Option<&RunningJob> {
        self.current.as_ref()
    }

    /// The queued job, if any.
    pub fn next(&self) -> Option<&PendingJob> {
        self.next.as_ref()
    }

    /// Check if neither slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.next.is_none()
    }

    /// Check if the driver can promote `next` right now.
    pub fn is_promotable(&self) -> bool {
        self.current.is_none() && self.next.is_some()
    }
}

impl PartialEq for Jobs {
    fn eq(&self, other: &Self) -> bool {
        self.current.as_ref().map(RunningJob::id) == other.current.as_ref().map(RunningJob::id)
            && self.next.as_ref().map(PendingJob::id) == other.next.as_ref().map(PendingJob::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_ids_are_unique() {
        let a = PendingJob::barrier();
        let b = PendingJob::barrier();

        assert_ne!(a.id(), b.id());
        assert!(b.id() > a.id());
    }

    #[tokio::test]
    async fn test_barrier_resolves_passed() {
        let job = PendingJob::barrier();

        assert!(job.is_barrier());
        assert_eq!(job.start().await, Ok(Outcome::Passed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_runs_before_start() {
        let started = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&started);
        let job = PendingJob::check(Duration::from_millis(300), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(Outcome::fail("late"))).boxed()
        });

        let fut = job.start();
        assert_eq!(started.load(Ordering::SeqCst), 0);

        let before = tokio::time::Instant::now();
        let outcome = fut.await.unwrap();
        assert!(before.elapsed() >= Duration::from_millis(300));
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.rule(), Some("late"));
    }
}
