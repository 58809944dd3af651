//! Job promotion driver.
//!
//! The driver is the only writer of a field's running slot. Each
//! [`tick`](Driver::tick) starts queued jobs whose field has nothing running
//! and collects the outputs of jobs that have settled. The resulting
//! [`Patch`] is folded into whatever snapshot the caller holds by then:
//!
//! ```text
//! let patch = driver.tick(&validator);
//! validator = patch.apply(&validator);   // or a newer snapshot
//! ```
//!
//! Every update is guarded by the job id it was computed for, so a patch
//! applied to a snapshot that moved on only applies the parts that still fit.

mod wakeup;

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable};
use log::{debug, trace};
use tokio::runtime::Handle;

use crate::config::CancelPolicy;
use crate::error::{DriverError, RuleError};
use crate::field::{JobFuture, JobId, PendingJob, RunningJob};
use crate::record::Record;
use crate::rule::Checked;
use crate::validator::Validator;

use self::wakeup::{WakeupReceiver, WakeupSender};

/// Longest [`Driver::settle`] sleeps without a wakeup before stepping again.
pub const SETTLE_POLL: Duration = Duration::from_millis(50);

enum Update {
    Promote {
        index: usize,
        pending: JobId,
        running: RunningJob,
    },
    Settle {
        index: usize,
        job: JobId,
        output: Checked,
    },
}

/// Updates computed by one [`Driver::tick`].
#[derive(Default)]
pub struct Patch {
    updates: Vec<Update>,
}

impl Patch {
    /// Check if the tick found nothing to do.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Number of updates.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Folds the updates into `validator`, returning the new snapshot.
    ///
    /// Promotions whose queued job was replaced in the meantime are dropped
    /// and the job they started is aborted. Settlements for jobs that are no
    /// longer running are dropped.
    pub fn apply<R: Record>(self, validator: &Validator<R>) -> Validator<R> {
        let mut next = validator.clone();
        let fault_rule = validator.config().fault_rule.clone();

        for update in self.updates {
            match update {
                Update::Promote {
                    index,
                    pending,
                    running,
                } => {
                    let promoted = next
                        .state_at(index)
                        .and_then(|state| state.promote(pending, running.clone()));
                    match promoted {
                        Some(state) => next.replace(index, state),
                        None => {
                            debug!("Stale promotion of {}; aborting", pending);
                            running.abort();
                        }
                    }
                }
                Update::Settle { index, job, output } => {
                    let settled = next
                        .state_at(index)
                        .and_then(|state| state.settle(job, output, &fault_rule));
                    match settled {
                        Some(state) => next.replace(index, state),
                        None => trace!("Stale settlement of {}", job),
                    }
                }
            }
        }
        next
    }
}

impl std::fmt::Debug for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for update in &self.updates {
            match update {
                Update::Promote { index, pending, .. } => list.entry(&format!("promote {pending} @{index}")),
                Update::Settle { index, job, .. } => list.entry(&format!("settle {job} @{index}")),
            };
        }
        list.finish()
    }
}

/// Starts queued jobs on a tokio runtime and folds their results back.
pub struct Driver {
    handle: Handle,
    wakeup_tx: WakeupSender,
    wakeup_rx: WakeupReceiver,
}

impl Driver {
    /// Creates a driver on the current tokio runtime.
    pub fn new() -> Result<Self, DriverError> {
        Ok(Self::with_handle(Handle::try_current()?))
    }

    /// Creates a driver spawning jobs on `handle`.
    pub fn with_handle(handle: Handle) -> Self {
        let (wakeup_tx, wakeup_rx) = wakeup::channel();
        Self {
            handle,
            wakeup_tx,
            wakeup_rx,
        }
    }

    /// Computes the updates for `validator` without touching it.
    ///
    /// Starts every queued job whose field has nothing running. With
    /// [`CancelPolicy::Abort`], running jobs with a newer request queued
    /// behind them are aborted here.
    pub fn tick<R: Record>(&self, validator: &Validator<R>) -> Patch {
        let abort_superseded = validator.config().cancel_policy == CancelPolicy::Abort;
        let mut patch = Patch::default();

        for (index, (field, state)) in validator.fields().enumerate() {
            let jobs = state.jobs();
            match (jobs.current(), jobs.next()) {
                (Some(current), next) => match current.settled() {
                    Some(output) => patch.updates.push(Update::Settle {
                        index,
                        job: current.id(),
                        output,
                    }),
                    None if next.is_some() && abort_superseded => {
                        debug!("Aborting superseded {} on '{}'", current.id(), field);
                        current.abort();
                    }
                    None => {}
                },
                (None, Some(pending)) => {
                    trace!("Starting {} on '{}'", pending.id(), field);
                    patch.updates.push(Update::Promote {
                        index,
                        pending: pending.id(),
                        running: self.spawn(pending),
                    });
                }
                (None, None) => {}
            }
        }
        patch
    }

    /// Ticks and applies the patch to the same snapshot.
    pub fn step<R: Record>(&self, validator: &Validator<R>) -> Validator<R> {
        self.tick(validator).apply(validator)
    }

    /// Steps until no field has a job queued or running.
    ///
    /// Jobs started by this driver wake it as soon as they settle. Jobs
    /// started elsewhere (another driver, or a patch from one) are picked up
    /// by re-stepping every [`SETTLE_POLL`].
    pub async fn settle<R: Record>(&mut self, mut validator: Validator<R>) -> Validator<R> {
        loop {
            validator = self.step(&validator);
            if !validator.is_pending() {
                return validator;
            }
            let promotable = validator
                .fields()
                .any(|(_, state)| state.jobs().is_promotable());
            if !promotable && tokio::time::timeout(SETTLE_POLL, self.wait()).await.is_err() {
                trace!("No wakeup within {:?}; re-stepping", SETTLE_POLL);
            }
        }
    }

    /// Waits until some job started by this driver has settled.
    pub async fn wait(&mut self) {
        // The driver holds a sender, so the channel never closes
        let _ = self.wakeup_rx.recv().await;
    }

    fn spawn(&self, pending: &PendingJob) -> RunningJob {
        let (abort, registration) = AbortHandle::new_pair();

        let job = pending.clone();
        let work = AssertUnwindSafe(async move { job.start().await })
            .catch_unwind()
            .map(|result| result.unwrap_or_else(|payload| Err(RuleError::from_panic(payload.as_ref()))));
        let output: JobFuture = Abortable::new(work, registration)
            .map(|result| result.unwrap_or(Err(RuleError::Cancelled)))
            .boxed();
        let output = output.shared();

        let driven = output.clone();
        let wakeup = self.wakeup_tx.clone();
        self.handle.spawn(async move {
            let _ = driven.await;
            wakeup.send();
        });

        RunningJob::new(pending.id(), pending.is_barrier(), output, abort)
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver").finish_non_exhaustive()
    }
}
