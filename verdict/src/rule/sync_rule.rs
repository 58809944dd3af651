use std::sync::Arc;

use super::AsyncRule;
use crate::outcome::Outcome;

type SyncCheck<R, P> = dyn Fn(&P, &R) -> Outcome + Send + Sync;

/// A synchronous rule over a field value `P` of a record `R`.
///
/// Rules are immutable and cheap to clone; composition always builds a new
/// rule and never touches its operands.
pub struct SyncRule<R, P> {
    check: Arc<SyncCheck<R, P>>,
}

impl<R: 'static, P: 'static> SyncRule<R, P> {
    /// Wraps a predicate.
    ///
    /// The predicate must be total: rejections are reported as
    /// [`Outcome::Failed`], never by panicking.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&P, &R) -> Outcome + Send + Sync + 'static,
    {
        Self { check: Arc::new(f) }
    }

    /// Runs the rule against a value and its record.
    pub fn run(&self, value: &P, root: &R) -> Outcome {
        (self.check)(value, root)
    }

    /// Passes only if both rules pass; `other` is skipped once `self` fails.
    pub fn and(self, other: Self) -> Self {
        let (first, second) = (self.check, other.check);
        Self::new(move |value, root| match first(value, root) {
            Outcome::Passed => second(value, root),
            failed => failed,
        })
    }

    /// Passes if either rule passes; `other` is skipped once `self` passes.
    pub fn or(self, other: Self) -> Self {
        let (first, second) = (self.check, other.check);
        Self::new(move |value, root| match first(value, root) {
            Outcome::Passed => Outcome::Passed,
            Outcome::Failed(_) => second(value, root),
        })
    }

    /// Returns `true` if both handles point at the same rule.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.check, &other.check)
    }
}

impl<R: Send + 'static, P: Send + 'static> SyncRule<R, P> {
    /// Lifts the rule into an asynchronous one.
    ///
    /// The resulting future yields once before reporting, so a lifted check
    /// never settles inside the call that started it.
    pub fn to_async(&self) -> AsyncRule<R, P> {
        let check = Arc::clone(&self.check);
        AsyncRule::new(move |value: P, root: R| {
            let check = Arc::clone(&check);
            async move {
                tokio::task::yield_now().await;
                check(&value, &root)
            }
        })
    }
}

impl<R, P> Clone for SyncRule<R, P> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
        }
    }
}

impl<R, P> std::fmt::Debug for SyncRule<R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRule").finish_non_exhaustive()
    }
}
