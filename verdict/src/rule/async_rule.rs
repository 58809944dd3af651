use std::future::Future;
use std::sync::Arc;

use super::{BoxFuture, Checked};
use crate::error::RuleError;
use crate::outcome::Outcome;

type AsyncCheck<R, P> = dyn Fn(P, R) -> BoxFuture<'static, Checked> + Send + Sync;

/// An asynchronous rule over a field value `P` of a record `R`.
///
/// The check receives owned copies of the value and the record so the future
/// it returns can outlive the snapshot that started it.
pub struct AsyncRule<R, P> {
    check: Arc<AsyncCheck<R, P>>,
}

impl<R: Send + 'static, P: Send + 'static> AsyncRule<R, P> {
    /// Wraps an infallible asynchronous predicate.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(P, R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        Self {
            check: Arc::new(move |value: P, root: R| -> BoxFuture<'static, Checked> {
                let fut = f(value, root);
                Box::pin(async move { Ok(fut.await) })
            }),
        }
    }

    /// Wraps a fallible asynchronous predicate.
    ///
    /// An `Err` is a fault, not a validation failure: it is reported as
    /// [`RuleError::Predicate`] and short-circuits any composition.
    pub fn try_new<F, Fut, E>(f: F) -> Self
    where
        F: Fn(P, R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        Self {
            check: Arc::new(move |value: P, root: R| -> BoxFuture<'static, Checked> {
                let fut = f(value, root);
                Box::pin(async move { fut.await.map_err(RuleError::predicate) })
            }),
        }
    }

    /// Starts the check. The returned future owns everything it needs.
    pub fn run(&self, value: P, root: R) -> BoxFuture<'static, Checked> {
        (self.check)(value, root)
    }

    /// Returns `true` if both handles point at the same rule.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.check, &other.check)
    }
}

impl<R, P> AsyncRule<R, P>
where
    R: Clone + Send + 'static,
    P: Clone + Send + 'static,
{
    /// Passes only if both rules pass; `other` is never started once `self` fails.
    pub fn and(self, other: Self) -> Self {
        let (first, second) = (self.check, other.check);
        Self {
            check: Arc::new(move |value: P, root: R| -> BoxFuture<'static, Checked> {
                let pending = first(value.clone(), root.clone());
                let second = Arc::clone(&second);
                Box::pin(async move {
                    match pending.await? {
                        Outcome::Passed => second(value, root).await,
                        failed => Ok(failed),
                    }
                })
            }),
        }
    }

    /// Passes if either rule passes; `other` is never started once `self` passes.
    pub fn or(self, other: Self) -> Self {
        let (first, second) = (self.check, other.check);
        Self {
            check: Arc::new(move |value: P, root: R| -> BoxFuture<'static, Checked> {
                let pending = first(value.clone(), root.clone());
                let second = Arc::clone(&second);
                Box::pin(async move {
                    match pending.await? {
                        Outcome::Passed => Ok(Outcome::Passed),
                        Outcome::Failed(_) => second(value, root).await,
                    }
                })
            }),
        }
    }
}

impl<R, P> Clone for AsyncRule<R, P> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
        }
    }
}

impl<R, P> std::fmt::Debug for AsyncRule<R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRule").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counted(result: Outcome, calls: &Arc<AtomicUsize>) -> AsyncRule<(), String> {
        let calls = Arc::clone(calls);
        AsyncRule::new(move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            let result = result.clone();
            async move { result }
        })
    }

    #[tokio::test]
    async fn test_and_skips_second_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rule = counted(Outcome::fail("taken"), &Arc::new(AtomicUsize::new(0)))
            .and(counted(Outcome::Passed, &calls));

        let outcome = rule.run("a".into(), ()).await.unwrap();

        assert_eq!(outcome.rule(), Some("taken"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_or_skips_second_after_pass() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rule = counted(Outcome::Passed, &Arc::new(AtomicUsize::new(0)))
            .or(counted(Outcome::fail("never"), &calls));

        assert!(rule.run("a".into(), ()).await.unwrap().is_passed());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fault_short_circuits_composition() {
        let calls = Arc::new(AtomicUsize::new(0));
        let broken = AsyncRule::<(), String>::try_new(|_, _| async {
            Err::<Outcome, _>("lookup service down")
        });
        let rule = broken.and(counted(Outcome::Passed, &calls));

        let err = rule.run("a".into(), ()).await.unwrap_err();

        assert_eq!(err, RuleError::Predicate("lookup service down".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mixed_with_lifted_sync_rule() {
        let sync = crate::SyncRule::<(), String>::new(|v, _| {
            if v.is_empty() { Outcome::fail("required") } else { Outcome::Passed }
        });
        let remote = counted(Outcome::fail("taken"), &Arc::new(AtomicUsize::new(0)));
        let rule = sync.to_async().and(remote);

        assert_eq!(rule.run(String::new(), ()).await.unwrap().rule(), Some("required"));
        assert_eq!(rule.run("bob".into(), ()).await.unwrap().rule(), Some("taken"));
    }
}
