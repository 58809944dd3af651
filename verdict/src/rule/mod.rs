//! Rule algebra: atomic checks and their short-circuit composition.
//!
//! Rules come in two variants. A [`SyncRule`] wraps a pure function of the
//! candidate value and the whole record; an [`AsyncRule`] wraps a function
//! returning a future. Both compose with `and`/`or`, always evaluating the
//! left operand first and skipping the right one once the left decides the
//! outcome. Mixing variants requires an explicit [`SyncRule::to_async`].
//!
//! # Example
//!
//! ```
//! use verdict::{Outcome, SyncRule};
//!
//! let non_empty = SyncRule::<(), String>::new(|v, _| {
//!     if v.is_empty() { Outcome::fail("required") } else { Outcome::Passed }
//! });
//! let short = SyncRule::<(), String>::new(|v, _| {
//!     if v.len() > 3 { Outcome::fail("too_long") } else { Outcome::Passed }
//! });
//!
//! let rule = non_empty.and(short);
//! assert_eq!(rule.run(&String::new(), &()).rule(), Some("required"));
//! assert!(rule.run(&"abc".to_string(), &()).is_passed());
//! ```

mod async_rule;
mod sync_rule;

use std::future::Future;
use std::pin::Pin;

pub use async_rule::AsyncRule;
pub use sync_rule::SyncRule;

use crate::error::RuleError;
use crate::outcome::Outcome;

/// Type alias for boxed futures used in async validation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Output of an asynchronous check: an outcome, or a fault to be recovered by the driver.
pub type Checked = Result<Outcome, RuleError>;

/// A rule of either variant, as stored in a schema entry.
pub enum Rule<R, P> {
    /// Synchronous rule, runnable without a job.
    Sync(SyncRule<R, P>),
    /// Asynchronous rule, always run through the job queue.
    Async(AsyncRule<R, P>),
}

impl<R, P> Rule<R, P> {
    /// Check if this rule is asynchronous.
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl<R: Send + 'static, P: Send + 'static> Rule<R, P> {
    /// Returns the rule as an asynchronous rule, lifting it if needed.
    pub fn into_async(self) -> AsyncRule<R, P> {
        match self {
            Self::Sync(rule) => rule.to_async(),
            Self::Async(rule) => rule,
        }
    }
}

impl<R, P> Clone for Rule<R, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(rule) => Self::Sync(rule.clone()),
            Self::Async(rule) => Self::Async(rule.clone()),
        }
    }
}

impl<R, P> std::fmt::Debug for Rule<R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(rule) => rule.fmt(f),
            Self::Async(rule) => rule.fmt(f),
        }
    }
}

impl<R, P> From<SyncRule<R, P>> for Rule<R, P> {
    fn from(rule: SyncRule<R, P>) -> Self {
        Self::Sync(rule)
    }
}

impl<R, P> From<AsyncRule<R, P>> for Rule<R, P> {
    fn from(rule: AsyncRule<R, P>) -> Self {
        Self::Async(rule)
    }
}
