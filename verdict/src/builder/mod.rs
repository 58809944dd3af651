//! The closed catalog of named rule primitives.
//!
//! A [`Builder<R, P>`] is handed to every schema entry and exposes the
//! primitives that make sense for the field's value type `P`: string rules
//! for `String`, bound checks for numbers, calendar checks for dates, plus
//! the generic ones below that work for any serializable value.
//!
//! Format checks (`is_email`, `is_alphanumeric`, ...) accept an empty
//! string; combine them with `is_required` to reject empty input.

mod boolean;
mod date;
mod number;
mod string;

use std::future::Future;
use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;

use crate::outcome::{Failure, Outcome};
use crate::record::{Record, field_value};
use crate::rule::{AsyncRule, SyncRule};
use crate::data;

/// Rule factory for a field of type `P` in a record of type `R`.
pub struct Builder<R, P> {
    _marker: PhantomData<fn() -> (R, P)>,
}

impl<R, P> Builder<R, P> {
    /// Creates a builder. Schemas create these; callers rarely need to.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<R, P> Default for Builder<R, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for Builder<R, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, P> Copy for Builder<R, P> {}

/// Serializes a candidate value for a failure's `given` entry.
pub(crate) fn given<T: Serialize + ?Sized>(value: &T) -> Value {
    field_value(value).unwrap_or(Value::Null)
}

impl<R: Record, P: Send + Sync + 'static> Builder<R, P> {
    /// Custom synchronous rule with full control over the outcome.
    pub fn custom<F>(self, f: F) -> SyncRule<R, P>
    where
        F: Fn(&P, &R) -> Outcome + Send + Sync + 'static,
    {
        SyncRule::new(f)
    }

    /// Named boolean predicate over the value; failures carry `{given}`.
    pub fn predicate<F>(self, name: impl Into<String>, f: F) -> SyncRule<R, P>
    where
        P: Serialize,
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        SyncRule::new(move |value, _| {
            Outcome::check(f(value), || {
                Failure::new(name.clone(), data! { "given" => given(value) })
            })
        })
    }

    /// Chooses the rule per call from the value and the whole record.
    ///
    /// This is how rules depending on other fields are expressed.
    pub fn pick<F>(self, f: F) -> SyncRule<R, P>
    where
        F: Fn(&P, &R) -> SyncRule<R, P> + Send + Sync + 'static,
    {
        SyncRule::new(move |value, root| f(value, root).run(value, root))
    }

    /// Chooses the rule per call from the whole record only.
    pub fn from_state<F>(self, f: F) -> SyncRule<R, P>
    where
        F: Fn(&R) -> SyncRule<R, P> + Send + Sync + 'static,
    {
        SyncRule::new(move |value, root| f(root).run(value, root))
    }

    /// Asynchronous escape hatch: wraps a user-supplied future-returning check.
    pub fn from_promise<F, Fut>(self, f: F) -> AsyncRule<R, P>
    where
        F: Fn(P, R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        AsyncRule::new(f)
    }

    /// Like [`from_promise`](Self::from_promise) for checks that can fault.
    pub fn try_from_promise<F, Fut, E>(self, f: F) -> AsyncRule<R, P>
    where
        F: Fn(P, R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        AsyncRule::try_new(f)
    }
}

impl<R, P> Builder<R, P>
where
    R: Record,
    P: PartialEq + Serialize + Send + Sync + 'static,
{
    /// Requires the value to equal `expected`.
    pub fn is(self, expected: P) -> SyncRule<R, P> {
        SyncRule::new(move |value, _| {
            Outcome::check(*value == expected, || {
                Failure::new(
                    "is",
                    data! { "expected" => given(&expected), "given" => given(value) },
                )
            })
        })
    }

    /// Requires the value to differ from `unexpected`.
    pub fn is_not(self, unexpected: P) -> SyncRule<R, P> {
        SyncRule::new(move |value, _| {
            Outcome::check(*value != unexpected, || {
                Failure::new(
                    "is_not",
                    data! { "unexpected" => given(&unexpected), "given" => given(value) },
                )
            })
        })
    }

    /// Requires the value to be one of `allowed`.
    pub fn one_of(self, allowed: impl IntoIterator<Item = P>) -> SyncRule<R, P> {
        let allowed: Vec<P> = allowed.into_iter().collect();
        SyncRule::new(move |value, _| {
            Outcome::check(allowed.contains(value), || {
                Failure::new(
                    "one_of",
                    data! { "expected" => given(&allowed), "given" => given(value) },
                )
            })
        })
    }

    /// Requires the value to equal another field of the same record.
    ///
    /// The sibling is read at run time; an absent sibling reads as `null`.
    pub fn equal_to(self, other: impl Into<String>) -> SyncRule<R, P> {
        let other = other.into();
        SyncRule::new(move |value: &P, root: &R| {
            let sibling = root.get(&other).unwrap_or(Value::Null);
            let candidate = given(value);
            Outcome::check(candidate == sibling, || {
                Failure::new(
                    "equal_to",
                    data! {
                        "other" => other,
                        "expected" => sibling,
                        "given" => candidate,
                    },
                )
            })
        })
    }
}
