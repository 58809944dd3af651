// Built-in rules for numeric values
//
// Bounds are compared as f64, so NaN fails every bound check.

use serde::Serialize;

use super::Builder;
use crate::data;
use crate::outcome::{Failure, Outcome};
use crate::record::Record;
use crate::rule::SyncRule;

fn num<P: Into<f64>>(value: P) -> f64 {
    value.into()
}

impl<R, P> Builder<R, P>
where
    R: Record,
    P: Copy + Into<f64> + Serialize + Send + Sync + 'static,
{
    /// Require the value to be at least `min`.
    pub fn is_min(self, min: P) -> SyncRule<R, P> {
        SyncRule::new(move |&value: &P, _| {
            Outcome::check(num(value) >= num(min), || {
                Failure::new("is_min", data! { "expected" => min, "given" => value })
            })
        })
    }

    /// Require the value to be at most `max`.
    pub fn is_max(self, max: P) -> SyncRule<R, P> {
        SyncRule::new(move |&value: &P, _| {
            Outcome::check(num(value) <= num(max), || {
                Failure::new("is_max", data! { "expected" => max, "given" => value })
            })
        })
    }

    /// Require `min <= value <= max`.
    pub fn is_between(self, min: P, max: P) -> SyncRule<R, P> {
        SyncRule::new(move |&value: &P, _| {
            let v = num(value);
            Outcome::check(v >= num(min) && v <= num(max), || {
                Failure::new(
                    "is_between",
                    data! { "min" => min, "max" => max, "given" => value },
                )
            })
        })
    }

    /// Require a finite value with no fractional part.
    pub fn is_integer(self) -> SyncRule<R, P> {
        SyncRule::new(|&value: &P, _| {
            let v = num(value);
            Outcome::check(v.is_finite() && v.fract() == 0.0, || {
                Failure::new("is_integer", data! { "given" => value })
            })
        })
    }

    /// Require a value strictly greater than zero.
    pub fn is_positive(self) -> SyncRule<R, P> {
        SyncRule::new(|&value: &P, _| {
            Outcome::check(num(value) > 0.0, || {
                Failure::new("is_positive", data! { "given" => value })
            })
        })
    }
}
