// Built-in rules for calendar values

use chrono::{Datelike, Weekday};
use serde::Serialize;

use super::Builder;
use crate::data;
use crate::outcome::{Failure, Outcome};
use crate::record::Record;
use crate::rule::SyncRule;

impl<R, P> Builder<R, P>
where
    R: Record,
    P: Datelike + PartialOrd + Copy + Serialize + Send + Sync + 'static,
{
    /// Require the value to fall strictly before `limit`.
    pub fn is_before(self, limit: P) -> SyncRule<R, P> {
        SyncRule::new(move |value: &P, _| {
            Outcome::check(*value < limit, || {
                Failure::new("is_before", data! { "expected" => limit, "given" => value })
            })
        })
    }

    /// Require the value to fall strictly after `limit`.
    pub fn is_after(self, limit: P) -> SyncRule<R, P> {
        SyncRule::new(move |value: &P, _| {
            Outcome::check(*value > limit, || {
                Failure::new("is_after", data! { "expected" => limit, "given" => value })
            })
        })
    }

    /// Require `start <= value <= end`.
    pub fn is_within(self, start: P, end: P) -> SyncRule<R, P> {
        SyncRule::new(move |value: &P, _| {
            Outcome::check(*value >= start && *value <= end, || {
                Failure::new(
                    "is_within",
                    data! { "start" => start, "end" => end, "given" => value },
                )
            })
        })
    }

    /// Require a Monday-to-Friday date.
    pub fn is_weekday(self) -> SyncRule<R, P> {
        SyncRule::new(|value: &P, _| {
            let weekday = value.weekday();
            Outcome::check(!matches!(weekday, Weekday::Sat | Weekday::Sun), || {
                Failure::new(
                    "is_weekday",
                    data! { "given" => value, "weekday" => weekday.to_string() },
                )
            })
        })
    }
}
