// Built-in rules for bool values

use super::Builder;
use crate::data;
use crate::outcome::{Failure, Outcome};
use crate::record::Record;
use crate::rule::SyncRule;

fn flag_rule<R: Record>(name: &'static str, expected: bool) -> SyncRule<R, bool> {
    SyncRule::new(move |&value: &bool, _| {
        Outcome::check(value == expected, || {
            Failure::new(name, data! { "expected" => expected, "given" => value })
        })
    })
}

impl<R: Record> Builder<R, bool> {
    /// Require the checkbox to be checked.
    pub fn is_true(self) -> SyncRule<R, bool> {
        flag_rule("is_true", true)
    }

    /// Require the checkbox to be unchecked.
    pub fn is_false(self) -> SyncRule<R, bool> {
        flag_rule("is_false", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let b = Builder::<(), bool>::new();

        assert!(b.is_true().run(&true, &()).is_passed());
        assert_eq!(b.is_true().run(&false, &()).rule(), Some("is_true"));
        assert!(b.is_false().run(&false, &()).is_passed());
        assert_eq!(b.is_false().run(&true, &()).rule(), Some("is_false"));
    }
}
