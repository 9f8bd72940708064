//! Internal testing utilities for the rten-ir crates.

use std::fmt::{Debug, Display};
use std::panic::{RefUnwindSafe, UnwindSafe};

/// Utility for creating parametrized (aka. table-driven) tests.
///
/// Create a struct, conventionally named `Case`, which holds the data for a
/// single test case and implements `Debug`. Then build a collection of cases
/// and call `test_each` with the test function.
///
/// All cases are run, even if earlier ones fail. If any case panics,
/// `test_each` panics afterwards with the count and debug representations of
/// the failing cases.
///
/// ```
/// use rten_testing::TestCases;
///
/// # fn test_rank() {
/// #[derive(Debug)]
/// struct Case {
///     shape: Vec<usize>,
///     rank: usize,
/// }
///
/// let cases = [
///     Case { shape: vec![1, 2, 4], rank: 3 },
///     Case { shape: vec![], rank: 0 },
/// ];
///
/// cases.test_each(|case| {
///     assert_eq!(case.shape.len(), case.rank);
/// });
/// # }
/// # test_rank();
/// ```
///
/// Test cases and any values captured by the test function must be
/// [unwind safe](https://doc.rust-lang.org/std/panic/fn.catch_unwind.html).
/// Values created inside the test function have no such restriction, so
/// cases which involve graph nodes should describe the inputs (eg. as shapes)
/// and build the nodes within the test function.
pub trait TestCases {
    /// The data for a single test case.
    type Case;

    /// Call test function `test` with each test case in `self`, catching any panics.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Variant of [`test_each`](TestCases::test_each) which passes a clone
    /// of each test case to the test function, rather than a reference.
    fn test_each_clone(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + Clone + UnwindSafe;
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe,
    {
        let failures: Vec<_> = self
            .into_iter()
            .filter(|case| std::panic::catch_unwind(|| test(case)).is_err())
            .collect();
        report_failures(&failures);
    }

    fn test_each_clone(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Clone + Debug + UnwindSafe,
    {
        let test = &test;
        let failures: Vec<_> = self
            .into_iter()
            .filter(|case| {
                let value = case.clone();
                std::panic::catch_unwind(move || test(value)).is_err()
            })
            .collect();
        report_failures(&failures);
    }
}

fn report_failures<T: Debug>(failures: &[T]) {
    assert_eq!(
        failures.len(),
        0,
        "{} test cases failed: {:?}",
        failures.len(),
        failures
    );
}

/// Assert that the string form of `value` contains `expected`.
///
/// This is used to check validation failures, where tests should match on a
/// part of the message which identifies the rule that failed, rather than
/// the whole message.
#[track_caller]
pub fn assert_has_substring<D: Display + ?Sized>(value: &D, expected: &str) {
    let text = value.to_string();
    assert!(
        text.contains(expected),
        "expected \"{}\" to contain \"{}\"",
        text,
        expected
    );
}

/// Assert that `result` is an error whose message contains `expected`.
#[track_caller]
pub fn assert_err_contains<T: Debug, E: Display>(result: Result<T, E>, expected: &str) {
    match result {
        Ok(value) => panic!(
            "expected an error containing \"{}\" but got Ok({:?})",
            expected, value
        ),
        Err(err) => assert_has_substring(&err, expected),
    }
}

#[cfg(test)]
mod tests {
    use super::{assert_err_contains, assert_has_substring, TestCases};

    #[test]
    fn test_test_cases_success() {
        #[derive(Clone, Debug)]
        struct Case {
            x: i32,
        }

        let cases = [Case { x: 1 }, Case { x: 2 }];
        cases.clone().test_each(|case| _ = case.x);
        cases.clone().test_each_clone(|case| _ = case.x);
    }

    #[test]
    #[should_panic(expected = "2 test cases failed")]
    fn test_test_each_failure() {
        #[derive(Debug)]
        struct Case {
            x: i32,
        }

        let cases = [Case { x: 1 }, Case { x: 2 }];
        cases.test_each(|case| {
            _ = case.x;
            panic!("oh no");
        })
    }

    #[test]
    #[should_panic(expected = "1 test cases failed")]
    fn test_test_each_clone_failure() {
        #[derive(Clone, Debug)]
        struct Case {
            x: i32,
        }

        let cases = [Case { x: 1 }, Case { x: 2 }];
        cases.test_each_clone(|case| {
            assert_eq!(case.x, 1);
        })
    }

    #[test]
    fn test_assert_has_substring() {
        assert_has_substring("Expected a 3D tensor for the 'boxes' input", "'boxes'");
        assert_err_contains(Err::<(), _>("rank mismatch"), "rank");
    }

    #[test]
    #[should_panic(expected = "to contain \"scores\"")]
    fn test_assert_has_substring_failure() {
        assert_has_substring("Expected a 3D tensor for the 'boxes' input", "scores");
    }

    #[test]
    #[should_panic(expected = "but got Ok(5)")]
    fn test_assert_err_contains_ok() {
        assert_err_contains(Ok::<_, String>(5), "rank");
    }
}
