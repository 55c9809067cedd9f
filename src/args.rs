//! Argument generators.
//!
//! Commands describe their arguments as proptest strategies producing
//! [`Value`]s. Each argument keeps its own shrink tree; the argument list
//! itself has fixed arity, so shrinking may simplify individual values but
//! never drops or reorders arguments.

use std::ops::RangeInclusive;

use proptest::prelude::*;
use proptest::sample::select;

use crate::symbolic::SymVar;
use crate::value::Value;

/// A generator for one command argument.
pub type ArgGen = BoxedStrategy<Value>;

/// Integers from `range`, shrinking toward the lower bound.
#[must_use]
pub fn int(range: RangeInclusive<i64>) -> ArgGen {
    range.prop_map(Value::Int).boxed()
}

/// Booleans, shrinking toward `false`.
#[must_use]
pub fn boolean() -> ArgGen {
    any::<bool>().prop_map(Value::Bool).boxed()
}

/// Always `value`.
#[must_use]
pub fn constant(value: impl Into<Value>) -> ArgGen {
    Just(value.into()).boxed()
}

/// One of `values`, shrinking toward the first.
///
/// An empty list yields [`Value::Null`].
#[must_use]
pub fn one_of(values: Vec<Value>) -> ArgGen {
    if values.is_empty() {
        return constant(Value::Null);
    }
    select(values).boxed()
}

/// Strings of `len` characters drawn from `alphabet`.
#[must_use]
pub fn text(alphabet: &str, len: RangeInclusive<usize>) -> ArgGen {
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() {
        return constant("");
    }
    proptest::collection::vec(select(chars), len)
        .prop_map(|cs| Value::String(cs.into_iter().collect()))
        .boxed()
}

/// Lists of `len` elements drawn from `element`.
#[must_use]
pub fn list(element: ArgGen, len: RangeInclusive<usize>) -> ArgGen {
    proptest::collection::vec(element, len)
        .prop_map(Value::List)
        .boxed()
}

/// One of the symbolic variables in `vars`.
///
/// Used to pass an earlier call's result to a later call. An empty list
/// yields [`Value::Null`]; guard such commands with a precondition.
#[must_use]
pub fn var_of(vars: &[SymVar]) -> ArgGen {
    one_of(vars.iter().copied().map(Value::Var).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    fn sample(arg: &ArgGen) -> Value {
        let mut runner = TestRunner::deterministic();
        arg.new_tree(&mut runner).unwrap().current()
    }

    #[test]
    fn int_stays_in_range() {
        let strategy = int(3..=5);
        let mut runner = TestRunner::deterministic();
        for _ in 0..50 {
            let v = strategy.new_tree(&mut runner).unwrap().current();
            let n = v.as_int().unwrap();
            assert!((3..=5).contains(&n));
        }
    }

    #[test]
    fn int_shrinks_toward_lower_bound() {
        let strategy = int(10..=1000);
        let mut runner = TestRunner::deterministic();
        let mut tree = strategy.new_tree(&mut runner).unwrap();
        while tree.simplify() {}
        assert_eq!(tree.current(), Value::Int(10));
    }

    #[test]
    fn constant_and_empty_choices() {
        assert_eq!(sample(&constant(7)), Value::Int(7));
        assert_eq!(sample(&one_of(vec![])), Value::Null);
        assert_eq!(sample(&var_of(&[])), Value::Null);
        assert_eq!(sample(&text("", 0..=3)), Value::String(String::new()));
    }

    #[test]
    fn var_of_picks_given_vars() {
        let vars = [SymVar::new(1), SymVar::new(4)];
        let v = sample(&var_of(&vars));
        assert!(vars.contains(&v.as_var().unwrap()));
    }

    #[test]
    fn text_and_list_respect_lengths() {
        let s = sample(&text("ab", 2..=2));
        assert_eq!(s.as_string().map(str::len), Some(2));

        let l = sample(&list(int(0..=1), 3..=3));
        assert_eq!(l.as_list().map(<[Value]>::len), Some(3));
    }
}
