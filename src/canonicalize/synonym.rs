//! Stamp-driven folding of runtime type tests.
//!
//! A type test compares the fact it checks for against the fact already
//! proven for its input. Joining the two answers "can the test ever
//! succeed?", meeting them answers "does it always succeed?"; the two
//! questions together decide the test at compile time or reduce it to a
//! cheaper null test.

use crate::stamp::{ObjectStamp, TriState, TypeHierarchy};

/// Outcome of [`find_synonym`]: the simpler form a type test reduces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Synonym {
    /// The facts contradict; the test is always `false`.
    AlwaysFalse,
    /// The input fact already implies the checked fact; always `true`.
    AlwaysTrue,
    /// Class and exactness already agree and only nullness is open: the
    /// test is equivalent to `!is_null(input)`.
    NonNullTest,
    /// The test must stay; the facts leave it genuinely open.
    Undecided,
}

/// Decides whether a type test against `checked` is redundant for a value
/// whose proven fact is `input`.
///
/// The checks run in a fixed order from strongest to weakest reduction:
/// contradiction first, tautology second, the null-only reduction third.
#[must_use]
pub fn find_synonym(checked: &ObjectStamp, input: &ObjectStamp, types: &TypeHierarchy) -> Synonym {
    let joined = checked.join(input, types);
    if joined.is_empty() {
        // No value satisfies both facts at once.
        return Synonym::AlwaysFalse;
    }

    let met = checked.meet(input, types);
    if met == *checked {
        // The union collapses into the checked fact, so every value the
        // input can produce already passes the test.
        return Synonym::AlwaysTrue;
    }

    if checked.class() == met.class()
        && checked.is_exact() == met.is_exact()
        && checked.is_always_null() == met.is_always_null()
    {
        // Everything but nullness agrees, so nullness must be the open bit.
        debug_assert_ne!(
            checked.non_null(),
            input.non_null(),
            "null-only reduction with matching nullness"
        );
        return Synonym::NonNullTest;
    }

    Synonym::Undecided
}

/// Decides a type test outright, without the null-test reduction.
///
/// Used where only a definite answer is actionable, such as testing a
/// value that aliases a virtualized allocation.
#[must_use]
pub fn try_fold(checked: &ObjectStamp, input: &ObjectStamp, types: &TypeHierarchy) -> TriState {
    if checked.join(input, types).is_empty() {
        return TriState::False;
    }
    if checked.meet(input, types) == *checked {
        return TriState::True;
    }
    TriState::Unknown
}
