//! Per-node output facts covering every value kind a node can produce.
//!
//! [`Stamp`] wraps the reference-type lattice ([`ObjectStamp`]) together
//! with the scalar kinds the graph needs (logic values, machine integers,
//! and the absence of a value for control-only nodes). Scalar kinds carry
//! no refinement of their own, so joining or meeting two matching scalar
//! stamps is the identity.
//!
//! Joining stamps of different kinds compares facts about values that can
//! never be the same abstract value; that is a corrupted graph and panics
//! immediately rather than returning a recoverable error.

use std::fmt;

use crate::stamp::{ObjectStamp, TypeHierarchy};

/// A type fact describing the possible outputs of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stamp {
    /// The node produces no value (pure control effect).
    Void,
    /// A logic (boolean) value.
    Boolean,
    /// A machine integer value.
    Integer,
    /// A reference value described by an [`ObjectStamp`].
    Object(ObjectStamp),
}

impl Stamp {
    /// Returns the reference fact, if this is an object stamp.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectStamp> {
        match self {
            Self::Object(stamp) => Some(stamp),
            _ => None,
        }
    }

    /// Returns the reference fact, panicking on any other kind.
    ///
    /// # Panics
    ///
    /// Panics if the stamp is not an object stamp; using a scalar stamp
    /// where a reference fact is required indicates a corrupted graph.
    #[must_use]
    pub fn expect_object(&self) -> &ObjectStamp {
        self.as_object()
            .unwrap_or_else(|| panic!("expected an object stamp, found {self:?}"))
    }

    /// Returns `true` if this fact denotes an unreachable value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        match self {
            Self::Object(stamp) => stamp.is_empty(),
            _ => false,
        }
    }

    /// Computes the most precise fact consistent with both inputs.
    ///
    /// # Panics
    ///
    /// Panics when the stamps are of different kinds (ill-typed lattice
    /// comparison).
    #[must_use]
    pub fn join(&self, other: &Self, types: &TypeHierarchy) -> Self {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => Self::Object(a.join(b, types)),
            (a, b) if a == b => *a,
            (a, b) => panic!("ill-typed stamp join: {a:?} with {b:?}"),
        }
    }

    /// Computes the least precise fact covering both inputs.
    ///
    /// # Panics
    ///
    /// Panics when the stamps are of different kinds (ill-typed lattice
    /// comparison).
    #[must_use]
    pub fn meet(&self, other: &Self, types: &TypeHierarchy) -> Self {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => Self::Object(a.meet(b, types)),
            (a, b) if a == b => *a,
            (a, b) => panic!("ill-typed stamp meet: {a:?} with {b:?}"),
        }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Boolean => write!(f, "i1"),
            Self::Integer => write!(f, "i64"),
            Self::Object(stamp) => write!(f, "{stamp}"),
        }
    }
}

/// Outcome of a query that may be statically undecidable.
///
/// `Unknown` is an expected degenerate result, not an error: callers keep
/// the original node when a fold cannot be decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    /// The property definitely holds.
    True,
    /// The property definitely does not hold.
    False,
    /// Undecidable with the available facts.
    Unknown,
}

impl TriState {
    /// Lifts a known boolean into a tri-state.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }

    /// Returns the boolean answer, or `None` when undecided.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Unknown => None,
        }
    }

    /// Returns `true` unless the state is [`TriState::Unknown`].
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_join_is_identity() {
        let types = TypeHierarchy::new();
        assert_eq!(Stamp::Boolean.join(&Stamp::Boolean, &types), Stamp::Boolean);
        assert_eq!(Stamp::Integer.meet(&Stamp::Integer, &types), Stamp::Integer);
        assert_eq!(Stamp::Void.join(&Stamp::Void, &types), Stamp::Void);
    }

    #[test]
    #[should_panic(expected = "ill-typed stamp join")]
    fn test_mismatched_join_panics() {
        let types = TypeHierarchy::new();
        let _ = Stamp::Boolean.join(&Stamp::Integer, &types);
    }

    #[test]
    fn test_object_join_delegates() {
        let mut types = TypeHierarchy::new();
        let object = types.define_class("Object", None).unwrap();
        let a = Stamp::Object(ObjectStamp::of_class(object));
        let b = Stamp::Object(ObjectStamp::non_null_of(object));
        assert_eq!(
            a.join(&b, &types),
            Stamp::Object(ObjectStamp::non_null_of(object))
        );
        assert!(!a.is_empty());
    }

    #[test]
    fn test_tristate() {
        assert_eq!(TriState::from_bool(true), TriState::True);
        assert_eq!(TriState::False.as_bool(), Some(false));
        assert_eq!(TriState::Unknown.as_bool(), None);
        assert!(TriState::True.is_known());
        assert!(!TriState::Unknown.is_known());
    }
}
