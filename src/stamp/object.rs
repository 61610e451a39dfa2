//! Reference-type stamps: declared class, exactness, and nullability facts.
//!
//! An [`ObjectStamp`] describes the set of runtime values a reference-typed
//! node may produce. The stamps form a lattice ordered by precision:
//!
//! - [`ObjectStamp::join`] (intersection) combines two facts about the same
//!   value into the most precise consistent fact; contradictory facts yield
//!   the canonical [`ObjectStamp::empty`] stamp (no value possible).
//! - [`ObjectStamp::meet`] (union) computes the least precise fact covering
//!   both inputs; used where control-flow paths merge.
//!
//! # Normalized representation
//!
//! Stamps are kept normalized so that lattice equality is plain structural
//! equality (`join(a, a) == a` must hold bit for bit, which synonym
//! detection relies on):
//!
//! - `non_null && always_null` is the contradiction and is always
//!   represented as the single canonical empty stamp.
//! - An `always_null` stamp carries no class constraint: the only value is
//!   `null`, which every class admits.
//! - A stamp without a class constraint is never exact.
//!
//! All constructors and lattice operations produce normalized stamps.

use std::fmt;

use crate::stamp::{ClassId, TypeHierarchy};

/// A type fact about one reference-typed value.
///
/// See the [module documentation](self) for the lattice semantics and the
/// normalization invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectStamp {
    /// Declared class constraint; `None` means any class.
    class: Option<ClassId>,
    /// The runtime class is exactly `class`, never a subclass.
    exact: bool,
    /// The value is never `null`.
    non_null: bool,
    /// The value is always `null`.
    always_null: bool,
}

impl ObjectStamp {
    /// The most general reference fact: any class, any nullness.
    #[must_use]
    pub const fn any_object() -> Self {
        Self {
            class: None,
            exact: false,
            non_null: false,
            always_null: false,
        }
    }

    /// The canonical empty fact: no runtime value is possible.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            class: None,
            exact: false,
            non_null: true,
            always_null: true,
        }
    }

    /// A possibly-null instance of `class` or any of its subclasses.
    #[must_use]
    pub const fn of_class(class: ClassId) -> Self {
        Self {
            class: Some(class),
            exact: false,
            non_null: false,
            always_null: false,
        }
    }

    /// A non-null instance of `class` or any of its subclasses.
    #[must_use]
    pub const fn non_null_of(class: ClassId) -> Self {
        Self {
            class: Some(class),
            exact: false,
            non_null: true,
            always_null: false,
        }
    }

    /// A possibly-null instance of exactly `class`.
    #[must_use]
    pub const fn exact_of(class: ClassId) -> Self {
        Self {
            class: Some(class),
            exact: true,
            non_null: false,
            always_null: false,
        }
    }

    /// A non-null instance of exactly `class`.
    ///
    /// This is the stamp of a fresh allocation, and the shape of a checked
    /// stamp in an exact type test.
    #[must_use]
    pub const fn exact_non_null(class: ClassId) -> Self {
        Self {
            class: Some(class),
            exact: true,
            non_null: true,
            always_null: false,
        }
    }

    /// The fact describing the `null` constant.
    #[must_use]
    pub const fn always_null() -> Self {
        Self {
            class: None,
            exact: false,
            non_null: false,
            always_null: true,
        }
    }

    /// Builds a normalized stamp from raw components.
    fn normalized(
        class: Option<ClassId>,
        exact: bool,
        non_null: bool,
        always_null: bool,
    ) -> Self {
        if non_null && always_null {
            return Self::empty();
        }
        if always_null {
            return Self::always_null();
        }
        Self {
            class,
            exact: exact && class.is_some(),
            non_null,
            always_null: false,
        }
    }

    /// Returns the declared class constraint, if any.
    #[must_use]
    pub const fn class(&self) -> Option<ClassId> {
        self.class
    }

    /// Returns `true` if the runtime class is known exactly.
    #[must_use]
    pub const fn is_exact(&self) -> bool {
        self.exact
    }

    /// Returns `true` if the value can never be `null`.
    #[must_use]
    pub const fn non_null(&self) -> bool {
        self.non_null
    }

    /// Returns `true` if the value is always `null`.
    #[must_use]
    pub const fn is_always_null(&self) -> bool {
        self.always_null
    }

    /// Returns `true` if this fact denotes an unreachable value.
    ///
    /// The empty stamp is an expected degenerate lattice element, not an
    /// error; callers fall back to keeping the original node.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.non_null && self.always_null
    }

    /// Computes the most precise fact consistent with both inputs.
    ///
    /// Both stamps must describe the *same* abstract value. Returns the
    /// canonical empty stamp when the facts contradict each other.
    #[must_use]
    pub fn join(&self, other: &Self, types: &TypeHierarchy) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::empty();
        }

        let non_null = self.non_null || other.non_null;
        let always_null = self.always_null || other.always_null;
        if non_null && always_null {
            return Self::empty();
        }
        if always_null {
            // The value is null; class constraints are vacuous.
            return Self::always_null();
        }

        let class_and_exact = match (self.class, other.class) {
            (None, None) => Some((None, false)),
            (Some(x), None) => Some((Some(x), self.exact)),
            (None, Some(y)) => Some((Some(y), other.exact)),
            (Some(x), Some(y)) => {
                if x == y {
                    Some((Some(x), self.exact || other.exact))
                } else if types.is_subtype(x, y) && !other.exact {
                    Some((Some(x), self.exact))
                } else if types.is_subtype(y, x) && !self.exact {
                    Some((Some(y), other.exact))
                } else {
                    None
                }
            }
        };

        match class_and_exact {
            Some((class, exact)) => Self::normalized(class, exact, non_null, false),
            // No non-null value satisfies both class constraints; null is
            // the only candidate left.
            None if non_null => Self::empty(),
            None => Self::always_null(),
        }
    }

    /// Computes the least precise fact covering both inputs.
    ///
    /// Both stamps must describe values merging into the same abstract
    /// value. Meeting with the empty stamp returns the other side.
    #[must_use]
    pub fn meet(&self, other: &Self, types: &TypeHierarchy) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let non_null = self.non_null && other.non_null;
        let always_null = self.always_null && other.always_null;

        let (class, exact) = if self.always_null {
            // This side contributes only null; the class bound comes from
            // the other side.
            (other.class, other.exact)
        } else if other.always_null {
            (self.class, self.exact)
        } else {
            match (self.class, other.class) {
                (Some(x), Some(y)) if x == y => (Some(x), self.exact && other.exact),
                (Some(x), Some(y)) => (types.least_common_ancestor(x, y), false),
                _ => (None, false),
            }
        };

        Self::normalized(class, exact, non_null, always_null)
    }
}

impl fmt::Display for ObjectStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "a# empty");
        }
        write!(f, "a")?;
        if self.exact {
            write!(f, "!")?;
        }
        if self.non_null {
            write!(f, "+")?;
        }
        if self.always_null {
            write!(f, " null")?;
        }
        if let Some(class) = self.class {
            write!(f, " {class}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (TypeHierarchy, ClassId, ClassId, ClassId, ClassId) {
        let mut types = TypeHierarchy::new();
        let object = types.define_class("Object", None).unwrap();
        let number = types.define_class("Number", Some(object)).unwrap();
        let integer = types.define_class("Integer", Some(number)).unwrap();
        let string = types.define_class("String", Some(object)).unwrap();
        (types, object, number, integer, string)
    }

    #[test]
    fn test_join_with_any_is_identity() {
        let (types, _, number, ..) = sample();
        let a = ObjectStamp::non_null_of(number);
        assert_eq!(a.join(&ObjectStamp::any_object(), &types), a);
        assert_eq!(ObjectStamp::any_object().join(&a, &types), a);
    }

    #[test]
    fn test_join_idempotent() {
        let (types, _, number, integer, _) = sample();
        for stamp in [
            ObjectStamp::any_object(),
            ObjectStamp::of_class(number),
            ObjectStamp::exact_non_null(integer),
            ObjectStamp::always_null(),
            ObjectStamp::empty(),
        ] {
            assert_eq!(stamp.join(&stamp, &types), stamp);
            assert_eq!(stamp.meet(&stamp, &types), stamp);
        }
    }

    #[test]
    fn test_join_narrows_to_subclass() {
        let (types, _, number, integer, _) = sample();
        let joined = ObjectStamp::of_class(number).join(&ObjectStamp::of_class(integer), &types);
        assert_eq!(joined, ObjectStamp::of_class(integer));
    }

    #[test]
    fn test_join_unrelated_classes() {
        let (types, _, number, _, string) = sample();
        // Both possibly null: the only shared value is null.
        let nullable =
            ObjectStamp::of_class(number).join(&ObjectStamp::of_class(string), &types);
        assert_eq!(nullable, ObjectStamp::always_null());

        // One side non-null: nothing is left.
        let none =
            ObjectStamp::non_null_of(number).join(&ObjectStamp::of_class(string), &types);
        assert!(none.is_empty());
    }

    #[test]
    fn test_join_exact_supertype_contradicts_subclass() {
        let (types, _, number, integer, _) = sample();
        let exact_number = ObjectStamp::exact_non_null(number);
        let integer_value = ObjectStamp::non_null_of(integer);
        assert!(exact_number.join(&integer_value, &types).is_empty());
    }

    #[test]
    fn test_join_nullness_contradiction() {
        let (types, object, ..) = sample();
        let joined = ObjectStamp::non_null_of(object).join(&ObjectStamp::always_null(), &types);
        assert!(joined.is_empty());
        assert_eq!(joined, ObjectStamp::empty());
    }

    #[test]
    fn test_meet_widens_to_common_ancestor() {
        let (types, object, _, integer, string) = sample();
        let met = ObjectStamp::non_null_of(integer).meet(&ObjectStamp::non_null_of(string), &types);
        assert_eq!(met, ObjectStamp::non_null_of(object));
    }

    #[test]
    fn test_meet_with_null_keeps_class_drops_non_null() {
        let (types, _, number, ..) = sample();
        let met = ObjectStamp::non_null_of(number).meet(&ObjectStamp::always_null(), &types);
        assert_eq!(met, ObjectStamp::of_class(number));
    }

    #[test]
    fn test_meet_with_empty_is_identity() {
        let (types, _, number, ..) = sample();
        let a = ObjectStamp::exact_non_null(number);
        assert_eq!(a.meet(&ObjectStamp::empty(), &types), a);
        assert_eq!(ObjectStamp::empty().meet(&a, &types), a);
    }

    #[test]
    fn test_absorption() {
        let (types, _, number, integer, string) = sample();
        let stamps = [
            ObjectStamp::any_object(),
            ObjectStamp::of_class(number),
            ObjectStamp::non_null_of(integer),
            ObjectStamp::exact_non_null(string),
            ObjectStamp::always_null(),
            ObjectStamp::empty(),
        ];
        for a in &stamps {
            for b in &stamps {
                let met = a.meet(b, &types);
                assert_eq!(a.join(&met, &types), *a, "join({a}, meet({a}, {b}))");
            }
        }
    }

    #[test]
    fn test_normalization_drops_class_on_always_null() {
        let (types, _, number, _, string) = sample();
        let joined = ObjectStamp::of_class(number).join(&ObjectStamp::of_class(string), &types);
        assert_eq!(joined.class(), None);
        assert!(!joined.is_exact());
    }
}
