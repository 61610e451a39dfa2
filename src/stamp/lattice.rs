//! Lattice traits for type-fact reasoning.
//!
//! A lattice is a mathematical structure that defines how abstract facts
//! about a value combine. This module provides the traits the stamp domain
//! implements; the property-based test suite checks the laws against them.
//!
//! # Lattice Theory Background
//!
//! - **Partial Order**: facts are ordered by precision
//! - **Join (∧ of value sets)**: most precise fact consistent with both
//! - **Meet (∨ of value sets)**: least precise fact covering both
//! - **Unrestricted (⊤)**: no information
//! - **Empty (⊥)**: contradiction, no value possible
//!
//! # Context
//!
//! Unlike purely structural domains, stamp comparisons need the class
//! hierarchy to decide subtype relations. Each trait therefore carries an
//! associated `Context` type threaded into every operation; for stamps this
//! is [`TypeHierarchy`].

use std::fmt::Debug;

use crate::stamp::{ObjectStamp, Stamp, TypeHierarchy};

/// A meet semi-lattice with a meet (coverage/union) operation.
///
/// The meet combines facts from control-flow paths that merge. It must
/// satisfy:
///
/// - **Idempotent**: `x.meet(x) = x`
/// - **Commutative**: `x.meet(y) = y.meet(x)`
/// - **Associative**: `x.meet(y.meet(z)) = (x.meet(y)).meet(z)`
pub trait MeetSemiLattice: Clone + Debug + PartialEq {
    /// Auxiliary data consulted by the operation (e.g. a class hierarchy).
    type Context: ?Sized;

    /// Computes the least precise fact covering both inputs.
    #[must_use]
    fn meet(&self, other: &Self, cx: &Self::Context) -> Self;
}

/// A join semi-lattice with a join (intersection) operation.
///
/// The join narrows two facts about the same value. It must satisfy the
/// same idempotence, commutativity, and associativity laws as the meet,
/// plus absorption with it: `join(a, meet(a, b)) = a`.
pub trait JoinSemiLattice: Clone + Debug + PartialEq {
    /// Auxiliary data consulted by the operation (e.g. a class hierarchy).
    type Context: ?Sized;

    /// Computes the most precise fact consistent with both inputs.
    #[must_use]
    fn join(&self, other: &Self, cx: &Self::Context) -> Self;

    /// Returns `true` if this is the contradiction element.
    ///
    /// Joins of inconsistent facts produce it; it denotes an unreachable
    /// value, not an error.
    fn is_empty(&self) -> bool;
}

/// A complete lattice with both operations and a greatest element.
pub trait Lattice:
    MeetSemiLattice + JoinSemiLattice<Context = <Self as MeetSemiLattice>::Context>
{
    /// Returns the most general element: total lack of information.
    ///
    /// It is the identity for join: `join(x, unrestricted()) = x`.
    #[must_use]
    fn unrestricted() -> Self;
}

impl MeetSemiLattice for ObjectStamp {
    type Context = TypeHierarchy;

    fn meet(&self, other: &Self, cx: &TypeHierarchy) -> Self {
        ObjectStamp::meet(self, other, cx)
    }
}

impl JoinSemiLattice for ObjectStamp {
    type Context = TypeHierarchy;

    fn join(&self, other: &Self, cx: &TypeHierarchy) -> Self {
        ObjectStamp::join(self, other, cx)
    }

    fn is_empty(&self) -> bool {
        ObjectStamp::is_empty(self)
    }
}

impl Lattice for ObjectStamp {
    fn unrestricted() -> Self {
        ObjectStamp::any_object()
    }
}

impl MeetSemiLattice for Stamp {
    type Context = TypeHierarchy;

    fn meet(&self, other: &Self, cx: &TypeHierarchy) -> Self {
        Stamp::meet(self, other, cx)
    }
}

impl JoinSemiLattice for Stamp {
    type Context = TypeHierarchy;

    fn join(&self, other: &Self, cx: &TypeHierarchy) -> Self {
        Stamp::join(self, other, cx)
    }

    fn is_empty(&self) -> bool {
        Stamp::is_empty(self)
    }
}
