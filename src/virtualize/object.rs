//! Virtual stand-ins for allocations that never escape.

use std::fmt;

use crate::stamp::{ClassId, ObjectStamp};

/// Identifier of a virtual object within one virtualization run.
///
/// Scoped to a single pass execution; virtual objects never outlive the
/// run that created them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualObjectId(usize);

impl VirtualObjectId {
    /// Creates an identifier from a per-run index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the per-run index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for VirtualObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for VirtualObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A not-yet-materialized allocation.
///
/// Carries everything the facts of the eliminated allocation carried: the
/// instantiated class, and a stamp that is exact and non-null since the
/// allocation definitely produced a fresh instance of exactly that class.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualObject {
    class: ClassId,
    stamp: ObjectStamp,
}

impl VirtualObject {
    /// Creates the virtual stand-in for an allocation of `class`.
    #[must_use]
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            stamp: ObjectStamp::exact_non_null(class),
        }
    }

    /// Returns the instantiated class.
    #[must_use]
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Returns the exact, non-null fact the allocation proved.
    #[must_use]
    pub fn stamp(&self) -> &ObjectStamp {
        &self.stamp
    }
}
