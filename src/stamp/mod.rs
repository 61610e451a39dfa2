//! Type-fact lattice for graph nodes.
//!
//! Every node in the graph carries a [`Stamp`] describing the values it may
//! produce. Reference values are described by [`ObjectStamp`]s over a
//! [`TypeHierarchy`]; the stamps form a lattice whose [`join`] (narrowing)
//! and [`meet`] (widening) operations drive canonicalization and
//! virtualization decisions.
//!
//! The module is organized into focused sub-modules:
//!
//! - [`hierarchy`](self) - class arena with subtype and ancestor queries
//! - [`object`](self) - reference-type stamps and the lattice operations
//! - [`value`](self) - the per-node [`Stamp`] wrapper and [`TriState`]
//! - [`lattice`](self) - the semilattice traits the property tests check
//!
//! [`join`]: ObjectStamp::join
//! [`meet`]: ObjectStamp::meet

mod hierarchy;
mod lattice;
mod object;
mod value;

pub use hierarchy::{ClassId, TypeHierarchy};
pub use lattice::{JoinSemiLattice, Lattice, MeetSemiLattice};
pub use object::ObjectStamp;
pub use value::{Stamp, TriState};
