//! Convenient re-exports of the most commonly used types.
//!
//! Import this module to get quick access to the essentials for building
//! graphs and running the optimization pipeline.
//!
//! ```rust
//! use seagraph::prelude::*;
//! ```

/// The main error type for all operations
pub use crate::Error;

/// The result type used throughout the library
pub use crate::Result;

/// Graph construction and mutation
pub use crate::ir::{ConstValue, Graph, Node, NodeId, NodeKind};

/// The fact lattice
pub use crate::stamp::{ClassId, ObjectStamp, Stamp, TriState, TypeHierarchy};

/// Running passes
pub use crate::pipeline::{EventKind, EventLog, GraphPass, Optimizer};

/// The individual passes
pub use crate::canonicalize::Canonicalizer;
pub use crate::virtualize::Virtualizer;

/// Host-side foreign call registration
pub use crate::calls::{ForeignCallDescriptor, ForeignCallId, ForeignCallRegistry};
