//! Node identity, placement, and edge storage.
//!
//! Nodes are stored in an arena owned by their [`Graph`] and referenced by
//! plain [`NodeId`] indices; edges are id references in both directions
//! (inputs and usages), never owning pointers, so cyclic def/use relations
//! need no reference counting and edge mutation stays O(1).
//!
//! A node's identity is stable across rewrites that only change its fields;
//! replacement yields a different identifier.
//!
//! [`Graph`]: crate::ir::Graph

use std::fmt;

use crate::ir::{KindFlags, NodeKind};
use crate::stamp::Stamp;

/// Unique identifier for a node within its owning graph.
///
/// A lightweight handle into the node arena. Identifiers of deleted nodes
/// are never reused within one graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a node identifier from an arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Where a node sits relative to the control sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Ordered in the control sequence between `prev` and `next`.
    ///
    /// A freshly added fixed node is unlinked (`prev` and `next` both
    /// `None`) until it is spliced in; only the start node stays linked
    /// with no predecessor.
    Fixed {
        /// Control predecessor.
        prev: Option<NodeId>,
        /// Control successor.
        next: Option<NodeId>,
    },
    /// No position; scheduled later from data dependencies alone.
    Floating,
}

/// One node of the graph: kind, output fact, and its edges.
///
/// Usage back-edges are maintained exclusively by the owning graph's
/// mutation operations — every input edge has exactly one matching usage
/// entry on the input's side, and the two are created and removed as a
/// pair.
#[derive(Debug, Clone)]
pub struct Node {
    /// The node's kind and kind-specific data.
    kind: NodeKind,
    /// Fact describing the values this node may produce.
    stamp: Stamp,
    /// Ordered data inputs.
    inputs: Vec<NodeId>,
    /// Back-references: one entry per input edge pointing at this node.
    usages: Vec<NodeId>,
    /// Fixed or floating placement.
    placement: Placement,
}

impl Node {
    /// Creates a node ready for [`Graph::add`].
    ///
    /// Placement is derived from the kind: fixed kinds start unlinked,
    /// all others float.
    ///
    /// [`Graph::add`]: crate::ir::Graph::add
    #[must_use]
    pub fn new(kind: NodeKind, stamp: Stamp, inputs: Vec<NodeId>) -> Self {
        if let Some(arity) = kind.input_arity() {
            debug_assert_eq!(
                inputs.len(),
                arity,
                "{} expects {arity} inputs",
                kind.name()
            );
        }
        let placement = if kind.is_fixed() {
            Placement::Fixed {
                prev: None,
                next: None,
            }
        } else {
            Placement::Floating
        };
        Self {
            kind,
            stamp,
            inputs,
            usages: Vec::new(),
            placement,
        }
    }

    /// Returns the node's kind.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the fact describing this node's output.
    #[must_use]
    pub fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    /// Returns the ordered data inputs.
    #[must_use]
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Returns the usage back-edges (one entry per referencing input edge).
    #[must_use]
    pub fn usages(&self) -> &[NodeId] {
        &self.usages
    }

    /// Returns the number of input edges referencing this node.
    #[must_use]
    pub fn usage_count(&self) -> usize {
        self.usages.len()
    }

    /// Returns `true` if no input edge references this node.
    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.usages.is_empty()
    }

    /// Returns the placement of this node.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Returns `true` if the node sits in the control sequence.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self.placement, Placement::Fixed { .. })
    }

    /// Returns `true` if the node floats.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self.placement, Placement::Floating)
    }

    /// Returns the control successor of a fixed node.
    #[must_use]
    pub fn next(&self) -> Option<NodeId> {
        match self.placement {
            Placement::Fixed { next, .. } => next,
            Placement::Floating => None,
        }
    }

    /// Returns the control predecessor of a fixed node.
    #[must_use]
    pub fn prev(&self) -> Option<NodeId> {
        match self.placement {
            Placement::Fixed { prev, .. } => prev,
            Placement::Floating => None,
        }
    }

    /// Returns `true` if the kind carries the given capability flag.
    #[must_use]
    pub fn has_flag(&self, flag: KindFlags) -> bool {
        self.kind.flags().contains(flag)
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.inputs
    }

    pub(crate) fn usages_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.usages
    }

    pub(crate) fn set_links(&mut self, new_prev: Option<NodeId>, new_next: Option<NodeId>) {
        match &mut self.placement {
            Placement::Fixed { prev, next } => {
                *prev = new_prev;
                *next = new_next;
            }
            Placement::Floating => unreachable!("floating nodes have no control links"),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if !self.inputs.is_empty() {
            write!(f, "(")?;
            for (i, input) in self.inputs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{input}")?;
            }
            write!(f, ")")?;
        }
        write!(f, ": {}", self.stamp)
    }
}
