//! Graph-based intermediate representation.
//!
//! The IR is a mutable graph of typed nodes: fixed nodes are threaded on a
//! linear control sequence, floating nodes hang off data edges alone and
//! get a position only at scheduling time. Rewrites operate directly on the
//! graph through the sanctioned mutations in [`Graph`].
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use seagraph::ir::{ConstValue, Graph, Node, NodeKind};
//! use seagraph::stamp::{Stamp, TypeHierarchy};
//!
//! let mut graph = Graph::new(Arc::new(TypeHierarchy::new()));
//! let zero = graph.constant(ConstValue::Int(0));
//! graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![zero]));
//! assert_eq!(graph.node_count(), 3);
//! ```

mod graph;
mod kind;
mod node;

pub use graph::{FixedOrder, Graph};
pub use kind::{ConstValue, KindFlags, NodeKind};
pub use node::{Node, NodeId, Placement};
