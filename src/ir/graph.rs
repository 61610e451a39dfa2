//! The node graph and its sanctioned mutation operations.
//!
//! A [`Graph`] owns every node of one compilation unit in an arena indexed
//! by [`NodeId`]. All structural changes go through the mutation operations
//! defined here ([`Graph::add`], [`Graph::replace_and_delete`],
//! [`Graph::remove_fixed`], [`Graph::add_before_fixed`] and the floating
//! counterparts); they maintain the central edge invariant:
//!
//! > Every usage entry has exactly one matching input edge in the
//! > referencing node, and vice versa. Edges are created and removed as
//! > pairs and never dangle.
//!
//! Violating a mutation precondition (for example removing a fixed node
//! that still has usages) is a programming error in the calling pass and
//! fails with an immediate assertion, never a recoverable error.
//!
//! Fixed nodes form a single linear control sequence anchored at the start
//! node; floating nodes have no position until scheduling.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ir::{ConstValue, Node, NodeId, NodeKind};
use crate::stamp::{Stamp, TypeHierarchy};

/// A mutable graph of typed value/control nodes.
///
/// The graph exclusively owns its nodes; a node never outlives its graph,
/// and identifiers of deleted nodes are tombstoned, never reused.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use seagraph::ir::{ConstValue, Graph, Node, NodeKind};
/// use seagraph::stamp::{Stamp, TypeHierarchy};
///
/// let types = Arc::new(TypeHierarchy::new());
/// let mut graph = Graph::new(types);
///
/// let value = graph.constant(ConstValue::Int(7));
/// let ret = graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![value]));
///
/// assert_eq!(graph.usages(value), [ret]);
/// graph.verify_edges();
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    /// Class hierarchy shared across all graphs of a compilation session.
    types: Arc<TypeHierarchy>,
    /// Node arena; deleted slots are tombstoned.
    nodes: Vec<Option<Node>>,
    /// Number of live nodes.
    live: usize,
    /// The designated entry node.
    start: NodeId,
    /// Current tail of the control sequence.
    tail: NodeId,
    /// Deduplication index for constants.
    constants: HashMap<ConstValue, NodeId>,
}

impl Graph {
    /// Creates a graph containing only its start node.
    #[must_use]
    pub fn new(types: Arc<TypeHierarchy>) -> Self {
        let mut graph = Self {
            types,
            nodes: Vec::new(),
            live: 0,
            start: NodeId::new(0),
            tail: NodeId::new(0),
            constants: HashMap::new(),
        };
        let start = graph.add(Node::new(NodeKind::Start, Stamp::Void, vec![]));
        graph.start = start;
        graph.tail = start;
        graph
    }

    /// Returns the class hierarchy this graph's stamps refer to.
    #[must_use]
    pub fn types(&self) -> &TypeHierarchy {
        &self.types
    }

    /// Returns the designated entry node.
    #[must_use]
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// Returns the current tail of the control sequence.
    #[must_use]
    pub fn last_fixed(&self) -> NodeId {
        self.tail
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Returns `true` if `id` refers to a live node of this graph.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.index())
            .is_some_and(|slot| slot.is_some())
    }

    /// Returns a node.
    ///
    /// # Panics
    ///
    /// Panics if the node was deleted or never existed; holding on to a
    /// stale identifier is a programming error.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("{id} was deleted or never existed"))
    }

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.node(id).kind()
    }

    /// Returns the output fact of a node.
    #[must_use]
    pub fn stamp(&self, id: NodeId) -> &Stamp {
        self.node(id).stamp()
    }

    /// Returns the ordered inputs of a node.
    #[must_use]
    pub fn inputs(&self, id: NodeId) -> &[NodeId] {
        self.node(id).inputs()
    }

    /// Returns the usage back-edges of a node.
    #[must_use]
    pub fn usages(&self, id: NodeId) -> &[NodeId] {
        self.node(id).usages()
    }

    /// Returns the number of input edges referencing a node.
    #[must_use]
    pub fn usage_count(&self, id: NodeId) -> usize {
        self.node(id).usage_count()
    }

    /// Returns an iterator over all live node identifiers.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| NodeId::new(index)))
    }

    /// Walks the control sequence from the start node.
    #[must_use]
    pub fn fixed_order(&self) -> FixedOrder<'_> {
        FixedOrder {
            graph: self,
            current: Some(self.start),
        }
    }

    /// Registers a newly constructed node and links its input edges.
    ///
    /// Constants are deduplicated: adding a constant that already exists
    /// returns the existing node instead.
    ///
    /// Fixed nodes enter the arena unlinked in control; place them with
    /// [`Graph::add_before_fixed`] or build them via
    /// [`Graph::append_fixed`].
    ///
    /// # Panics
    ///
    /// Panics if any declared input is not a live node of this graph.
    pub fn add(&mut self, node: Node) -> NodeId {
        if let NodeKind::Constant { value } = node.kind() {
            if let Some(&existing) = self.constants.get(value) {
                return existing;
            }
        }
        for &input in node.inputs() {
            assert!(
                self.contains(input),
                "input {input} is not a live node of this graph"
            );
        }

        let id = NodeId::new(self.nodes.len());
        if let NodeKind::Constant { value } = node.kind() {
            self.constants.insert(*value, id);
        }
        let inputs = node.inputs().to_vec();
        self.nodes.push(Some(node));
        self.live += 1;
        for input in inputs {
            self.node_mut(input).usages_mut().push(id);
        }
        id
    }

    /// Adds (or reuses) the constant node for `value`.
    pub fn constant(&mut self, value: ConstValue) -> NodeId {
        self.add(Node::new(
            NodeKind::Constant { value },
            value.stamp(),
            vec![],
        ))
    }

    /// Adds a fixed node and links it at the tail of the control sequence.
    ///
    /// # Panics
    ///
    /// Panics if the node's kind is not fixed.
    pub fn append_fixed(&mut self, node: Node) -> NodeId {
        assert!(
            node.is_fixed(),
            "append_fixed requires a fixed node, got {}",
            node.kind().name()
        );
        let id = self.add(node);
        let tail = self.tail;
        let tail_prev = self.node(tail).prev();
        self.node_mut(tail).set_links(tail_prev, Some(id));
        self.node_mut(id).set_links(Some(tail), None);
        self.tail = id;
        id
    }

    /// Splices an added fixed node immediately before `position`.
    ///
    /// Used to install side-effecting nodes (guards, profiling counters) at
    /// an exact control point.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not an unlinked fixed node, or if `position` is
    /// not a linked fixed node with a predecessor slot (the start node has
    /// none).
    pub fn add_before_fixed(&mut self, position: NodeId, node: NodeId) {
        assert_ne!(position, self.start, "cannot insert before the start node");
        let pos = self.node(position);
        assert!(
            pos.is_fixed() && pos.prev().is_some(),
            "{position} is not linked into the control sequence"
        );
        let new = self.node(node);
        assert!(
            new.is_fixed() && new.prev().is_none() && new.next().is_none() && node != self.start,
            "{node} must be an unlinked fixed node"
        );

        let prev = self.node(position).prev().expect("checked above");
        let prev_prev = self.node(prev).prev();
        self.node_mut(prev).set_links(prev_prev, Some(node));
        self.node_mut(node).set_links(Some(prev), Some(position));
        let pos_next = self.node(position).next();
        self.node_mut(position).set_links(Some(node), pos_next);
    }

    /// Redirects every usage of `old` to `new`, detaches `old`'s inputs,
    /// and removes `old` from the graph.
    ///
    /// If `old` is a linked fixed node it is spliced out of the control
    /// sequence, preserving the order of its neighbors.
    ///
    /// # Panics
    ///
    /// Panics if the nodes are not distinct live nodes, or if `new` uses
    /// `old` as an input (the redirect would create a self-edge).
    pub fn replace_and_delete(&mut self, old: NodeId, new: NodeId) {
        assert_ne!(old, new, "cannot replace a node with itself");
        assert!(self.contains(new), "{new} is not a live node of this graph");
        assert!(
            !self.node(new).inputs().contains(&old),
            "replacement {new} uses {old}; redirect would create a self-edge"
        );

        // One usage entry per edge: each entry rewires exactly one input
        // occurrence.
        let usages = std::mem::take(self.node_mut(old).usages_mut());
        for &user in &usages {
            let inputs = self.node_mut(user).inputs_mut();
            let position = inputs
                .iter()
                .position(|&input| input == old)
                .expect("usage entry without matching input edge");
            inputs[position] = new;
        }
        self.node_mut(new).usages_mut().extend(usages);

        self.detach_inputs(old);
        if self.node(old).is_fixed() && (self.node(old).prev().is_some() || old == self.start) {
            assert_ne!(old, self.start, "cannot delete the start node");
            self.splice_out(old);
        }
        self.delete(old);
    }

    /// Splices a fixed node out of the control sequence and removes it.
    ///
    /// Legal only when the node has no usages: its value output must
    /// already be fully substituted. The relative order of its predecessor
    /// and successor is preserved.
    ///
    /// # Panics
    ///
    /// Panics if the node still has usages, is not a linked fixed node, or
    /// is the start node. These are invariant violations in the calling
    /// pass, not runtime conditions.
    pub fn remove_fixed(&mut self, id: NodeId) {
        let node = self.node(id);
        assert!(node.is_fixed(), "remove_fixed on floating node {id}");
        assert!(
            node.is_unused(),
            "removing fixed node {id} that still has usages"
        );
        assert_ne!(id, self.start, "cannot remove the start node");
        assert!(
            node.prev().is_some(),
            "{id} is not linked into the control sequence"
        );

        self.detach_inputs(id);
        self.splice_out(id);
        self.delete(id);
    }

    /// Removes an unused floating node.
    ///
    /// The dead-code sweep uses this for floating nodes with no usages and
    /// no side effect.
    ///
    /// # Panics
    ///
    /// Panics if the node is fixed or still has usages.
    pub fn remove_floating(&mut self, id: NodeId) {
        let node = self.node(id);
        assert!(node.is_floating(), "remove_floating on fixed node {id}");
        assert!(
            node.is_unused(),
            "removing floating node {id} that still has usages"
        );

        self.detach_inputs(id);
        self.delete(id);
    }

    /// Exhaustively checks the edge and control-chain invariants.
    ///
    /// Test support: scans every live node and asserts that input and
    /// usage edges match one-to-one and that the control chain is a single
    /// linear sequence reaching every linked fixed node.
    ///
    /// # Panics
    ///
    /// Panics on the first violated invariant.
    pub fn verify_edges(&self) {
        for id in self.node_ids() {
            let node = self.node(id);
            for &input in node.inputs() {
                let forward = node.inputs().iter().filter(|&&i| i == input).count();
                let back = self
                    .node(input)
                    .usages()
                    .iter()
                    .filter(|&&u| u == id)
                    .count();
                assert_eq!(
                    forward, back,
                    "edge multiplicity mismatch between {id} and its input {input}"
                );
            }
            for &user in node.usages() {
                assert!(
                    self.contains(user) && self.node(user).inputs().contains(&id),
                    "stale usage entry {user} on {id}"
                );
            }
        }

        let mut reachable = 0usize;
        let mut prev = None;
        let mut current = Some(self.start);
        while let Some(id) = current {
            let node = self.node(id);
            assert!(node.is_fixed(), "floating node {id} in the control chain");
            assert_eq!(node.prev(), prev, "broken predecessor link at {id}");
            reachable += 1;
            assert!(reachable <= self.live, "control chain contains a cycle");
            prev = Some(id);
            current = node.next();
        }
        assert_eq!(prev, Some(self.tail), "stale control tail");

        let linked = self
            .node_ids()
            .filter(|&id| {
                let node = self.node(id);
                node.is_fixed() && (id == self.start || node.prev().is_some())
            })
            .count();
        assert_eq!(linked, reachable, "linked fixed node unreachable from start");
    }

    /// Sum of the kind weights of all live nodes.
    ///
    /// Every applied rewrite strictly decreases this measure, which bounds
    /// the canonicalization/virtualization fixpoint.
    #[must_use]
    pub fn reduction_measure(&self) -> usize {
        self.node_ids()
            .map(|id| self.node(id).kind().reduction_weight())
            .sum()
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("{id} was deleted or never existed"))
    }

    /// Removes all input edges of `id`, dropping one usage entry per edge.
    fn detach_inputs(&mut self, id: NodeId) {
        let inputs = std::mem::take(self.node_mut(id).inputs_mut());
        for input in inputs {
            let usages = self.node_mut(input).usages_mut();
            let position = usages
                .iter()
                .position(|&user| user == id)
                .expect("input edge without matching usage entry");
            usages.swap_remove(position);
        }
    }

    /// Unlinks a fixed node from the control chain.
    fn splice_out(&mut self, id: NodeId) {
        let prev = self
            .node(id)
            .prev()
            .expect("splicing a node without a predecessor");
        let next = self.node(id).next();

        let prev_prev = self.node(prev).prev();
        self.node_mut(prev).set_links(prev_prev, next);
        if let Some(next) = next {
            let next_next = self.node(next).next();
            self.node_mut(next).set_links(Some(prev), next_next);
        }
        if self.tail == id {
            self.tail = prev;
        }
        self.node_mut(id).set_links(None, None);
    }

    /// Tombstones a detached node.
    fn delete(&mut self, id: NodeId) {
        let node = self.nodes[id.index()]
            .take()
            .unwrap_or_else(|| panic!("{id} was already deleted"));
        debug_assert!(node.is_unused(), "deleting {id} with live usages");
        debug_assert!(node.inputs().is_empty(), "deleting {id} with live inputs");
        if let NodeKind::Constant { value } = node.kind() {
            self.constants.remove(value);
        }
        self.live -= 1;
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph ({} nodes):", self.live)?;
        for id in self.fixed_order() {
            writeln!(f, "  {id} = {}", self.node(id))?;
        }
        for id in self.node_ids() {
            if self.node(id).is_floating() {
                writeln!(f, "  {id} = {}", self.node(id))?;
            }
        }
        Ok(())
    }
}

/// Iterator over the control sequence, start node first.
pub struct FixedOrder<'a> {
    graph: &'a Graph,
    current: Option<NodeId>,
}

impl Iterator for FixedOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.graph.node(id).next();
        Some(id)
    }
}
