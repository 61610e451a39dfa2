//! Worklist-driven local rewriting to a fixpoint.
//!
//! The canonicalizer visits every node, decides a per-kind reduction from
//! the node and the facts proven for its inputs, applies it, and re-queues
//! the neighborhood the rewrite disturbed. Each applied rewrite strictly
//! decreases the graph's kind-weighted size, so the worklist provably
//! drains.

use std::collections::{HashSet, VecDeque};

use crate::calls::ForeignCallsProvider;
use crate::canonicalize::{find_synonym, Synonym};
use crate::ir::{ConstValue, Graph, KindFlags, Node, NodeId, NodeKind};
use crate::pipeline::{EventKind, EventLog, GraphPass};
use crate::stamp::Stamp;
use crate::Result;

/// The reduction chosen for one node visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Canonical {
    /// Nothing to do.
    Unchanged,
    /// Redirect all usages to an existing node and delete.
    Replace(NodeId),
    /// Redirect all usages to a logic constant and delete.
    ReplaceWithBool(bool),
    /// Replace a type test by `!is_null(value)`.
    ReplaceWithNonNullTest(NodeId),
    /// Splice a use-less fixed node out of the control sequence.
    DeleteFixed,
    /// Drop a dead floating value.
    DeleteFloating,
}

/// The local-rewrite pass.
///
/// Stateless between runs; an optional [`ForeignCallsProvider`] enables
/// removal of use-less foreign calls whose descriptors mark them free of
/// memory effects. Without a provider every call is kept.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use seagraph::canonicalize::Canonicalizer;
/// use seagraph::ir::{ConstValue, Graph, Node, NodeKind};
/// use seagraph::pipeline::{EventLog, GraphPass};
/// use seagraph::stamp::{Stamp, TypeHierarchy};
///
/// let mut graph = Graph::new(Arc::new(TypeHierarchy::new()));
/// let null = graph.constant(ConstValue::Null);
/// let test = graph.add(Node::new(NodeKind::IsNull, Stamp::Boolean, vec![null]));
/// graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![test]));
///
/// let events = EventLog::new();
/// let changed = Canonicalizer::new().run(&mut graph, &events).unwrap();
/// assert!(changed);
/// ```
#[derive(Default)]
pub struct Canonicalizer<'p> {
    foreign_calls: Option<&'p (dyn ForeignCallsProvider + Sync)>,
}

impl<'p> Canonicalizer<'p> {
    /// Creates a canonicalizer that conservatively keeps all foreign calls.
    #[must_use]
    pub fn new() -> Self {
        Self {
            foreign_calls: None,
        }
    }

    /// Creates a canonicalizer that may remove use-less foreign calls based
    /// on the host's descriptors.
    #[must_use]
    pub fn with_foreign_calls(provider: &'p (dyn ForeignCallsProvider + Sync)) -> Self {
        Self {
            foreign_calls: Some(provider),
        }
    }

    /// Rewrites the graph to a local fixpoint. Returns `true` if anything
    /// changed.
    pub fn canonicalize(&self, graph: &mut Graph, events: &EventLog) -> bool {
        let mut worklist: VecDeque<NodeId> = graph.node_ids().collect();
        let mut queued: HashSet<NodeId> = worklist.iter().copied().collect();
        let mut changed = false;

        while let Some(id) = worklist.pop_front() {
            queued.remove(&id);
            if !graph.contains(id) {
                continue;
            }
            let decision = self.decide(graph, id);
            if decision == Canonical::Unchanged {
                continue;
            }

            #[cfg(debug_assertions)]
            let measure = graph.reduction_measure();

            let touched = apply(graph, id, decision, events);
            changed = true;

            #[cfg(debug_assertions)]
            debug_assert!(
                graph.reduction_measure() < measure,
                "rewrite of {id} did not decrease the reduction measure"
            );

            for node in touched {
                if graph.contains(node) && queued.insert(node) {
                    worklist.push_back(node);
                }
            }
        }
        changed
    }

    /// Picks the reduction for one node, without mutating anything.
    fn decide(&self, graph: &Graph, id: NodeId) -> Canonical {
        let node = graph.node(id);

        // Dead floating values go first; parameters stay, they are the
        // unit's signature.
        if node.is_floating()
            && node.is_unused()
            && !node.kind().has_side_effect()
            && !matches!(node.kind(), NodeKind::Parameter { .. })
        {
            return Canonical::DeleteFloating;
        }

        match node.kind() {
            NodeKind::IsNull => {
                let value = node.inputs()[0];
                match graph.stamp(value) {
                    Stamp::Object(stamp) if stamp.non_null() => Canonical::ReplaceWithBool(false),
                    Stamp::Object(stamp) if stamp.is_always_null() => {
                        Canonical::ReplaceWithBool(true)
                    }
                    _ => Canonical::Unchanged,
                }
            }
            NodeKind::LogicNegation => {
                let value = node.inputs()[0];
                match graph.kind(value) {
                    NodeKind::Constant {
                        value: ConstValue::Bool(b),
                    } => Canonical::ReplaceWithBool(!b),
                    // Double negation cancels.
                    NodeKind::LogicNegation => Canonical::Replace(graph.inputs(value)[0]),
                    _ => Canonical::Unchanged,
                }
            }
            NodeKind::InstanceOf { checked } => {
                let value = node.inputs()[0];
                let input = graph.stamp(value).expect_object();
                match find_synonym(checked, input, graph.types()) {
                    Synonym::AlwaysFalse => Canonical::ReplaceWithBool(false),
                    Synonym::AlwaysTrue => Canonical::ReplaceWithBool(true),
                    Synonym::NonNullTest => Canonical::ReplaceWithNonNullTest(value),
                    Synonym::Undecided => Canonical::Unchanged,
                }
            }
            NodeKind::NullCheck => {
                let value = node.inputs()[0];
                match graph.stamp(value) {
                    // The guard is proven; it no longer does anything.
                    Stamp::Object(stamp) if stamp.non_null() => Canonical::DeleteFixed,
                    _ => Canonical::Unchanged,
                }
            }
            NodeKind::WeakCounter { .. } => {
                // The counter only wants to fire while its tracked value
                // has uses besides the counter itself. A fixed tracked
                // value executes regardless of usages, so the counter must
                // keep firing for it.
                let tracked = node.inputs()[1];
                if graph.node(tracked).is_floating() && graph.usages(tracked) == [id] {
                    Canonical::DeleteFixed
                } else {
                    Canonical::Unchanged
                }
            }
            NodeKind::ForeignCall { call } => {
                let removable = node.is_unused()
                    && self
                        .foreign_calls
                        .and_then(|provider| provider.descriptor(*call))
                        .is_some_and(|descriptor| descriptor.is_removable_when_unused());
                if removable {
                    Canonical::DeleteFixed
                } else {
                    Canonical::Unchanged
                }
            }
            _ => Canonical::Unchanged,
        }
    }
}

impl GraphPass for Canonicalizer<'_> {
    fn name(&self) -> &'static str {
        "canonicalize"
    }

    fn description(&self) -> &'static str {
        "folds tests and guards against proven facts and drops dead nodes"
    }

    fn run(&self, graph: &mut Graph, events: &EventLog) -> Result<bool> {
        Ok(self.canonicalize(graph, events))
    }
}

/// Applies one reduction and returns the nodes whose situation it changed.
fn apply(graph: &mut Graph, id: NodeId, decision: Canonical, events: &EventLog) -> Vec<NodeId> {
    let mut touched: Vec<NodeId> = graph.usages(id).to_vec();
    touched.extend_from_slice(graph.inputs(id));
    let former_inputs = graph.inputs(id).to_vec();

    match decision {
        Canonical::Unchanged => unreachable!("unchanged decisions are filtered by the caller"),
        Canonical::Replace(new) => {
            events
                .record(EventKind::Canonicalized)
                .at(id)
                .message(format!("replaced by {new}"));
            graph.replace_and_delete(id, new);
            touched.push(new);
        }
        Canonical::ReplaceWithBool(value) => {
            let constant = graph.constant(ConstValue::Bool(value));
            events
                .record(EventKind::Canonicalized)
                .at(id)
                .message(format!("folded to {value}"));
            graph.replace_and_delete(id, constant);
            touched.push(constant);
        }
        Canonical::ReplaceWithNonNullTest(value) => {
            let is_null = graph.add(Node::new(NodeKind::IsNull, Stamp::Boolean, vec![value]));
            let negation = graph.add(Node::new(
                NodeKind::LogicNegation,
                Stamp::Boolean,
                vec![is_null],
            ));
            events
                .record(EventKind::Canonicalized)
                .at(id)
                .message("reduced to a null test");
            graph.replace_and_delete(id, negation);
            touched.push(is_null);
            touched.push(negation);
        }
        Canonical::DeleteFixed => {
            let kind = match graph.kind(id) {
                NodeKind::NullCheck => EventKind::GuardRemoved,
                NodeKind::WeakCounter { .. } => EventKind::CounterEliminated,
                NodeKind::ForeignCall { .. } => EventKind::CallRemoved,
                _ => EventKind::Deleted,
            };
            events.record(kind).at(id);
            graph.remove_fixed(id);
        }
        Canonical::DeleteFloating => {
            events.record(EventKind::Deleted).at(id);
            graph.remove_floating(id);
        }
    }

    // A former input lost an edge; counters watching that input's usage
    // count must re-run their predicate.
    for input in former_inputs {
        if !graph.contains(input) {
            continue;
        }
        for &user in graph.usages(input) {
            if graph.node(user).has_flag(KindFlags::SIMPLIFIABLE) {
                touched.push(user);
            }
        }
    }
    touched
}
