//! Escape-analysis style allocation elimination.
//!
//! The pass walks the control sequence once, aliasing every allocation to
//! a virtual stand-in and letting the nodes around it decide themselves
//! against the alias: null tests and type tests on a virtual object fold
//! outright, counters tracking one retire. Effects are queued during the
//! walk and applied afterwards; an allocation whose every usage was
//! decided away ends up unused and is removed without ever materializing.

use crate::canonicalize::try_fold;
use crate::ir::{ConstValue, Graph, NodeId, NodeKind};
use crate::pipeline::{EventKind, EventLog, GraphPass};
use crate::stamp::TriState;
use crate::virtualize::tool::Effect;
use crate::virtualize::{AliasTarget, VirtualizerTool};
use crate::Result;

/// The allocation-elimination pass.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use seagraph::ir::{Graph, Node, NodeKind};
/// use seagraph::pipeline::{EventLog, GraphPass};
/// use seagraph::stamp::{ObjectStamp, Stamp, TypeHierarchy};
/// use seagraph::virtualize::Virtualizer;
///
/// let mut types = TypeHierarchy::new();
/// let point = types.define_class("Point", None).unwrap();
/// let mut graph = Graph::new(Arc::new(types));
/// let alloc = graph.append_fixed(Node::new(
///     NodeKind::NewInstance { class: point },
///     Stamp::Object(ObjectStamp::exact_non_null(point)),
///     vec![],
/// ));
/// graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![]));
///
/// let events = EventLog::new();
/// Virtualizer::new().run(&mut graph, &events).unwrap();
/// assert!(!graph.contains(alloc));
/// ```
#[derive(Debug, Default)]
pub struct Virtualizer;

impl Virtualizer {
    /// Creates the pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs one virtualization round. Returns `true` if anything changed.
    pub fn virtualize(&self, graph: &mut Graph, events: &EventLog) -> bool {
        let mut tool = VirtualizerTool::new();
        self.collect(graph, &mut tool);
        apply(graph, tool, events)
    }

    /// Collection phase: reads the graph, queues effects, mutates nothing.
    fn collect(&self, graph: &Graph, tool: &mut VirtualizerTool) {
        // Control order first: aliases must exist before usages consult
        // them, and fixed nodes only see allocations that dominate them.
        for id in graph.fixed_order() {
            match graph.kind(id) {
                NodeKind::NewInstance { class } => {
                    tool.create_virtual_object(id, *class);
                }
                NodeKind::WeakCounter { .. } => {
                    // A counter tracking a virtualized value has nothing
                    // left to observe.
                    let tracked = graph.inputs(id)[1];
                    if matches!(tool.get_alias(tracked), AliasTarget::Virtual(_)) {
                        tool.delete(id);
                    }
                }
                _ => {}
            }
        }

        // Floating observers of aliased values.
        for id in graph.node_ids() {
            match graph.kind(id) {
                NodeKind::IsNull => {
                    let value = graph.inputs(id)[0];
                    if tool.alias_stamp(value).is_some() {
                        // A virtual object is definitely a fresh instance.
                        tool.replace_with_value(id, ConstValue::Bool(false));
                    }
                }
                NodeKind::InstanceOf { checked } => {
                    let value = graph.inputs(id)[0];
                    if let Some(stamp) = tool.alias_stamp(value) {
                        match try_fold(checked, stamp, graph.types()) {
                            TriState::True => {
                                tool.replace_with_value(id, ConstValue::Bool(true));
                            }
                            TriState::False => {
                                tool.replace_with_value(id, ConstValue::Bool(false));
                            }
                            TriState::Unknown => {}
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

impl GraphPass for Virtualizer {
    fn name(&self) -> &'static str {
        "virtualize"
    }

    fn description(&self) -> &'static str {
        "removes allocations whose every usage can be decided without them"
    }

    fn run(&self, graph: &mut Graph, events: &EventLog) -> Result<bool> {
        Ok(self.virtualize(graph, events))
    }
}

/// Apply phase: replays the queued effects, then removes every aliased
/// allocation the effects left unused.
fn apply(graph: &mut Graph, mut tool: VirtualizerTool, events: &EventLog) -> bool {
    #[cfg(debug_assertions)]
    let measure = graph.reduction_measure();

    let mut changed = false;
    for effect in tool.take_effects() {
        match effect {
            Effect::ReplaceWithConstant { node, value } if graph.contains(node) => {
                let constant = graph.constant(value);
                events
                    .record(EventKind::Virtualized)
                    .at(node)
                    .message(format!("decided to {constant} via alias"));
                graph.replace_and_delete(node, constant);
                changed = true;
            }
            Effect::Delete { node } if graph.contains(node) => {
                events
                    .record(EventKind::Virtualized)
                    .at(node)
                    .message("tracked value was virtualized");
                graph.remove_fixed(node);
                changed = true;
            }
            _ => {}
        }
    }

    let mut aliased: Vec<NodeId> = tool.aliased_nodes().collect();
    aliased.sort_unstable();
    for alloc in aliased {
        if graph.contains(alloc) && graph.node(alloc).is_unused() {
            events.record(EventKind::AllocationEliminated).at(alloc);
            graph.remove_fixed(alloc);
            changed = true;
        }
    }

    #[cfg(debug_assertions)]
    debug_assert!(
        !changed || graph.reduction_measure() < measure,
        "virtualization changed the graph without decreasing the measure"
    );
    changed
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ir::Node;
    use crate::stamp::{ClassId, ObjectStamp, Stamp, TypeHierarchy};

    fn hierarchy() -> (Arc<TypeHierarchy>, ClassId, ClassId, ClassId) {
        let mut types = TypeHierarchy::new();
        let shape = types.define_class("Shape", None).unwrap();
        let circle = types.define_class("Circle", Some(shape)).unwrap();
        let square = types.define_class("Square", Some(shape)).unwrap();
        (Arc::new(types), shape, circle, square)
    }

    fn alloc(graph: &mut Graph, class: ClassId) -> NodeId {
        graph.append_fixed(Node::new(
            NodeKind::NewInstance { class },
            Stamp::Object(ObjectStamp::exact_non_null(class)),
            vec![],
        ))
    }

    fn run(graph: &mut Graph) -> EventLog {
        let events = EventLog::new();
        Virtualizer::new().virtualize(graph, &events);
        graph.verify_edges();
        events
    }

    #[test]
    fn test_type_test_on_allocation_folds_and_frees_it() {
        let (types, shape, circle, _) = hierarchy();
        let mut graph = Graph::new(types);
        let instance = alloc(&mut graph, circle);
        let test = graph.add(Node::new(
            NodeKind::InstanceOf {
                checked: ObjectStamp::non_null_of(shape),
            },
            Stamp::Boolean,
            vec![instance],
        ));
        let ret = graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![test]));

        let events = run(&mut graph);

        assert!(!graph.contains(test));
        assert!(!graph.contains(instance));
        assert!(matches!(
            graph.kind(graph.inputs(ret)[0]),
            NodeKind::Constant {
                value: ConstValue::Bool(true)
            }
        ));
        assert_eq!(events.count_of(EventKind::AllocationEliminated), 1);
    }

    #[test]
    fn test_failing_type_test_folds_false() {
        let (types, _, circle, square) = hierarchy();
        let mut graph = Graph::new(types);
        let instance = alloc(&mut graph, circle);
        let test = graph.add(Node::new(
            NodeKind::InstanceOf {
                checked: ObjectStamp::non_null_of(square),
            },
            Stamp::Boolean,
            vec![instance],
        ));
        let ret = graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![test]));

        run(&mut graph);

        assert!(matches!(
            graph.kind(graph.inputs(ret)[0]),
            NodeKind::Constant {
                value: ConstValue::Bool(false)
            }
        ));
        assert!(!graph.contains(instance));
    }

    #[test]
    fn test_null_test_on_allocation_folds_false() {
        let (types, _, circle, _) = hierarchy();
        let mut graph = Graph::new(types);
        let instance = alloc(&mut graph, circle);
        let test = graph.add(Node::new(NodeKind::IsNull, Stamp::Boolean, vec![instance]));
        let ret = graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![test]));

        run(&mut graph);

        assert!(matches!(
            graph.kind(graph.inputs(ret)[0]),
            NodeKind::Constant {
                value: ConstValue::Bool(false)
            }
        ));
        assert!(!graph.contains(instance));
    }

    #[test]
    fn test_escaping_allocation_is_kept() {
        let (types, _, circle, _) = hierarchy();
        let mut graph = Graph::new(types);
        let instance = alloc(&mut graph, circle);
        graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![instance]));

        run(&mut graph);

        assert!(graph.contains(instance));
    }

    #[test]
    fn test_counter_tracking_allocation_retires() {
        let (types, _, circle, _) = hierarchy();
        let mut graph = Graph::new(types);
        let instance = alloc(&mut graph, circle);
        let increment = graph.constant(ConstValue::Int(1));
        let counter = graph.append_fixed(Node::new(
            NodeKind::WeakCounter {
                group: "alloc".into(),
                name: "tracked".into(),
            },
            Stamp::Void,
            vec![increment, instance],
        ));
        graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![]));

        run(&mut graph);

        assert!(!graph.contains(counter));
        assert!(!graph.contains(instance));
    }

    #[test]
    fn test_partially_escaping_allocation_still_folds_tests() {
        let (types, shape, circle, _) = hierarchy();
        let mut graph = Graph::new(types);
        let instance = alloc(&mut graph, circle);
        let test = graph.add(Node::new(
            NodeKind::InstanceOf {
                checked: ObjectStamp::non_null_of(shape),
            },
            Stamp::Boolean,
            vec![instance],
        ));
        // The allocation also escapes through the return.
        let ret = graph.append_fixed(Node::new(
            NodeKind::Return,
            Stamp::Void,
            vec![test, instance],
        ));

        run(&mut graph);

        assert!(graph.contains(instance));
        assert!(matches!(
            graph.kind(graph.inputs(ret)[0]),
            NodeKind::Constant {
                value: ConstValue::Bool(true)
            }
        ));
    }
}
