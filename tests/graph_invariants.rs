//! Randomized structural tests for the graph and the pass pipeline.
//!
//! Builds arbitrary well-typed graphs from random instruction sequences,
//! applies random legal mutations, and checks the edge and control-chain
//! invariants after every step. Finally runs the optimizer and checks that
//! the result is a genuine fixpoint.

use std::sync::Arc;

use proptest::prelude::*;

use seagraph::ir::{ConstValue, Graph, Node, NodeKind};
use seagraph::pipeline::{EventLog, Optimizer};
use seagraph::stamp::{ClassId, ObjectStamp, Stamp, TypeHierarchy};

/// One randomized construction step. Indices select among the object and
/// logic values built so far, wrapping modulo the list length.
#[derive(Debug, Clone)]
enum Step {
    Parameter { nullable: bool, class: usize },
    NullConstant,
    Allocate { class: usize },
    IsNull { value: usize },
    Negate { logic: usize },
    InstanceOf { value: usize, class: usize, non_null: bool },
    Guard { value: usize },
    WeakCounter { logic: usize },
    DynamicCounter,
    ReplaceLogicWithTrue { logic: usize },
}

const CLASS_COUNT: usize = 4;

fn hierarchy() -> Arc<TypeHierarchy> {
    let mut types = TypeHierarchy::new();
    let object = types.define_class("Object", None).unwrap();
    let number = types.define_class("Number", Some(object)).unwrap();
    types.define_class("Integer", Some(number)).unwrap();
    types.define_class("String", Some(object)).unwrap();
    Arc::new(types)
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (any::<bool>(), 0..CLASS_COUNT)
            .prop_map(|(nullable, class)| Step::Parameter { nullable, class }),
        Just(Step::NullConstant),
        (0..CLASS_COUNT).prop_map(|class| Step::Allocate { class }),
        any::<usize>().prop_map(|value| Step::IsNull { value }),
        any::<usize>().prop_map(|logic| Step::Negate { logic }),
        (any::<usize>(), 0..CLASS_COUNT, any::<bool>()).prop_map(|(value, class, non_null)| {
            Step::InstanceOf {
                value,
                class,
                non_null,
            }
        }),
        any::<usize>().prop_map(|value| Step::Guard { value }),
        any::<usize>().prop_map(|logic| Step::WeakCounter { logic }),
        Just(Step::DynamicCounter),
        any::<usize>().prop_map(|logic| Step::ReplaceLogicWithTrue { logic }),
    ]
}

fn pick(pool: &[seagraph::ir::NodeId], index: usize) -> Option<seagraph::ir::NodeId> {
    if pool.is_empty() {
        None
    } else {
        Some(pool[index % pool.len()])
    }
}

/// Interprets the steps, checking invariants after every mutation.
fn build(steps: &[Step]) -> Graph {
    let mut graph = Graph::new(hierarchy());
    let mut objects = Vec::new();
    let mut logics = Vec::new();
    let mut index = 0u16;

    for step in steps {
        match step {
            Step::Parameter { nullable, class } => {
                let class = ClassId::new(*class);
                let stamp = if *nullable {
                    ObjectStamp::of_class(class)
                } else {
                    ObjectStamp::non_null_of(class)
                };
                objects.push(graph.add(Node::new(
                    NodeKind::Parameter { index },
                    Stamp::Object(stamp),
                    vec![],
                )));
                index += 1;
            }
            Step::NullConstant => {
                objects.push(graph.constant(ConstValue::Null));
            }
            Step::Allocate { class } => {
                let class = ClassId::new(*class);
                objects.push(graph.append_fixed(Node::new(
                    NodeKind::NewInstance { class },
                    Stamp::Object(ObjectStamp::exact_non_null(class)),
                    vec![],
                )));
            }
            Step::IsNull { value } => {
                if let Some(value) = pick(&objects, *value) {
                    logics.push(graph.add(Node::new(
                        NodeKind::IsNull,
                        Stamp::Boolean,
                        vec![value],
                    )));
                }
            }
            Step::Negate { logic } => {
                if let Some(value) = pick(&logics, *logic) {
                    logics.push(graph.add(Node::new(
                        NodeKind::LogicNegation,
                        Stamp::Boolean,
                        vec![value],
                    )));
                }
            }
            Step::InstanceOf {
                value,
                class,
                non_null,
            } => {
                if let Some(value) = pick(&objects, *value) {
                    let class = ClassId::new(*class);
                    let checked = if *non_null {
                        ObjectStamp::non_null_of(class)
                    } else {
                        ObjectStamp::exact_non_null(class)
                    };
                    logics.push(graph.add(Node::new(
                        NodeKind::InstanceOf { checked },
                        Stamp::Boolean,
                        vec![value],
                    )));
                }
            }
            Step::Guard { value } => {
                if let Some(value) = pick(&objects, *value) {
                    graph.append_fixed(Node::new(NodeKind::NullCheck, Stamp::Void, vec![value]));
                }
            }
            Step::WeakCounter { logic } => {
                if let Some(tracked) = pick(&logics, *logic) {
                    let increment = graph.constant(ConstValue::Int(1));
                    graph.append_fixed(Node::new(
                        NodeKind::WeakCounter {
                            group: "random".into(),
                            name: "tracked".into(),
                        },
                        Stamp::Void,
                        vec![increment, tracked],
                    ));
                }
            }
            Step::DynamicCounter => {
                let increment = graph.constant(ConstValue::Int(1));
                graph.append_fixed(Node::new(
                    NodeKind::DynamicCounter {
                        group: "random".into(),
                        name: "always".into(),
                    },
                    Stamp::Void,
                    vec![increment],
                ));
            }
            Step::ReplaceLogicWithTrue { logic } => {
                if let Some(old) = pick(&logics, *logic) {
                    if graph.contains(old)
                        && !matches!(graph.kind(old), NodeKind::Constant { .. })
                    {
                        let truth = graph.constant(ConstValue::Bool(true));
                        if old != truth {
                            graph.replace_and_delete(old, truth);
                            logics.retain(|&id| id != old);
                        }
                    }
                }
            }
        }
        graph.verify_edges();
    }

    // Anchor the most recent logic value so the graph has an observable
    // result, then close the control sequence.
    let result = logics
        .iter()
        .rev()
        .find(|&&id| graph.contains(id))
        .copied();
    match result {
        Some(result) => {
            graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![result]));
        }
        None => {
            graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![]));
        }
    }
    graph.verify_edges();
    graph
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_construction_keeps_invariants(steps in prop::collection::vec(arb_step(), 1..40)) {
        // Invariants are checked inside `build` after every mutation.
        let graph = build(&steps);
        prop_assert!(graph.node_count() >= 2);
    }

    #[test]
    fn optimizer_reaches_a_true_fixpoint(steps in prop::collection::vec(arb_step(), 1..40)) {
        let mut graph = build(&steps);
        let measure_before = graph.reduction_measure();

        let events = EventLog::new();
        let optimizer = Optimizer::new();
        optimizer.optimize(&mut graph, &events).unwrap();
        graph.verify_edges();

        // The measure never grows.
        prop_assert!(graph.reduction_measure() <= measure_before);

        // Running again changes nothing: one stable round suffices.
        let count_before = graph.node_count();
        let rounds = optimizer.optimize(&mut graph, &events).unwrap();
        prop_assert_eq!(rounds, 1);
        prop_assert_eq!(graph.node_count(), count_before);
        graph.verify_edges();
    }

    #[test]
    fn optimized_graphs_contain_no_decidable_tests(steps in prop::collection::vec(arb_step(), 1..40)) {
        let mut graph = build(&steps);
        let events = EventLog::new();
        Optimizer::new().optimize(&mut graph, &events).unwrap();

        // Every surviving type test must be genuinely open, every null
        // test undecided, and every floating non-parameter node used.
        let ids: Vec<_> = graph.node_ids().collect();
        for id in ids {
            let node = graph.node(id);
            match node.kind() {
                NodeKind::InstanceOf { checked } => {
                    let input = graph.stamp(node.inputs()[0]).expect_object();
                    prop_assert_eq!(
                        seagraph::canonicalize::find_synonym(checked, input, graph.types()),
                        seagraph::canonicalize::Synonym::Undecided
                    );
                }
                NodeKind::IsNull => {
                    let input = graph.stamp(node.inputs()[0]).expect_object();
                    prop_assert!(!input.non_null() && !input.is_always_null());
                }
                NodeKind::Parameter { .. } => {}
                _ => {
                    if node.is_floating() {
                        prop_assert!(!node.is_unused());
                    }
                }
            }
        }
    }
}
