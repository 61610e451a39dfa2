//! The interface a node uses while being virtualized.
//!
//! Virtualization is two-phase: during collection nodes query aliases and
//! queue effects through the [`VirtualizerTool`], and only after the whole
//! graph has been examined are the queued effects applied. Queuing instead
//! of mutating keeps every query of the collection phase answered against
//! the unmodified graph.

use std::collections::HashMap;

use crate::ir::{ConstValue, NodeId};
use crate::stamp::{ClassId, ObjectStamp};
use crate::virtualize::{VirtualObject, VirtualObjectId};

/// What a node resolves to under the current alias map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasTarget {
    /// The node stands for itself (or another materialized node).
    Node(NodeId),
    /// The node stands for a virtualized allocation.
    Virtual(VirtualObjectId),
}

/// A mutation queued during collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Effect {
    /// Redirect all usages of `node` to a constant and delete it.
    ReplaceWithConstant {
        /// The node to replace.
        node: NodeId,
        /// The replacement constant.
        value: ConstValue,
    },
    /// Splice a use-less fixed node out and delete it.
    Delete {
        /// The node to remove.
        node: NodeId,
    },
}

/// Per-run alias map and effect queue handed to virtualizable nodes.
#[derive(Debug, Default)]
pub struct VirtualizerTool {
    objects: Vec<VirtualObject>,
    aliases: HashMap<NodeId, VirtualObjectId>,
    effects: Vec<Effect>,
}

impl VirtualizerTool {
    /// Creates an empty tool for one pass run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the virtual stand-in for an allocation of `class` and
    /// aliases `origin` to it.
    pub fn create_virtual_object(&mut self, origin: NodeId, class: ClassId) -> VirtualObjectId {
        let id = VirtualObjectId::new(self.objects.len());
        self.objects.push(VirtualObject::new(class));
        self.aliases.insert(origin, id);
        id
    }

    /// Resolves a node through the alias map.
    #[must_use]
    pub fn get_alias(&self, node: NodeId) -> AliasTarget {
        match self.aliases.get(&node) {
            Some(&id) => AliasTarget::Virtual(id),
            None => AliasTarget::Node(node),
        }
    }

    /// Returns the virtual object behind an alias target, if any.
    #[must_use]
    pub fn virtual_object(&self, id: VirtualObjectId) -> &VirtualObject {
        &self.objects[id.index()]
    }

    /// Returns the object fact for a node if it aliases a virtualized
    /// allocation.
    #[must_use]
    pub fn alias_stamp(&self, node: NodeId) -> Option<&ObjectStamp> {
        self.aliases
            .get(&node)
            .map(|&id| self.objects[id.index()].stamp())
    }

    /// Queues replacing `node` by a constant.
    pub fn replace_with_value(&mut self, node: NodeId, value: ConstValue) {
        self.effects.push(Effect::ReplaceWithConstant { node, value });
    }

    /// Queues deleting a use-less fixed node.
    pub fn delete(&mut self, node: NodeId) {
        self.effects.push(Effect::Delete { node });
    }

    /// Returns the nodes currently aliased to virtual objects.
    pub(crate) fn aliased_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.aliases.keys().copied()
    }

    /// Drains the queued effects in queue order.
    pub(crate) fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_resolution() {
        let mut tool = VirtualizerTool::new();
        let alloc = NodeId::new(5);
        let other = NodeId::new(6);
        let class = ClassId::new(0);

        let id = tool.create_virtual_object(alloc, class);
        assert_eq!(tool.get_alias(alloc), AliasTarget::Virtual(id));
        assert_eq!(tool.get_alias(other), AliasTarget::Node(other));

        let stamp = tool.alias_stamp(alloc).unwrap();
        assert!(stamp.is_exact() && stamp.non_null());
        assert_eq!(tool.virtual_object(id).class(), class);
        assert!(tool.alias_stamp(other).is_none());
    }

    #[test]
    fn test_effects_queue_in_order() {
        let mut tool = VirtualizerTool::new();
        tool.replace_with_value(NodeId::new(1), ConstValue::Bool(true));
        tool.delete(NodeId::new(2));

        let effects = tool.take_effects();
        assert_eq!(
            effects,
            vec![
                Effect::ReplaceWithConstant {
                    node: NodeId::new(1),
                    value: ConstValue::Bool(true),
                },
                Effect::Delete {
                    node: NodeId::new(2)
                },
            ]
        );
        assert!(tool.take_effects().is_empty());
    }
}
