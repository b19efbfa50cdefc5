use slotmap::SecondaryMap;

use crate::model::tree::{NodeId, NodeMap};

#[derive(Copy, Clone, Debug)]
pub enum TreeEvent {
    AddedToForest(NodeId),
    AddedToParent(NodeId),
    RemovingFromParent(NodeId),
    RemovedFromForest(NodeId),
}

/// The active child of each container. Only stacks expose it, as their
/// active tab.
///
/// The first child added to a container becomes active. When the active child
/// leaves, its previous sibling takes over, else its next one.
#[derive(Default)]
pub struct ActiveTabs {
    nodes: SecondaryMap<NodeId, NodeId>,
    changed: Vec<NodeId>,
}

impl ActiveTabs {
    pub fn active(&self, map: &NodeMap, parent: NodeId) -> Option<NodeId> {
        let result = self.nodes.get(parent).copied();
        if let Some(child) = result {
            debug_assert_eq!(child.parent(map), Some(parent));
        }
        result
    }

    /// Makes `node` the active child of its parent. Returns true if that
    /// changed anything.
    pub fn activate(&mut self, map: &NodeMap, node: NodeId) -> bool {
        let Some(parent) = node.parent(map) else {
            return false;
        };
        let changed = self.nodes.insert(parent, node).map(|old| old != node).unwrap_or(true);
        if changed {
            self.changed.push(parent);
        }
        changed
    }

    /// Containers whose active child changed since the last call, oldest
    /// first, without repeats.
    pub fn take_changed(&mut self) -> Vec<NodeId> {
        let mut changed = std::mem::take(&mut self.changed);
        let mut seen = SecondaryMap::new();
        changed.retain(|&node| seen.insert(node, ()).is_none());
        changed
    }

    pub fn handle_event(&mut self, map: &NodeMap, event: TreeEvent) {
        use TreeEvent::*;
        match event {
            AddedToForest(_node) => {}
            AddedToParent(node) => {
                let Some(parent) = node.parent(map) else { return };
                if !self.nodes.contains_key(parent) {
                    self.nodes.insert(parent, node);
                    self.changed.push(parent);
                }
            }
            RemovingFromParent(node) => {
                let Some(parent) = node.parent(map) else { return };
                if self.nodes.get(parent) == Some(&node) {
                    if let Some(new_active) = node.prev_sibling(map).or(node.next_sibling(map)) {
                        self.nodes[parent] = new_active;
                    } else {
                        self.nodes.remove(parent);
                    }
                    self.changed.push(parent);
                }
            }
            RemovedFromForest(node) => {
                self.nodes.remove(node);
            }
        }
    }
}
