use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use crate::layout_engine::{ItemType, Orientation, Side};
use crate::model::selection::TreeEvent;
use crate::model::tree::{NodeId, NodeMap};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Root,
    #[default]
    Row,
    Column,
    Stack(StackInfo),
    Component(ComponentInfo),
}

impl ItemKind {
    pub fn item_type(&self) -> ItemType {
        match self {
            ItemKind::Root => ItemType::Root,
            ItemKind::Row => ItemType::Row,
            ItemKind::Column => ItemType::Column,
            ItemKind::Stack(_) => ItemType::Stack,
            ItemKind::Component(_) => ItemType::Component,
        }
    }

    pub fn for_orientation(orientation: Orientation) -> ItemKind {
        match orientation {
            Orientation::Horizontal => ItemKind::Row,
            Orientation::Vertical => ItemKind::Column,
        }
    }

    pub fn stack() -> ItemKind { ItemKind::Stack(StackInfo::default()) }

    pub fn as_stack(&self) -> Option<&StackInfo> {
        match self {
            ItemKind::Stack(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentInfo> {
        match self {
            ItemKind::Component(info) => Some(info),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackInfo {
    /// Where the tab strip sits. `None` hides it.
    pub header: Option<Side>,
    /// A docked stack collapses to its header along the parent's axis.
    pub docked: bool,
}

impl Default for StackInfo {
    fn default() -> Self {
        StackInfo {
            header: Some(Side::Top),
            docked: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub title: String,
    pub component_type: String,
    pub component_state: serde_json::Value,
    pub reorder_enabled: bool,
}

impl Default for ComponentInfo {
    fn default() -> Self {
        ComponentInfo {
            title: String::new(),
            component_type: String::new(),
            component_state: serde_json::Value::Null,
            reorder_enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub kind: ItemKind,
    /// Percent of the parent's width. Only meaningful along a row's axis;
    /// 100 everywhere else.
    pub width: f64,
    /// Percent of the parent's height, see `width`.
    pub height: f64,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub is_closable: bool,
    pub id: Option<String>,
    /// False while the item floats under a drag.
    pub displayed: bool,
}

impl Default for ItemInfo {
    fn default() -> Self {
        ItemInfo {
            kind: ItemKind::default(),
            width: 100.0,
            height: 100.0,
            min_width: None,
            min_height: None,
            is_closable: true,
            id: None,
            displayed: true,
        }
    }
}

impl ItemInfo {
    pub fn share(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    pub fn set_share(&mut self, orientation: Orientation, share: f64) {
        match orientation {
            Orientation::Horizontal => self.width = share,
            Orientation::Vertical => self.height = share,
        }
    }

    pub fn min_size(&self, orientation: Orientation) -> Option<f64> {
        match orientation {
            Orientation::Horizontal => self.min_width,
            Orientation::Vertical => self.min_height,
        }
    }
}

/// Per-item data, kept in step with the tree structure.
///
/// Row and column children are renormalized here as they come and go: a new
/// child gets `100 / n` and the others are scaled to fit the rest; a leaving
/// child's share is handed back to its siblings in proportion to theirs.
#[derive(Default)]
pub struct Items {
    info: SecondaryMap<NodeId, ItemInfo>,
    destroyed: Vec<NodeId>,
}

impl Items {
    pub fn get(&self, node: NodeId) -> Option<&ItemInfo> { self.info.get(node) }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut ItemInfo> { self.info.get_mut(node) }

    /// Items deleted from the forest since the last call.
    pub fn take_destroyed(&mut self) -> Vec<NodeId> { std::mem::take(&mut self.destroyed) }

    fn axis(&self, node: NodeId) -> Option<Orientation> {
        self.info.get(node).and_then(|info| info.kind.item_type().orientation())
    }

    pub fn handle_event(&mut self, map: &NodeMap, event: TreeEvent) {
        match event {
            TreeEvent::AddedToForest(node) => {
                self.info.insert(node, ItemInfo::default());
            }
            TreeEvent::AddedToParent(node) => {
                let Some(parent) = node.parent(map) else { return };
                match self.axis(parent) {
                    Some(orientation) => self.make_room_for(map, parent, node, orientation),
                    None => {
                        if let Some(info) = self.info.get_mut(node) {
                            info.width = 100.0;
                            info.height = 100.0;
                        }
                    }
                }
            }
            TreeEvent::RemovingFromParent(node) => {
                let Some(parent) = node.parent(map) else { return };
                if let Some(orientation) = self.axis(parent) {
                    self.hand_back_share(map, parent, node, orientation);
                }
            }
            TreeEvent::RemovedFromForest(node) => {
                if self.info.remove(node).is_some() {
                    self.destroyed.push(node);
                }
            }
        }
    }

    fn make_room_for(&mut self, map: &NodeMap, parent: NodeId, node: NodeId, axis: Orientation) {
        let siblings: Vec<_> = parent.children(map).filter(|&c| c != node).collect();
        let new_share = 100.0 / (siblings.len() + 1) as f64;
        let rest = 100.0 - new_share;
        let total: f64 = siblings.iter().map(|&s| self.info[s].share(axis)).sum();
        for &sibling in &siblings {
            let info = &mut self.info[sibling];
            let share = if total > 0.0 {
                info.share(axis) * rest / total
            } else {
                rest / siblings.len() as f64
            };
            info.set_share(axis, share);
        }
        let info = &mut self.info[node];
        info.set_share(axis, new_share);
        info.set_share(axis.perpendicular(), 100.0);
    }

    fn hand_back_share(&mut self, map: &NodeMap, parent: NodeId, node: NodeId, axis: Orientation) {
        let siblings: Vec<_> = parent.children(map).filter(|&c| c != node).collect();
        if siblings.is_empty() {
            return;
        }
        let total: f64 = siblings.iter().map(|&s| self.info[s].share(axis)).sum();
        for &sibling in &siblings {
            let info = &mut self.info[sibling];
            let share = if total > 0.0 {
                info.share(axis) * 100.0 / total
            } else {
                100.0 / siblings.len() as f64
            };
            info.set_share(axis, share);
        }
    }

    pub fn debug(&self, node: NodeId) -> String {
        let Some(info) = self.info.get(node) else {
            return "[missing]".to_owned();
        };
        let mut desc = format!("[w {:.1} h {:.1}]", info.width, info.height);
        if !info.displayed {
            desc.push_str(" (floating)");
        }
        match &info.kind {
            ItemKind::Component(c) => desc = format!("{:?} {desc}", c.title),
            ItemKind::Stack(s) if s.docked => desc.push_str(" docked"),
            _ => {}
        }
        desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::{Observer, OwnedNode, Tree};

    #[derive(Default)]
    struct OnlyItems(Items);

    impl Observer for OnlyItems {
        fn added_to_forest(&mut self, map: &NodeMap, node: NodeId) {
            self.0.handle_event(map, TreeEvent::AddedToForest(node))
        }

        fn added_to_parent(&mut self, map: &NodeMap, node: NodeId) {
            self.0.handle_event(map, TreeEvent::AddedToParent(node))
        }

        fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
            self.0.handle_event(map, TreeEvent::RemovingFromParent(node))
        }

        fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId) {
            self.0.handle_event(map, TreeEvent::RemovedFromForest(node))
        }
    }

    fn widths(tree: &Tree<OnlyItems>, parent: NodeId) -> Vec<f64> {
        parent.children(&tree.map).map(|c| tree.data.0.info[c].width).collect()
    }

    #[track_caller]
    fn assert_close(actual: Vec<f64>, expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn new_children_get_an_equal_share() {
        let mut tree = Tree::with_observer(OnlyItems::default());
        let mut root = OwnedNode::new_root_in(&mut tree, "row");
        let row = root.id();
        let a = tree.mk_node().push_back(row);
        assert_close(widths(&tree, row), &[100.0]);
        let b = tree.mk_node().push_back(row);
        assert_close(widths(&tree, row), &[50.0, 50.0]);

        tree.data.0.info[a].width = 80.0;
        tree.data.0.info[b].width = 20.0;
        tree.mk_node().push_back(row);
        // The newcomer takes a third; the rest keep their 4:1 ratio.
        let rest = 100.0 * 2.0 / 3.0;
        assert_close(widths(&tree, row), &[rest * 0.8, rest * 0.2, 100.0 / 3.0]);
        root.remove(&mut tree);
    }

    #[test]
    fn removed_share_goes_back_proportionally() {
        let mut tree = Tree::with_observer(OnlyItems::default());
        let mut root = OwnedNode::new_root_in(&mut tree, "row");
        let row = root.id();
        let a = tree.mk_node().push_back(row);
        let b = tree.mk_node().push_back(row);
        let c = tree.mk_node().push_back(row);
        tree.data.0.info[a].width = 20.0;
        tree.data.0.info[b].width = 30.0;
        tree.data.0.info[c].width = 50.0;

        c.detach(&mut tree).remove();
        assert_close(widths(&tree, row), &[40.0, 60.0]);
        assert_eq!(tree.data.0.take_destroyed(), vec![c]);
        root.remove(&mut tree);
    }

    #[test]
    fn non_axis_parents_give_full_size() {
        let mut tree = Tree::with_observer(OnlyItems::default());
        let mut root = OwnedNode::new_root_in(&mut tree, "stack");
        let stack = root.id();
        tree.data.0.info[stack].kind = ItemKind::stack();
        let a = tree.mk_node().into_id();
        tree.data.0.info[a].width = 30.0;
        a.detach(&mut tree).push_back(stack);
        assert_eq!(tree.data.0.info[a].width, 100.0);
        assert_eq!(tree.data.0.info[a].height, 100.0);
        root.remove(&mut tree);
    }

    #[test]
    fn column_children_keep_full_width() {
        let mut tree = Tree::with_observer(OnlyItems::default());
        let mut root = OwnedNode::new_root_in(&mut tree, "column");
        let column = root.id();
        tree.data.0.info[column].kind = ItemKind::Column;
        let a = tree.mk_node().into_id();
        tree.data.0.info[a].width = 30.0;
        a.detach(&mut tree).push_back(column);
        tree.mk_node().push_back(column);
        assert_eq!(tree.data.0.info[a].width, 100.0);
        assert_eq!(tree.data.0.info[a].height, 50.0);
        root.remove(&mut tree);
    }
}
