use tracing::{debug, trace};

use crate::common::config::Dimensions;
use crate::error::{DockError, Result};
use crate::layout_engine::sizing::SHARE_EPSILON;
use crate::layout_engine::{ItemType, Orientation};
use crate::model::item::{ItemInfo, ItemKind, Items};
use crate::model::selection::{ActiveTabs, TreeEvent};
use crate::model::tree::{self, NodeId, NodeMap, OwnedNode, Tree};

#[derive(Default)]
pub struct Components {
    pub items: Items,
    pub active: ActiveTabs,
}

impl tree::Observer for Components {
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::AddedToForest(node))
    }

    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::AddedToParent(node))
    }

    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::RemovingFromParent(node))
    }

    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::RemovedFromForest(node))
    }
}

impl Components {
    fn dispatch_event(&mut self, map: &NodeMap, event: TreeEvent) {
        self.active.handle_event(map, event);
        self.items.handle_event(map, event);
    }
}

/// The content item tree: one root, rows and columns that split their space
/// by percentage, stacks of tabs, and components as the leaves.
///
/// Items that are not attached below the root (freshly created, or detached
/// and kept) live in the same forest until they are attached or destroyed.
pub struct ContentTree {
    tree: Tree<Components>,
    root: OwnedNode,
}

impl Default for ContentTree {
    fn default() -> Self { Self::new() }
}

impl Drop for ContentTree {
    fn drop(&mut self) { self.root.remove(&mut self.tree) }
}

/// Shares of every child of a container, for putting them back after a
/// structural edit that should not change anyone's size.
struct ShareSnapshot(Vec<(NodeId, f64, f64)>);

impl ContentTree {
    pub fn new() -> Self {
        let mut tree = Tree::with_observer(Components::default());
        let root = OwnedNode::new_root_in(&mut tree, "content root");
        if let Some(info) = tree.data.items.get_mut(root.id()) {
            info.kind = ItemKind::Root;
            info.is_closable = false;
        }
        ContentTree { tree, root }
    }

    pub fn root(&self) -> NodeId { self.root.id() }

    pub fn map(&self) -> &NodeMap { &self.tree.map }

    pub fn contains(&self, node: NodeId) -> bool { self.tree.data.items.get(node).is_some() }

    pub fn info(&self, node: NodeId) -> Option<&ItemInfo> { self.tree.data.items.get(node) }

    pub fn info_mut(&mut self, node: NodeId) -> Option<&mut ItemInfo> {
        self.tree.data.items.get_mut(node)
    }

    fn require(&self, node: NodeId) -> Result<&ItemInfo> {
        self.info(node).ok_or(DockError::ItemNotFound(node))
    }

    pub fn item_type(&self, node: NodeId) -> Option<ItemType> {
        self.info(node).map(|info| info.kind.item_type())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> { node.parent(self.map()) }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> { node.children(self.map()).collect() }

    pub fn index_of(&self, node: NodeId) -> Option<usize> { node.index_in_parent(self.map()) }

    /// True if the item hangs below the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(node) && self.root().is_ancestor_of(node, self.map())
    }

    /// Components are visible while displayed; containers while at least one
    /// child is. The root always is.
    pub fn is_visible(&self, node: NodeId) -> bool {
        let Some(info) = self.info(node) else { return false };
        match info.kind {
            ItemKind::Root => true,
            ItemKind::Component(_) => info.displayed,
            _ => info.displayed && node.children(self.map()).any(|c| self.is_visible(c)),
        }
    }

    pub fn visible_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(self.map()).filter(|&c| self.is_visible(c))
    }

    pub fn is_docked(&self, node: NodeId) -> bool {
        self.info(node).and_then(|i| i.kind.as_stack()).is_some_and(|s| s.docked)
    }

    pub fn share(&self, node: NodeId, orientation: Orientation) -> f64 {
        self.info(node).map(|i| i.share(orientation)).unwrap_or(0.0)
    }

    pub fn set_share(&mut self, node: NodeId, orientation: Orientation, share: f64) {
        if let Some(info) = self.info_mut(node) {
            info.set_share(orientation, share);
        }
    }

    pub fn min_size(&self, node: NodeId, orientation: Orientation, dims: &Dimensions) -> f64 {
        let configured = self.info(node).and_then(|i| i.min_size(orientation));
        configured.unwrap_or(match orientation {
            Orientation::Horizontal => dims.min_item_width,
            Orientation::Vertical => dims.min_item_height,
        })
    }

    pub fn active_tab(&self, stack: NodeId) -> Option<NodeId> {
        self.tree.data.active.active(self.map(), stack)
    }

    /// All components below the root, in tree order.
    pub fn components(&self) -> Vec<NodeId> {
        self.root()
            .traverse_preorder(self.map())
            .filter(|&n| self.item_type(n) == Some(ItemType::Component))
            .collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.root()
            .traverse_preorder(self.map())
            .find(|&n| self.info(n).and_then(|i| i.id.as_deref()) == Some(id))
    }

    /// Creates an item that is not attached anywhere yet.
    pub fn create(&mut self, kind: ItemKind) -> NodeId {
        let node = self.tree.mk_node().into_id();
        if let Some(info) = self.info_mut(node) {
            info.kind = kind;
        }
        node
    }

    /// Checks that `item` may be placed under `parent`.
    pub fn check_attach(&self, parent: NodeId, item: NodeId) -> Result<()> {
        let parent_type = self.require(parent)?.kind.item_type();
        let child_type = self.require(item)?.kind.item_type();
        if item.is_ancestor_of(parent, self.map()) {
            return Err(DockError::Cycle { item, parent });
        }
        if !parent_type.can_contain(child_type) {
            return Err(DockError::InvalidChild {
                parent: parent_type,
                child: child_type,
            });
        }
        if parent_type == ItemType::Root && parent.children(self.map()).any(|c| c != item) {
            return Err(DockError::InvalidChild {
                parent: parent_type,
                child: child_type,
            });
        }
        Ok(())
    }

    /// Inserts `item` under `parent` at `index` (default: append), detaching
    /// it from wherever it was first. A container the item leaves behind is
    /// collapsed if that empties it.
    pub fn add_child(&mut self, parent: NodeId, item: NodeId, index: Option<usize>) -> Result<()> {
        let old_parent = self.parent(item);
        self.attach(parent, item, index)?;
        if let Some(old_parent) = old_parent
            && old_parent != parent
        {
            self.collapse_from(old_parent);
        }
        Ok(())
    }

    /// Like [`ContentTree::add_child`], but leaves the previous parent as it
    /// is, even if empty. Callers collapse once their whole edit is done.
    pub fn attach(&mut self, parent: NodeId, item: NodeId, index: Option<usize>) -> Result<()> {
        self.check_attach(parent, item)?;
        let len = parent.children(self.map()).filter(|&c| c != item).count();
        let index = index.unwrap_or(len).min(len);
        item.detach(&mut self.tree).insert_at(parent, index);
        if self.item_type(parent) == Some(ItemType::Stack) {
            self.activate(item);
        }
        trace!(?item, ?parent, index, "attached");
        Ok(())
    }

    /// Detaches `item` from its parent. With `keep_item` the item survives
    /// unattached; otherwise it is destroyed with its subtree. The parent is
    /// collapsed afterwards if that leaves it empty or redundant.
    pub fn remove_child(&mut self, item: NodeId, keep_item: bool) -> Result<()> {
        self.require(item)?;
        let Some(parent) = self.parent(item) else {
            return Err(DockError::InvariantViolation(format!("{item:?} has no parent")));
        };
        if keep_item {
            item.detach(&mut self.tree).unlink();
        } else {
            item.detach(&mut self.tree).remove();
        }
        self.collapse_from(parent);
        Ok(())
    }

    /// Deletes `item` and everything below it, attached or not. Does not
    /// collapse the parent.
    pub fn destroy(&mut self, item: NodeId) {
        if self.contains(item) && item != self.root() {
            item.detach(&mut self.tree).remove();
        }
    }

    /// Puts `new` where `old` is, with `old`'s proportions. `old` is left
    /// unattached for the caller.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let old_info = self.require(old)?;
        let (width, height) = (old_info.width, old_info.height);
        let new_type = self.require(new)?.kind.item_type();
        let Some(parent) = self.parent(old) else {
            return Err(DockError::InvariantViolation(format!("{old:?} has no parent")));
        };
        if new == old {
            return Ok(());
        }
        if new.is_ancestor_of(parent, self.map()) {
            return Err(DockError::Cycle { item: new, parent });
        }
        let parent_type = self.require(parent)?.kind.item_type();
        if !parent_type.can_contain(new_type) {
            return Err(DockError::InvalidChild { parent: parent_type, child: new_type });
        }

        if self.parent(new).is_some() {
            new.detach(&mut self.tree).unlink();
        }
        let shares = self.snapshot_shares(parent);
        new.detach(&mut self.tree).insert_before(old);
        old.detach(&mut self.tree).unlink();
        self.restore_shares(&shares);
        if let Some(info) = self.info_mut(new) {
            info.width = width;
            info.height = height;
        }
        Ok(())
    }

    /// Inserts `new` next to `target` and gives it `ratio` of the space
    /// `target` had along the parent's axis.
    pub fn insert_beside(
        &mut self,
        target: NodeId,
        new: NodeId,
        after: bool,
        ratio: f64,
    ) -> Result<()> {
        let Some(parent) = self.parent(target) else {
            return Err(DockError::InvariantViolation(format!("{target:?} has no parent")));
        };
        let Some(orientation) = self.item_type(parent).and_then(ItemType::orientation) else {
            return Err(DockError::InvariantViolation(format!(
                "{parent:?} does not split its space"
            )));
        };
        self.check_attach(parent, new)?;
        let shares = self.snapshot_shares(parent);
        let index = self.index_of(target).unwrap_or(0) + usize::from(after);
        self.attach(parent, new, Some(index))?;
        self.restore_shares(&shares);
        let total = self.share(target, orientation);
        self.set_share(new, orientation, total * ratio);
        self.set_share(target, orientation, total * (1.0 - ratio));
        Ok(())
    }

    /// Replaces `target` with a new row or column holding `target` and `new`,
    /// `new` first if `new_first`. `new` gets `ratio` of the space.
    pub fn wrap(
        &mut self,
        target: NodeId,
        new: NodeId,
        orientation: Orientation,
        new_first: bool,
        ratio: f64,
    ) -> Result<NodeId> {
        let container = self.create(ItemKind::for_orientation(orientation));
        if let Err(e) = self.replace_child(target, container) {
            self.destroy(container);
            return Err(e);
        }
        let (first, second) = if new_first { (new, target) } else { (target, new) };
        self.attach(container, first, None)?;
        self.attach(container, second, None)?;
        self.set_share(new, orientation, 100.0 * ratio);
        self.set_share(target, orientation, 100.0 * (1.0 - ratio));
        Ok(container)
    }

    /// Confirms `item` sits under `parent` exactly once and clears the
    /// floating state it had while dragged.
    pub fn set_parent(&mut self, item: NodeId, parent: NodeId) -> Result<()> {
        self.require(item)?;
        self.require(parent)?;
        let occurrences = parent.children(self.map()).filter(|&c| c == item).count();
        if occurrences != 1 || self.parent(item) != Some(parent) {
            return Err(DockError::InvariantViolation(format!(
                "{item:?} is not a child of {parent:?}"
            )));
        }
        self.set_displayed(item, true);
        Ok(())
    }

    pub fn set_displayed(&mut self, item: NodeId, displayed: bool) {
        if let Some(info) = self.info_mut(item) {
            info.displayed = displayed;
        }
    }

    /// Makes `item` the active child of its parent.
    pub fn activate(&mut self, item: NodeId) -> bool {
        self.tree.data.active.activate(&self.tree.map, item)
    }

    /// Hides `item` while it floats under a drag. If it was the active tab,
    /// a visible neighbour takes over. Returns whether it was active.
    pub fn undisplay(&mut self, item: NodeId) -> bool {
        let parent = self.parent(item);
        let was_active = parent.is_some_and(|p| self.active_tab(p) == Some(item));
        self.set_displayed(item, false);
        if was_active {
            let map = self.map();
            let prev = std::iter::successors(item.prev_sibling(map), |n| n.prev_sibling(map))
                .find(|&n| self.is_visible(n));
            let next = std::iter::successors(item.next_sibling(map), |n| n.next_sibling(map))
                .find(|&n| self.is_visible(n));
            if let Some(neighbour) = prev.or(next) {
                self.activate(neighbour);
            }
        }
        was_active
    }

    /// Walks up from `node` removing closable containers left empty, and
    /// replacing a closable row or column that has a single child with that
    /// child. The root never collapses.
    pub fn collapse_from(&mut self, node: NodeId) {
        let mut node = node;
        loop {
            if node == self.root() {
                return;
            }
            let Some(info) = self.info(node) else { return };
            let Some(parent) = self.parent(node) else { return };
            if !info.is_closable {
                return;
            }
            let ty = info.kind.item_type();
            let children = self.children(node);
            match (ty, children.as_slice()) {
                (ItemType::Row | ItemType::Column | ItemType::Stack, []) => {
                    debug!(?node, %ty, "removing empty container");
                    node.detach(&mut self.tree).remove();
                    node = parent;
                }
                (ItemType::Row | ItemType::Column, &[child]) => {
                    debug!(?node, %ty, ?child, "replacing container with its only child");
                    if self.replace_child(node, child).is_ok() {
                        self.destroy(node);
                    }
                    return;
                }
                _ => return,
            }
        }
    }

    fn snapshot_shares(&self, parent: NodeId) -> ShareSnapshot {
        ShareSnapshot(
            parent
                .children(self.map())
                .filter_map(|c| self.info(c).map(|i| (c, i.width, i.height)))
                .collect(),
        )
    }

    fn restore_shares(&mut self, snapshot: &ShareSnapshot) {
        for &(node, width, height) in &snapshot.0 {
            if let Some(info) = self.info_mut(node) {
                info.width = width;
                info.height = height;
            }
        }
    }

    /// Items deleted since the last call.
    pub fn take_destroyed(&mut self) -> Vec<NodeId> { self.tree.data.items.take_destroyed() }

    /// Containers whose active child changed since the last call.
    pub fn take_active_changes(&mut self) -> Vec<NodeId> { self.tree.data.active.take_changed() }

    /// Verifies the structural invariants of everything below the root.
    pub fn check_invariants(&self) -> Result<()> {
        let violation = |msg: String| Err(DockError::InvariantViolation(msg));
        let map = self.map();
        let root = self.root();
        if root.child_count(map) > 1 {
            return violation("root has more than one child".to_owned());
        }
        let mut visited = 0;
        for node in root.traverse_preorder(map) {
            visited += 1;
            if visited > map.len() {
                return violation("tree contains a cycle".to_owned());
            }
            let Some(info) = self.info(node) else {
                return violation(format!("{node:?} has no item data"));
            };
            let ty = info.kind.item_type();
            let children = self.children(node);
            for &child in &children {
                if self.parent(child) != Some(node) {
                    return violation(format!("{child:?} has the wrong parent"));
                }
                if children.iter().filter(|&&c| c == child).count() != 1 {
                    return violation(format!("{child:?} appears twice under {node:?}"));
                }
                let child_type = self.item_type(child).unwrap_or(ItemType::Root);
                if !ty.can_contain(child_type) {
                    return violation(format!("{child_type} {child:?} inside {ty} {node:?}"));
                }
            }
            if let Some(orientation) = ty.orientation()
                && !children.is_empty()
            {
                let total: f64 = children.iter().map(|&c| self.share(c, orientation)).sum();
                if (total - 100.0).abs() > SHARE_EPSILON {
                    return violation(format!("shares of {node:?} add up to {total}"));
                }
            }
            if ty == ItemType::Stack && !children.is_empty() {
                match self.active_tab(node) {
                    Some(active) if children.contains(&active) => {}
                    _ => return violation(format!("stack {node:?} has no active tab")),
                }
            }
        }
        Ok(())
    }

    pub fn draw_tree(&self) -> String {
        let tree = self.get_ascii_tree(self.root());
        let mut out = String::new();
        // Writing into a String cannot fail.
        _ = ascii_tree::write_tree(&mut out, &tree);
        out
    }

    fn get_ascii_tree(&self, node: NodeId) -> ascii_tree::Tree {
        let status = match self.parent(node) {
            Some(parent) if self.item_type(parent) == Some(ItemType::Stack) => {
                if self.active_tab(parent) == Some(node) { "☒ " } else { "☐ " }
            }
            _ => "",
        };
        let ty = self.item_type(node).map(|t| t.to_string()).unwrap_or_default();
        let desc = format!("{status}{ty} {node:?} {}", self.tree.data.items.debug(node));
        let children: Vec<_> =
            node.children(self.map()).map(|c| self.get_ascii_tree(c)).collect();
        if children.is_empty() {
            ascii_tree::Tree::Leaf(vec![desc])
        } else {
            ascii_tree::Tree::Node(desc, children)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::item::ComponentInfo;

    fn component(tree: &mut ContentTree, title: &str) -> NodeId {
        tree.create(ItemKind::Component(ComponentInfo {
            title: title.to_owned(),
            component_type: "test".to_owned(),
            ..ComponentInfo::default()
        }))
    }

    fn stack_of(tree: &mut ContentTree, parent: NodeId, titles: &[&str]) -> (NodeId, Vec<NodeId>) {
        let stack = tree.create(ItemKind::stack());
        tree.add_child(parent, stack, None).unwrap();
        let tabs = titles
            .iter()
            .map(|t| {
                let c = component(tree, t);
                tree.add_child(stack, c, None).unwrap();
                c
            })
            .collect();
        (stack, tabs)
    }

    fn widths(tree: &ContentTree, parent: NodeId) -> Vec<f64> {
        tree.children(parent).iter().map(|&c| tree.share(c, Orientation::Horizontal)).collect()
    }

    mod add_child {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn rejects_cycles() {
            let mut tree = ContentTree::new();
            let row = tree.create(ItemKind::Row);
            tree.add_child(tree.root(), row, None).unwrap();
            let column = tree.create(ItemKind::Column);
            tree.add_child(row, column, None).unwrap();

            assert_eq!(
                tree.add_child(column, row, None),
                Err(DockError::Cycle { item: row, parent: column })
            );
            assert_eq!(
                tree.add_child(row, row, None),
                Err(DockError::Cycle { item: row, parent: row })
            );
            tree.check_invariants().unwrap();
        }

        #[test]
        fn rejects_illegal_kinds() {
            let mut tree = ContentTree::new();
            let root = tree.root();
            let (stack, _) = stack_of(&mut tree, root, &["a"]);
            let row = tree.create(ItemKind::Row);
            assert_eq!(
                tree.add_child(stack, row, None),
                Err(DockError::InvalidChild { parent: ItemType::Stack, child: ItemType::Row })
            );
            let loose = component(&mut tree, "loose");
            assert_eq!(
                tree.add_child(row, loose, None),
                Err(DockError::InvalidChild {
                    parent: ItemType::Row,
                    child: ItemType::Component
                })
            );
            let second = tree.create(ItemKind::stack());
            assert_eq!(
                tree.add_child(tree.root(), second, None),
                Err(DockError::InvalidChild { parent: ItemType::Root, child: ItemType::Stack })
            );
        }

        #[test]
        fn inserts_at_index_and_activates_new_tabs() {
            let mut tree = ContentTree::new();
            let root = tree.root();
            let (stack, tabs) = stack_of(&mut tree, root, &["a", "b"]);
            let c = component(&mut tree, "c");
            tree.add_child(stack, c, Some(1)).unwrap();
            assert_eq!(tree.children(stack), vec![tabs[0], c, tabs[1]]);
            assert_eq!(tree.active_tab(stack), Some(c));
        }

        #[test]
        fn new_row_children_take_an_equal_share() {
            let mut tree = ContentTree::new();
            let row = tree.create(ItemKind::Row);
            tree.add_child(tree.root(), row, None).unwrap();
            stack_of(&mut tree, row, &["a"]);
            stack_of(&mut tree, row, &["b"]);
            assert_eq!(widths(&tree, row), vec![50.0, 50.0]);
            stack_of(&mut tree, row, &["c"]);
            let w = widths(&tree, row);
            assert!((w[2] - 100.0 / 3.0).abs() < 1e-9);
            assert!((w.iter().sum::<f64>() - 100.0).abs() < SHARE_EPSILON);
            tree.check_invariants().unwrap();
        }

        #[test]
        fn moving_the_last_tab_out_collapses_the_stack() {
            let mut tree = ContentTree::new();
            let row = tree.create(ItemKind::Row);
            tree.add_child(tree.root(), row, None).unwrap();
            let (left, tabs) = stack_of(&mut tree, row, &["a"]);
            let (right, _) = stack_of(&mut tree, row, &["b"]);
            tree.add_child(right, tabs[0], None).unwrap();
            assert!(!tree.contains(left));
            // The row was left with one child and gave its place to it.
            assert!(!tree.contains(row));
            assert_eq!(tree.children(tree.root()), vec![right]);
            tree.check_invariants().unwrap();
        }
    }

    mod remove_child {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn redistributes_the_removed_share() {
            let mut tree = ContentTree::new();
            let row = tree.create(ItemKind::Row);
            tree.add_child(tree.root(), row, None).unwrap();
            let (a, _) = stack_of(&mut tree, row, &["a"]);
            let (b, _) = stack_of(&mut tree, row, &["b"]);
            let (c, _) = stack_of(&mut tree, row, &["c"]);
            tree.set_share(a, Orientation::Horizontal, 20.0);
            tree.set_share(b, Orientation::Horizontal, 30.0);
            tree.set_share(c, Orientation::Horizontal, 50.0);

            tree.remove_child(c, false).unwrap();
            assert_eq!(widths(&tree, row), vec![40.0, 60.0]);
            assert!(!tree.contains(c));
            tree.check_invariants().unwrap();
        }

        #[test]
        fn keep_item_leaves_it_unattached() {
            let mut tree = ContentTree::new();
            let root = tree.root();
            let (stack, tabs) = stack_of(&mut tree, root, &["a", "b"]);
            tree.remove_child(tabs[0], true).unwrap();
            assert!(tree.contains(tabs[0]));
            assert!(!tree.is_attached(tabs[0]));
            assert_eq!(tree.children(stack), vec![tabs[1]]);
            assert_eq!(tree.active_tab(stack), Some(tabs[1]));
        }

        #[test]
        fn non_closable_containers_stay() {
            let mut tree = ContentTree::new();
            let root = tree.root();
            let (stack, tabs) = stack_of(&mut tree, root, &["a"]);
            tree.info_mut(stack).unwrap().is_closable = false;
            tree.remove_child(tabs[0], false).unwrap();
            assert!(tree.contains(stack));
            assert_eq!(tree.active_tab(stack), None);
        }

        #[test]
        fn root_cannot_be_removed() {
            let mut tree = ContentTree::new();
            let root = tree.root();
            assert!(matches!(
                tree.remove_child(root, false),
                Err(DockError::InvariantViolation(_))
            ));
        }
    }

    mod replace_child {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn new_item_takes_place_and_proportions() {
            let mut tree = ContentTree::new();
            let row = tree.create(ItemKind::Row);
            tree.add_child(tree.root(), row, None).unwrap();
            let (a, _) = stack_of(&mut tree, row, &["a"]);
            let (b, _) = stack_of(&mut tree, row, &["b"]);
            tree.set_share(a, Orientation::Horizontal, 30.0);
            tree.set_share(b, Orientation::Horizontal, 70.0);

            let column = tree.create(ItemKind::Column);
            tree.replace_child(a, column).unwrap();
            assert_eq!(tree.children(row), vec![column, b]);
            assert_eq!(widths(&tree, row), vec![30.0, 70.0]);
            assert!(tree.contains(a));
            assert_eq!(tree.parent(a), None);
            tree.destroy(a);
        }
    }

    mod set_parent {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn verifies_membership() {
            let mut tree = ContentTree::new();
            let root = tree.root();
            let (stack, tabs) = stack_of(&mut tree, root, &["a"]);
            tree.set_displayed(tabs[0], false);
            tree.set_parent(tabs[0], stack).unwrap();
            assert!(tree.info(tabs[0]).unwrap().displayed);

            let other = tree.create(ItemKind::stack());
            assert!(matches!(
                tree.set_parent(tabs[0], other),
                Err(DockError::InvariantViolation(_))
            ));
        }
    }

    mod visibility {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn undisplay_hands_the_active_tab_to_a_neighbour() {
            let mut tree = ContentTree::new();
            let root = tree.root();
            let (stack, tabs) = stack_of(&mut tree, root, &["a", "b", "c"]);
            tree.activate(tabs[1]);
            assert!(tree.undisplay(tabs[1]));
            assert_eq!(tree.active_tab(stack), Some(tabs[0]));
            assert!(!tree.undisplay(tabs[2]));
        }

        #[test]
        fn containers_without_visible_children_are_hidden() {
            let mut tree = ContentTree::new();
            let row = tree.create(ItemKind::Row);
            tree.add_child(tree.root(), row, None).unwrap();
            let (a, a_tabs) = stack_of(&mut tree, row, &["a"]);
            let (b, _) = stack_of(&mut tree, row, &["b"]);
            tree.undisplay(a_tabs[0]);
            assert!(!tree.is_visible(a));
            assert!(tree.is_visible(b));
            assert!(tree.is_visible(row));
            assert_eq!(tree.visible_children(row).collect::<Vec<_>>(), vec![b]);
        }
    }

    #[test]
    fn draw_tree_marks_active_tabs() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let (_, tabs) = stack_of(&mut tree, root, &["first", "second"]);
        tree.activate(tabs[1]);
        let drawn = tree.draw_tree();
        assert!(drawn.contains("root"), "{drawn}");
        assert!(drawn.contains("☐ component") && drawn.contains("\"first\""), "{drawn}");
        assert!(drawn.contains("☒ component"), "{drawn}");
    }

    #[test]
    fn lookups() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let (_, tabs) = stack_of(&mut tree, root, &["a", "b"]);
        tree.info_mut(tabs[1]).unwrap().id = Some("editor".to_owned());
        assert_eq!(tree.find_by_id("editor"), Some(tabs[1]));
        assert_eq!(tree.find_by_id("missing"), None);
        assert_eq!(tree.components(), tabs);
    }
}
