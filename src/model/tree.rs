use std::ops::{Deref, Index, IndexMut};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// N-ary tree.
#[derive(Serialize, Deserialize)]
pub struct Tree<O> {
    pub map: NodeMap,
    pub data: O,
}

impl Tree<()> {
    pub fn new() -> Self { Self::with_observer(()) }
}

impl<O: Observer> Tree<O> {
    pub fn with_observer(data: O) -> Self { Tree { map: NodeMap::new(), data } }

    pub fn mk_node(&mut self) -> UnattachedNode<'_, O> {
        let id = self.map.map.insert(Node::default());
        self.data.added_to_forest(&self.map, id);
        UnattachedNode { id, tree: self }
    }
}

/// Map that holds the structure of the tree.
///
/// Nodes without a parent are roots of their own branch. The layout root is
/// one of them; items floating under an external drag are others.
#[derive(Serialize, Deserialize)]
pub struct NodeMap {
    map: SlotMap<NodeId, Node>,
}

impl NodeMap {
    fn new() -> NodeMap { NodeMap { map: SlotMap::default() } }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn contains(&self, id: NodeId) -> bool { self.map.contains_key(id) }
}

impl Index<NodeId> for NodeMap {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output { &self.map[index] }
}

impl IndexMut<NodeId> for NodeMap {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output { &mut self.map[index] }
}

/// Represents ownership of the layout root.
///
/// The root must be removed manually, because removal requires a reference to
/// the tree. Dropping an `OwnedNode` without calling [`OwnedNode::remove`]
/// panics in debug builds.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnedNode(Option<NodeId>, String);

impl OwnedNode {
    /// Creates a new root node.
    pub fn new_root_in(tree: &mut Tree<impl Observer>, name: &'static str) -> Self {
        let node = tree.mk_node();
        Self::own(node.id, name)
    }

    pub fn own(node: NodeId, name: &'static str) -> Self { OwnedNode(Some(node), name.to_owned()) }

    pub fn id(&self) -> NodeId { self.0.expect("OwnedNode::id called on removed OwnedNode") }

    #[track_caller]
    pub fn remove(&mut self, tree: &mut Tree<impl Observer>) {
        if let Some(id) = self.0.take() {
            UnattachedNode { id, tree }.remove()
        }
    }

    /// Gives up ownership without removing the node from the forest.
    pub fn release(mut self) -> Option<NodeId> { self.0.take() }
}

impl Deref for OwnedNode {
    type Target = NodeId;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref().expect("OwnedNode deref on removed OwnedNode")
    }
}

impl Drop for OwnedNode {
    fn drop(&mut self) {
        if cfg!(debug_assertions) {
            if let Some(node) = self.0 {
                panic!(
                    "OwnedNode {name:?} dropped without OwnedNode::remove being called: {node:?}",
                    name = self.1,
                );
            }
        }
    }
}

slotmap::new_key_type! {
    /// Represents a node somewhere in the tree.
    pub struct NodeId;
}

impl NodeId {
    #[track_caller]
    pub fn detach<'a, O: Observer>(self, tree: &'a mut Tree<O>) -> DetachedNode<'a, O> {
        DetachedNode { id: self, tree }
    }

    pub fn parent(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.parent)
    }

    pub fn children(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        ChildIterator {
            cur: map.map.get(self).and_then(|n| n.first_child),
            map,
        }
    }

    pub fn children_rev(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        ChildRevIterator {
            cur: map.map.get(self).and_then(|n| n.last_child),
            map,
        }
    }

    pub fn child_count(self, map: &NodeMap) -> usize { self.children(map).count() }

    /// Position of this node in its parent's child sequence.
    pub fn index_in_parent(self, map: &NodeMap) -> Option<usize> {
        let parent = self.parent(map)?;
        parent.children(map).position(|c| c == self)
    }

    pub fn traverse_preorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        PreorderTraversal::new(map, self)
    }

    /// Returns an iterator over all ancestors of the current node, including itself.
    pub fn ancestors(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let node = next;
            next = node.and_then(|n| map.map.get(n).and_then(|nd| nd.parent));
            node
        })
    }

    /// True if `self` is `other` or one of its ancestors.
    pub fn is_ancestor_of(self, other: NodeId, map: &NodeMap) -> bool {
        other.ancestors(map).any(|a| a == self)
    }

    pub fn next_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.next_sibling)
    }

    pub fn prev_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.prev_sibling)
    }

    pub fn first_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.first_child)
    }

    pub fn last_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.last_child)
    }

    pub fn is_empty(self, map: &NodeMap) -> bool {
        map.map.get(self).map(|n| n.first_child.is_none()).unwrap_or(true)
    }
}

pub trait Observer
where Self: Sized {
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId);
    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId);
}

impl Observer for () {
    fn added_to_forest(&mut self, _forest: &NodeMap, _node: NodeId) {}

    fn added_to_parent(&mut self, _forest: &NodeMap, _node: NodeId) {}

    fn removing_from_parent(&mut self, _forest: &NodeMap, _node: NodeId) {}

    fn removed_from_forest(&mut self, _forest: &NodeMap, _node: NodeId) {}
}

#[must_use = "Unattached nodes should be inserted into the tree or kept as a root"]
pub struct UnattachedNode<'a, O> {
    id: NodeId,
    tree: &'a mut Tree<O>,
}

impl<'a, O: Observer> UnattachedNode<'a, O> {
    /// Keeps the node in the forest as a parentless root.
    pub fn into_id(self) -> NodeId { self.id }

    #[track_caller]
    pub fn push_back(self, parent: NodeId) -> NodeId { self.id.detach(self.tree).push_back(parent) }

    #[track_caller]
    pub fn insert_before(self, sibling: NodeId) -> NodeId {
        self.id.detach(self.tree).insert_before(sibling)
    }

    #[track_caller]
    pub fn insert_after(self, sibling: NodeId) -> NodeId {
        self.id.detach(self.tree).insert_after(sibling)
    }

    #[track_caller]
    pub fn insert_at(self, parent: NodeId, index: usize) -> NodeId {
        self.id.detach(self.tree).insert_at(parent, index)
    }

    #[track_caller]
    pub fn remove(self) {
        debug_assert!(self.id.parent(&self.tree.map).is_none());
        if let Some(node) = self.tree.map.map.remove(self.id) {
            node.delete_recursive(self.tree, self.id);
        }
    }
}

#[must_use = "Detached nodes should be reattached to the tree, unlinked or removed"]
pub struct DetachedNode<'a, O> {
    id: NodeId,
    tree: &'a mut Tree<O>,
}

impl<'a, O: Observer> DetachedNode<'a, O> {
    #[track_caller]
    pub fn push_back(self, parent: NodeId) -> NodeId {
        self.attach_with(parent, |id, map| id.link_under_back(parent, map))
    }

    #[track_caller]
    pub fn insert_before(self, sibling: NodeId) -> NodeId {
        let new_parent = sibling
            .parent(&self.tree.map)
            .expect("cannot make a sibling of a root node or invalid sibling");
        self.attach_with(new_parent, |id, map| id.link_before(sibling, map))
    }

    #[track_caller]
    pub fn insert_after(self, sibling: NodeId) -> NodeId {
        let new_parent = sibling
            .parent(&self.tree.map)
            .expect("cannot make a sibling of a root node or invalid sibling");
        self.attach_with(new_parent, |id, map| id.link_after(sibling, map))
    }

    /// Inserts at `index` in `parent`'s child sequence, counted after this
    /// node has been unlinked from wherever it was. Indices past the end
    /// append.
    #[track_caller]
    pub fn insert_at(self, parent: NodeId, index: usize) -> NodeId {
        let id = self.id;
        self.attach_with(parent, |id_, map| {
            let anchor = parent.children(map).filter(|&c| c != id).nth(index);
            match anchor {
                Some(anchor) => id_.link_before(anchor, map),
                None => id_.link_under_back(parent, map),
            }
        })
    }

    /// Unlinks the node from its parent, leaving it (and its subtree) in the
    /// forest as a parentless root.
    #[track_caller]
    pub fn unlink(self) -> NodeId {
        if self.id.parent(&self.tree.map).is_some() {
            self.tree.data.removing_from_parent(&self.tree.map, self.id);
            self.tree.map.unlink(self.id);
        }
        self.id
    }

    /// Unlinks the node and deletes it together with its subtree.
    #[track_caller]
    pub fn remove(self) {
        let tree = self.tree;
        let id = DetachedNode { id: self.id, tree: &mut *tree }.unlink();
        if let Some(node) = tree.map.map.remove(id) {
            node.delete_recursive(tree, id);
        }
    }

    #[track_caller]
    fn attach_with(self, new_parent: NodeId, attach: impl FnOnce(NodeId, &mut NodeMap)) -> NodeId {
        assert!(
            !self.id.is_ancestor_of(new_parent, &self.tree.map),
            "attaching {:?} under {new_parent:?} would create a cycle",
            self.id
        );
        if self.id.parent(&self.tree.map).is_some() {
            self.tree.data.removing_from_parent(&self.tree.map, self.id);
        }
        self.tree.map.unlink(self.id);
        attach(self.id, &mut self.tree.map);
        self.tree.data.added_to_parent(&self.tree.map, self.id);
        self.id
    }
}

#[derive(Default, PartialEq, Debug, Serialize, Deserialize)]
pub struct Node {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

impl NodeId {
    fn link_under_back(self, parent: NodeId, map: &mut NodeMap) {
        if self == parent || !map.contains(self) || !map.contains(parent) {
            return;
        }

        let prev_child = {
            let parent_node = &mut map.map[parent];
            parent_node.first_child.get_or_insert(self);
            parent_node.last_child.replace(self)
        };
        map.map[self].parent = Some(parent);

        if let Some(prev) = prev_child {
            self.hlink_after(prev, map);
        }
    }

    #[track_caller]
    fn link_before(self, next: NodeId, map: &mut NodeMap) {
        let parent = next.parent(map).expect("cannot make a sibling of a root node or invalid sibling");
        let Some(self_node) = map.map.get_mut(self) else { return };
        self_node.parent = Some(parent);
        let parent_node = &mut map.map[parent];
        if parent_node.first_child == Some(next) {
            parent_node.first_child = Some(self);
        }
        self.hlink_before(next, map);
    }

    #[track_caller]
    fn link_after(self, prev: NodeId, map: &mut NodeMap) {
        let parent = prev.parent(map).expect("cannot make a sibling of a root node or invalid sibling");
        let Some(self_node) = map.map.get_mut(self) else { return };
        self_node.parent = Some(parent);
        let parent_node = &mut map.map[parent];
        if parent_node.last_child == Some(prev) {
            parent_node.last_child = Some(self);
        }
        self.hlink_after(prev, map);
    }

    fn hlink_after(self, prev: NodeId, map: &mut NodeMap) {
        if self == prev {
            return;
        }
        debug_assert_eq!(map.map[self].prev_sibling, None);
        map.map[self].prev_sibling = Some(prev);
        if let Some(next) = map.map[prev].next_sibling.replace(self) {
            map.map[next].prev_sibling = Some(self);
            map.map[self].next_sibling = Some(next);
        }
    }

    fn hlink_before(self, next: NodeId, map: &mut NodeMap) {
        if self == next {
            return;
        }
        debug_assert_eq!(map.map[self].next_sibling, None);
        map.map[self].next_sibling = Some(next);
        if let Some(prev) = map.map[next].prev_sibling.replace(self) {
            map.map[prev].next_sibling = Some(self);
            map.map[self].prev_sibling = Some(prev);
        }
    }
}

impl NodeMap {
    fn unlink(&mut self, id: NodeId) {
        let Some((prev_sibling, next_sibling, parent)) =
            self.map.get(id).map(|n| (n.prev_sibling, n.next_sibling, n.parent))
        else {
            return;
        };
        if let Some(prev) = prev_sibling {
            self.map[prev].next_sibling = next_sibling;
        }
        if let Some(next) = next_sibling {
            self.map[next].prev_sibling = prev_sibling;
        }
        if let Some(parent) = parent {
            let parent_node = &mut self.map[parent];
            if parent_node.first_child == Some(id) {
                parent_node.first_child = next_sibling;
            }
            if parent_node.last_child == Some(id) {
                parent_node.last_child = prev_sibling;
            }
        }
        let node = &mut self.map[id];
        node.prev_sibling = None;
        node.next_sibling = None;
        node.parent = None;
    }
}

impl Node {
    fn delete_recursive(&self, cx: &mut Tree<impl Observer>, id: NodeId) {
        cx.data.removed_from_forest(&cx.map, id);
        let mut iter = self.first_child;
        while let Some(child) = iter {
            let next = cx.map.map.get(child).and_then(|n| n.next_sibling);
            if let Some(node) = cx.map.map.remove(child) {
                node.delete_recursive(cx, child);
            }
            iter = next;
        }
    }
}

struct ChildIterator<'a> {
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> Iterator for ChildIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.map.map.get(id).and_then(|n| n.next_sibling);
        Some(id)
    }
}

struct ChildRevIterator<'a> {
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> Iterator for ChildRevIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.map.map.get(id).and_then(|n| n.prev_sibling);
        Some(id)
    }
}

struct PreorderTraversal<'a> {
    top: NodeId,
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> PreorderTraversal<'a> {
    fn new(map: &'a NodeMap, root: NodeId) -> Self {
        Self {
            top: root,
            cur: Some(root),
            map,
        }
    }
}

impl<'a> Iterator for PreorderTraversal<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        if let Some(child) = node.first_child(self.map) {
            self.cur = Some(child);
        } else {
            self.cur = None;
            for ancestor in node.ancestors(self.map) {
                if ancestor == self.top {
                    break;
                }
                if let Some(sibling) = ancestor.next_sibling(self.map) {
                    self.cur = Some(sibling);
                    break;
                }
            }
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A forest with the following structure:
    /// ```text
    ///         [tree]            [floating]
    ///        __root__              float
    ///       /    |   \
    ///   row1   row2   row3
    ///            |
    ///          leaf
    /// ```
    struct TestTree {
        tree: Tree<Events>,
        root_node: OwnedNode,
        root: NodeId,
        row1: NodeId,
        row2: NodeId,
        row3: NodeId,
        leaf: NodeId,
        float: NodeId,
    }

    impl Drop for TestTree {
        fn drop(&mut self) {
            if self.root_node.0.is_some() {
                self.root_node.remove(&mut self.tree);
            }
        }
    }

    impl TestTree {
        #[rustfmt::skip]
        fn new() -> Self {
            let mut tree = Tree::with_observer(Events(vec![]));

            let root_node = OwnedNode::new_root_in(&mut tree, "tree");
            let root = root_node.id();
            let row1 = tree.mk_node().push_back(root);
            let row2 = tree.mk_node().push_back(root);
            let row3 = tree.mk_node().push_back(root);
            let leaf = tree.mk_node().push_back(row2);
            let float = tree.mk_node().into_id();

            let mut t = TestTree { tree, root_node, root, row1, row2, row3, leaf, float };
            t.tree.data.0.clear();
            t
        }

        fn get_children(&self, node: NodeId) -> Vec<NodeId> {
            node.children(&self.tree.map).collect()
        }

        #[track_caller]
        fn assert_children_are<const N: usize>(&self, children: [NodeId; N], parent: NodeId) {
            assert_eq!(&children[..], self.get_children(parent), "children did not match");
            let rev: Vec<_> = parent.children_rev(&self.tree.map).collect();
            assert_eq!(
                children.iter().copied().rev().collect::<Vec<_>>(),
                rev,
                "reverse children did not match"
            );
            for child in children {
                assert_eq!(child.parent(&self.tree.map), Some(parent), "child has incorrect parent");
            }
        }

        #[track_caller]
        fn assert_events_are<const N: usize>(&mut self, events: [TreeEvent; N]) {
            let actual: Vec<_> = self.tree.data.0.drain(..).collect();
            pretty_assertions::assert_eq!(&events[..], actual);
        }
    }

    #[derive(Clone, PartialEq, Debug)]
    enum TreeEvent {
        AddedToForest(NodeId),
        AddedToParent(NodeId, NodeId),
        RemovingFromParent(NodeId, NodeId),
        RemovedFromForest(NodeId),
    }
    use TreeEvent::*;

    struct Events(Vec<TreeEvent>);

    impl Observer for Events {
        fn added_to_forest(&mut self, _map: &NodeMap, node: NodeId) {
            self.0.push(AddedToForest(node))
        }

        fn added_to_parent(&mut self, map: &NodeMap, node: NodeId) {
            let parent = node.parent(map).expect("added_to_parent called on node without parent");
            self.0.push(AddedToParent(node, parent))
        }

        fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
            let parent =
                node.parent(map).expect("removing_from_parent called on node without parent");
            self.0.push(RemovingFromParent(node, parent))
        }

        fn removed_from_forest(&mut self, _map: &NodeMap, node: NodeId) {
            self.0.push(RemovedFromForest(node))
        }
    }

    #[test]
    fn iterates_children_in_both_directions() {
        let t = TestTree::new();
        t.assert_children_are([t.row1, t.row2, t.row3], t.root);
        t.assert_children_are([t.leaf], t.row2);
        assert!(t.get_children(t.row1).is_empty());
        assert!(t.get_children(t.float).is_empty());
    }

    #[test]
    fn traversals() {
        let t = TestTree::new();
        let pre: Vec<_> = t.root.traverse_preorder(&t.tree.map).collect();
        assert_eq!(vec![t.root, t.row1, t.row2, t.leaf, t.row3], pre);
        let ancestors: Vec<_> = t.leaf.ancestors(&t.tree.map).collect();
        assert_eq!(vec![t.leaf, t.row2, t.root], ancestors);
    }

    #[test]
    fn insert_at_counts_positions_without_the_moved_node() {
        let mut t = TestTree::new();
        t.row3.detach(&mut t.tree).insert_at(t.root, 0);
        t.assert_children_are([t.row3, t.row1, t.row2], t.root);
        t.row3.detach(&mut t.tree).insert_at(t.root, 1);
        t.assert_children_are([t.row1, t.row3, t.row2], t.root);
        t.row1.detach(&mut t.tree).insert_at(t.root, 99);
        t.assert_children_are([t.row3, t.row2, t.row1], t.root);
        assert_eq!(Some(2), t.row1.index_in_parent(&t.tree.map));
    }

    #[test]
    fn insert_before_and_after() {
        let mut t = TestTree::new();
        let first = t.tree.mk_node().insert_before(t.row1);
        let last = t.tree.mk_node().insert_after(t.row3);
        t.assert_events_are([
            AddedToForest(first),
            AddedToParent(first, t.root),
            AddedToForest(last),
            AddedToParent(last, t.root),
        ]);
        t.assert_children_are([first, t.row1, t.row2, t.row3, last], t.root);
    }

    #[test]
    fn moving_a_subtree_reports_both_parents() {
        let mut t = TestTree::new();
        t.row2.detach(&mut t.tree).push_back(t.row1);
        t.assert_events_are([RemovingFromParent(t.row2, t.root), AddedToParent(t.row2, t.row1)]);
        t.assert_children_are([t.row1, t.row3], t.root);
        t.assert_children_are([t.row2], t.row1);
        t.assert_children_are([t.leaf], t.row2);
    }

    #[test]
    fn unlink_keeps_the_subtree_alive() {
        let mut t = TestTree::new();
        let id = t.row2.detach(&mut t.tree).unlink();
        assert_eq!(t.row2, id);
        t.assert_events_are([RemovingFromParent(t.row2, t.root)]);
        assert_eq!(None, t.row2.parent(&t.tree.map));
        assert!(t.tree.map.contains(t.leaf));
        t.assert_children_are([t.row1, t.row3], t.root);

        t.float.detach(&mut t.tree).push_back(t.row2);
        t.assert_children_are([t.leaf, t.float], t.row2);
        t.row2.detach(&mut t.tree).remove();
    }

    #[test]
    fn remove_deletes_the_whole_subtree() {
        let mut t = TestTree::new();
        t.row2.detach(&mut t.tree).remove();
        t.assert_events_are([
            RemovingFromParent(t.row2, t.root),
            RemovedFromForest(t.row2),
            RemovedFromForest(t.leaf),
        ]);
        assert!(!t.tree.map.contains(t.row2));
        assert!(!t.tree.map.contains(t.leaf));
        t.assert_children_are([t.row1, t.row3], t.root);
    }

    #[test]
    fn ancestry_checks() {
        let t = TestTree::new();
        assert!(t.root.is_ancestor_of(t.leaf, &t.tree.map));
        assert!(t.row2.is_ancestor_of(t.row2, &t.tree.map));
        assert!(!t.leaf.is_ancestor_of(t.row2, &t.tree.map));
        assert!(!t.row1.is_ancestor_of(t.leaf, &t.tree.map));
    }

    #[test]
    fn attaching_under_a_descendant_panics() {
        let mut t = TestTree::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            t.row2.detach(&mut t.tree).push_back(t.leaf);
        }));
        assert!(result.is_err());
    }
}
