//! Hit-test rectangles for drag and drop.
//!
//! The index is a flat list rebuilt from scratch whenever the layout changes.
//! Queries return the first area that contains the point, so the build order
//! decides which zone wins where rectangles overlap: stack headers, then root
//! edges, then strips between row and column children, then stack body edges,
//! and body centers last.

use strum::IntoEnumIterator;
use tracing::trace;

use super::geometry::{GeometryProvider, Point, Rect, Region};
use super::graph::{ItemType, Orientation, Side};
use crate::common::config::DropSettings;
use crate::model::ContentTree;
use crate::model::tree::NodeId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AreaSide {
    /// A strip along one edge of the whole layout.
    RootEdge(Side),
    /// The whole layout, when nothing in it is visible.
    RootEmpty,
    /// Between two children of a row or column. `index` is the position the
    /// dropped item takes among the container's children.
    Between { index: usize },
    /// A slice of a stack header. `index` is the tab position the dropped
    /// item takes.
    Header { index: usize },
    /// The part of a stack body near one edge, outside the center.
    BodyEdge(Side),
    BodyCenter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Area {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub item: NodeId,
    pub side: AreaSide,
}

impl Area {
    fn new(rect: Rect, item: NodeId, side: AreaSide) -> Area {
        let (min, max) = (rect.min(), rect.max());
        Area {
            x1: min.x,
            y1: min.y,
            x2: max.x,
            y2: max.y,
            item,
            side,
        }
    }

    pub fn rect(&self) -> Rect { Rect::from_corners(self.x1, self.y1, self.x2, self.y2) }

    pub fn center(&self) -> Point { self.rect().center() }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x1 < x && x < self.x2 && self.y1 < y && y < self.y2
    }
}

#[derive(Clone, Debug, Default)]
pub struct AreaIndex {
    areas: Vec<Area>,
}

impl AreaIndex {
    pub fn areas(&self) -> &[Area] { &self.areas }

    pub fn query(&self, x: f64, y: f64) -> Option<Area> {
        self.areas.iter().find(|area| area.contains(x, y)).copied()
    }

    /// Rebuilds the index from the visible part of `tree`.
    pub fn rebuild(
        &mut self,
        tree: &ContentTree,
        geometry: &dyn GeometryProvider,
        settings: &DropSettings,
    ) {
        self.areas.clear();
        let visible = visible_items(tree);

        let stacks: Vec<_> = visible
            .iter()
            .copied()
            .filter(|&n| tree.item_type(n) == Some(ItemType::Stack))
            .collect();
        for &stack in &stacks {
            self.header_areas(tree, geometry, stack);
        }
        self.root_areas(tree, geometry, settings);
        for &node in &visible {
            if tree.item_type(node).is_some_and(ItemType::is_row_or_column) {
                self.between_areas(tree, geometry, settings, node);
            }
        }
        let bodies: Vec<_> = stacks
            .iter()
            .filter(|&&s| !tree.is_docked(s))
            .filter_map(|&s| match geometry.bounds_of(s, Region::Body) {
                Some(body) => Some((s, body)),
                None => {
                    trace!(stack = ?s, "no body geometry, skipping");
                    None
                }
            })
            .collect();
        for &(stack, body) in &bodies {
            self.body_edge_areas(stack, body, settings.body_center_fraction);
        }
        for &(stack, body) in &bodies {
            let center = body.inset_fraction(settings.body_center_fraction);
            self.push(center, stack, AreaSide::BodyCenter);
        }
        trace!(count = self.areas.len(), "rebuilt area index");
    }

    fn push(&mut self, rect: Rect, item: NodeId, side: AreaSide) {
        if !rect.is_empty() {
            self.areas.push(Area::new(rect, item, side));
        }
    }

    fn root_areas(
        &mut self,
        tree: &ContentTree,
        geometry: &dyn GeometryProvider,
        settings: &DropSettings,
    ) {
        let root = tree.root();
        let Some(bounds) = geometry.bounds_of(root, Region::Item).or(geometry.container_bounds())
        else {
            trace!("no root geometry, skipping root areas");
            return;
        };
        match tree.visible_children(root).next() {
            None => self.push(bounds, root, AreaSide::RootEmpty),
            Some(child) if tree.item_type(child) == Some(ItemType::Stack) => {}
            Some(_) => {
                for side in Side::iter() {
                    let strip = bounds.edge(side, settings.root_edge_size);
                    self.push(strip, root, AreaSide::RootEdge(side));
                }
            }
        }
    }

    fn between_areas(
        &mut self,
        tree: &ContentTree,
        geometry: &dyn GeometryProvider,
        settings: &DropSettings,
        container: NodeId,
    ) {
        let Some(orientation) = tree.item_type(container).and_then(ItemType::orientation) else {
            return;
        };
        let Some(bounds) = geometry.bounds_of(container, Region::Item) else { return };
        let children: Vec<_> = tree.visible_children(container).collect();
        let half = settings.between_drop_size / 2.0;
        for pair in children.windows(2) {
            let Some(first) = geometry.bounds_of(pair[0], Region::Item) else { continue };
            let Some(index) = tree.index_of(pair[1]) else { continue };
            let boundary = first.end(orientation);
            self.push(
                bounds.slice(orientation, boundary - half, boundary + half),
                container,
                AreaSide::Between { index },
            );
        }
    }

    fn header_areas(&mut self, tree: &ContentTree, geometry: &dyn GeometryProvider, stack: NodeId) {
        let Some(header_side) = tree.info(stack).and_then(|i| i.kind.as_stack()).and_then(|s| s.header)
        else {
            return;
        };
        let Some(header) = geometry.bounds_of(stack, Region::Header) else {
            trace!(?stack, "no header geometry, skipping");
            return;
        };
        let axis = header_side.orientation().perpendicular();
        let midpoints = tab_midpoints(tree, geometry, stack, axis);
        let mut from = header.start(axis);
        for (index, &mid) in midpoints.iter().enumerate() {
            self.push(header.slice(axis, from, mid), stack, AreaSide::Header { index });
            from = mid;
        }
        self.push(
            header.slice(axis, from, header.end(axis)),
            stack,
            AreaSide::Header { index: midpoints.len() },
        );
    }

    fn body_edge_areas(&mut self, stack: NodeId, body: Rect, center_fraction: f64) {
        let center = body.inset_fraction(center_fraction);
        let (b_min, b_max) = (body.min(), body.max());
        let (c_min, c_max) = (center.min(), center.max());
        let edges = [
            (Side::Top, Rect::from_corners(b_min.x, b_min.y, b_max.x, c_min.y)),
            (Side::Bottom, Rect::from_corners(b_min.x, c_max.y, b_max.x, b_max.y)),
            (Side::Left, Rect::from_corners(b_min.x, c_min.y, c_min.x, c_max.y)),
            (Side::Right, Rect::from_corners(c_max.x, c_min.y, b_max.x, c_max.y)),
        ];
        for (side, rect) in edges {
            self.push(rect, stack, AreaSide::BodyEdge(side));
        }
    }
}

/// Midpoints of the visible tabs of `stack` along the header axis.
pub(super) fn tab_midpoints(
    tree: &ContentTree,
    geometry: &dyn GeometryProvider,
    stack: NodeId,
    axis: Orientation,
) -> Vec<f64> {
    tree.visible_children(stack)
        .filter_map(|tab| geometry.bounds_of(tab, Region::Tab))
        .map(|tab| (tab.start(axis) + tab.end(axis)) / 2.0)
        .collect()
}

fn visible_items(tree: &ContentTree) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut pending = vec![tree.root()];
    while let Some(node) = pending.pop() {
        out.push(node);
        let children: Vec<_> = tree.visible_children(node).collect();
        pending.extend(children.into_iter().rev());
    }
    out
}
