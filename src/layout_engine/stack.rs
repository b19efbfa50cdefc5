//! Drop zones: what a hovered area means and where its indicator goes.

use super::area::{Area, AreaSide, tab_midpoints};
use super::geometry::{GeometryProvider, Point, Rect, Region};
use super::graph::{Orientation, Side};
use crate::common::config::DropSettings;
use crate::model::ContentTree;
use crate::model::tree::NodeId;

/// How a dropped item is incorporated into its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DropZone {
    /// Insert as a tab of the target stack at `index`.
    Header { index: usize },
    /// Split the target stack, placing the item on `side`.
    Split(Side),
    /// Add as a tab of the target stack.
    Center,
    /// Insert between two children of the target row or column.
    Between { index: usize },
    /// Place along an edge of the whole layout.
    RootEdge(Side),
    /// Fill the empty layout.
    RootEmpty,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub item: NodeId,
    pub zone: DropZone,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    pub target: Target,
    /// Where the item would land, for the host to draw.
    pub indicator: Rect,
}

/// Tab position for a pointer over a header: before the first tab whose
/// midpoint lies past the pointer.
pub fn insert_index(midpoints: &[f64], along: f64) -> usize {
    midpoints.iter().take_while(|&&mid| mid <= along).count()
}

/// Resolves a point in a stack body: inside the centered inner rectangle
/// means add as tab, anywhere else means split towards the nearest side.
pub fn resolve_body(body: Rect, center_fraction: f64, point: Point) -> DropZone {
    let center = body.inset_fraction(center_fraction);
    let (min, max) = (center.min(), center.max());
    if center.contains(point) && !center.is_empty() {
        DropZone::Center
    } else if point.y < min.y {
        DropZone::Split(Side::Top)
    } else if point.y > max.y {
        DropZone::Split(Side::Bottom)
    } else if point.x < min.x {
        DropZone::Split(Side::Left)
    } else {
        DropZone::Split(Side::Right)
    }
}

/// Works out the drop zone for a pointer at (`x`, `y`) over `area` and the
/// rectangle to highlight for it.
pub fn highlight_drop_zone(
    x: f64,
    y: f64,
    area: &Area,
    tree: &ContentTree,
    geometry: &dyn GeometryProvider,
    settings: &DropSettings,
) -> Highlight {
    let point = Point::new(x, y);
    let item = area.item;
    let (zone, indicator) = match area.side {
        AreaSide::Header { index } => {
            let header_side =
                tree.info(item).and_then(|i| i.kind.as_stack()).and_then(|s| s.header);
            match (header_side, geometry.bounds_of(item, Region::Header)) {
                (Some(side), Some(header)) => {
                    let axis = side.orientation().perpendicular();
                    let midpoints = tab_midpoints(tree, geometry, item, axis);
                    let along = if axis == Orientation::Horizontal { x } else { y };
                    let index = if midpoints.is_empty() {
                        index
                    } else {
                        insert_index(&midpoints, along)
                    };
                    let tabs: Vec<Rect> = tree
                        .visible_children(item)
                        .filter_map(|tab| geometry.bounds_of(tab, Region::Tab))
                        .collect();
                    let at = match (tabs.get(index), tabs.last()) {
                        (Some(tab), _) => tab.start(axis),
                        (None, Some(last)) => last.end(axis),
                        (None, None) => header.start(axis),
                    };
                    let half = settings.header_placeholder_size / 2.0;
                    (DropZone::Header { index }, header.slice(axis, at - half, at + half))
                }
                _ => (DropZone::Header { index }, area.rect()),
            }
        }
        AreaSide::BodyEdge(_) | AreaSide::BodyCenter => {
            let body = geometry.bounds_of(item, Region::Body).unwrap_or(area.rect());
            match resolve_body(body, settings.body_center_fraction, point) {
                DropZone::Split(side) => {
                    (DropZone::Split(side), body.portion(side, settings.drop_split_ratio))
                }
                zone => (zone, body),
            }
        }
        AreaSide::Between { index } => (DropZone::Between { index }, area.rect()),
        AreaSide::RootEdge(side) => {
            let root = geometry
                .bounds_of(item, Region::Item)
                .or(geometry.container_bounds())
                .unwrap_or(area.rect());
            (DropZone::RootEdge(side), root.portion(side, settings.drop_split_ratio))
        }
        AreaSide::RootEmpty => (DropZone::RootEmpty, area.rect()),
    };
    Highlight { target: Target { item, zone }, indicator }
}
