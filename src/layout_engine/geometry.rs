//! Rectangles, the geometry provider seam and the built-in computed layout.

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use super::graph::{Orientation, Side};
use super::sizing::{self, ShareUpdate};
use crate::common::config::Dimensions;
use crate::model::ContentTree;
use crate::model::item::ItemKind;
use crate::model::tree::NodeId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self { Point { x, y } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self { Size { width, height } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Rect::new(x1, y1, (x2 - x1).max(0.0), (y2 - y1).max(0.0))
    }

    pub fn min(&self) -> Point { self.origin }

    pub fn max(&self) -> Point {
        Point::new(self.origin.x + self.size.width, self.origin.y + self.size.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width * 0.5,
            self.origin.y + self.size.height * 0.5,
        )
    }

    pub fn len(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.size.width,
            Orientation::Vertical => self.size.height,
        }
    }

    pub fn start(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.origin.x,
            Orientation::Vertical => self.origin.y,
        }
    }

    pub fn end(&self, orientation: Orientation) -> f64 {
        self.start(orientation) + self.len(orientation)
    }

    /// The part of this rectangle between `from` and `to` along `orientation`,
    /// keeping the full extent on the other axis.
    pub fn slice(&self, orientation: Orientation, from: f64, to: f64) -> Rect {
        match orientation {
            Orientation::Horizontal => {
                Rect::from_corners(from, self.origin.y, to, self.max().y)
            }
            Orientation::Vertical => Rect::from_corners(self.origin.x, from, self.max().x, to),
        }
    }

    /// A strip of `thickness` along one edge.
    pub fn edge(&self, side: Side, thickness: f64) -> Rect {
        let thickness = thickness.clamp(0.0, self.len(side.orientation()));
        let (min, max) = (self.min(), self.max());
        match side {
            Side::Top => Rect::from_corners(min.x, min.y, max.x, min.y + thickness),
            Side::Bottom => Rect::from_corners(min.x, max.y - thickness, max.x, max.y),
            Side::Left => Rect::from_corners(min.x, min.y, min.x + thickness, max.y),
            Side::Right => Rect::from_corners(max.x - thickness, min.y, max.x, max.y),
        }
    }

    /// What remains after cutting `edge(side, thickness)` off.
    pub fn without_edge(&self, side: Side, thickness: f64) -> Rect {
        let thickness = thickness.clamp(0.0, self.len(side.orientation()));
        let (min, max) = (self.min(), self.max());
        match side {
            Side::Top => Rect::from_corners(min.x, min.y + thickness, max.x, max.y),
            Side::Bottom => Rect::from_corners(min.x, min.y, max.x, max.y - thickness),
            Side::Left => Rect::from_corners(min.x + thickness, min.y, max.x, max.y),
            Side::Right => Rect::from_corners(min.x, min.y, max.x - thickness, max.y),
        }
    }

    /// The portion of this rectangle covering `fraction` of it on `side`.
    pub fn portion(&self, side: Side, fraction: f64) -> Rect {
        self.edge(side, self.len(side.orientation()) * fraction.clamp(0.0, 1.0))
    }

    /// A centered rectangle whose width and height are `fraction` of ours.
    pub fn inset_fraction(&self, fraction: f64) -> Rect {
        let fraction = fraction.clamp(0.0, 1.0);
        let width = self.size.width * fraction;
        let height = self.size.height * fraction;
        let center = self.center();
        Rect::new(center.x - width * 0.5, center.y - height * 0.5, width, height)
    }

    /// Strict containment: points on the border are outside.
    pub fn contains_strict(&self, point: Point) -> bool {
        let (min, max) = (self.min(), self.max());
        min.x < point.x && point.x < max.x && min.y < point.y && point.y < max.y
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min().x..=self.max().x).contains(&point.x)
            && (self.min().y..=self.max().y).contains(&point.y)
    }

    pub fn is_empty(&self) -> bool { self.size.width <= 0.0 || self.size.height <= 0.0 }
}

pub trait Round {
    fn round(&self) -> Self;
}

impl Round for Rect {
    fn round(&self) -> Self {
        let min_rounded = self.min().round();
        let max_rounded = self.max().round();
        Rect::from_corners(min_rounded.x, min_rounded.y, max_rounded.x, max_rounded.y)
    }
}

impl Round for Point {
    fn round(&self) -> Self { Point::new(self.x.round(), self.y.round()) }
}

pub trait IsWithin {
    fn is_within(&self, how_much: f64, other: Self) -> bool;
}

impl IsWithin for Rect {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.origin.is_within(how_much, other.origin)
            && self.size.width.is_within(how_much, other.size.width)
            && self.size.height.is_within(how_much, other.size.height)
    }
}

impl IsWithin for Point {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.x.is_within(how_much, other.x) && self.y.is_within(how_much, other.y)
    }
}

impl IsWithin for f64 {
    fn is_within(&self, how_much: f64, other: Self) -> bool { (self - other).abs() < how_much }
}

/// The part of an item a bounding box is requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    /// The whole item.
    Item,
    /// A stack's tab strip.
    Header,
    /// A stack's content area below (or beside) the header.
    Body,
    /// A component's tab inside its stack header.
    Tab,
}

/// Supplies measured bounding boxes. Hosts with their own rendering implement
/// this; [`ComputedGeometry`] is used otherwise.
pub trait GeometryProvider {
    fn bounds_of(&self, node: NodeId, region: Region) -> Option<Rect>;

    fn offset_of(&self, node: NodeId, region: Region) -> Option<Point> {
        self.bounds_of(node, region).map(|r| r.origin)
    }

    /// Bounds of the surface the layout lives in, in page coordinates.
    fn container_bounds(&self) -> Option<Rect>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemFrame {
    pub item: Rect,
    pub header: Option<Rect>,
    pub body: Option<Rect>,
    pub tab: Option<Rect>,
}

/// Geometry derived from the tree itself by laying it out into a container
/// rectangle. Only visible items get frames.
#[derive(Clone, Debug, Default)]
pub struct ComputedGeometry {
    container: Option<Rect>,
    frames: SecondaryMap<NodeId, ItemFrame>,
}

impl ComputedGeometry {
    /// Lays the tree out into `container`. Returns the share corrections that
    /// make row and column proportions agree with the pixel sizes handed out
    /// after minimum sizes were applied.
    pub fn compute(
        tree: &ContentTree,
        container: Rect,
        dims: &Dimensions,
    ) -> (ComputedGeometry, Vec<ShareUpdate>) {
        let mut geometry = ComputedGeometry {
            container: Some(container),
            frames: SecondaryMap::new(),
        };
        let mut updates = Vec::new();
        geometry.place(tree, tree.root(), container, dims, &mut updates);
        (geometry, updates)
    }

    pub fn container(&self) -> Option<Rect> { self.container }

    pub fn frame(&self, node: NodeId) -> Option<&ItemFrame> { self.frames.get(node) }

    pub fn frames(&self) -> impl Iterator<Item = (NodeId, &ItemFrame)> + '_ { self.frames.iter() }

    fn place(
        &mut self,
        tree: &ContentTree,
        node: NodeId,
        rect: Rect,
        dims: &Dimensions,
        updates: &mut Vec<ShareUpdate>,
    ) {
        let Some(info) = tree.info(node) else { return };
        self.frames.insert(node, ItemFrame { item: rect, ..ItemFrame::default() });
        match &info.kind {
            ItemKind::Root => {
                if let Some(child) = tree.visible_children(node).next() {
                    self.place(tree, child, rect, dims, updates);
                }
            }
            ItemKind::Row | ItemKind::Column => {
                let Some(orientation) = info.kind.item_type().orientation() else { return };
                self.place_axis(tree, node, rect, orientation, dims, updates);
            }
            ItemKind::Stack(stack) => {
                let tabs: Vec<_> = tree.visible_children(node).collect();
                let (header, body) = if stack.docked {
                    (Some(rect), None)
                } else {
                    match stack.header {
                        Some(side) => (
                            Some(rect.edge(side, dims.header_height).round()),
                            Some(rect.without_edge(side, dims.header_height).round()),
                        ),
                        None => (None, Some(rect)),
                    }
                };
                let tab_rects = match (header, stack.header) {
                    (Some(header), Some(side)) => {
                        split_evenly(header, side.orientation().perpendicular(), tabs.len())
                    }
                    (Some(header), None) => {
                        split_evenly(header, Orientation::Horizontal, tabs.len())
                    }
                    _ => vec![],
                };
                if let Some(frame) = self.frames.get_mut(node) {
                    frame.header = header;
                    frame.body = body;
                }
                for (i, &tab) in tabs.iter().enumerate() {
                    self.frames.insert(
                        tab,
                        ItemFrame {
                            item: body.unwrap_or(Rect::new(rect.origin.x, rect.origin.y, 0.0, 0.0)),
                            header: None,
                            body,
                            tab: tab_rects.get(i).copied(),
                        },
                    );
                }
            }
            ItemKind::Component(_) => {}
        }
    }

    fn place_axis(
        &mut self,
        tree: &ContentTree,
        node: NodeId,
        rect: Rect,
        orientation: Orientation,
        dims: &Dimensions,
        updates: &mut Vec<ShareUpdate>,
    ) {
        let children: Vec<_> = tree.visible_children(node).collect();
        if children.is_empty() {
            return;
        }
        let axis_len = rect.len(orientation);

        // Docked stacks shrink to their header; everyone else shares the rest.
        let fixed: Vec<Option<f64>> = children
            .iter()
            .map(|&c| tree.is_docked(c).then_some(dims.header_height))
            .collect();
        let fixed_total: f64 = fixed.iter().flatten().sum();
        let flexible: Vec<_> = children
            .iter()
            .zip(&fixed)
            .filter(|(_, f)| f.is_none())
            .map(|(&c, _)| c)
            .collect();
        let shares: Vec<f64> = flexible.iter().map(|&c| tree.share(c, orientation)).collect();
        let mins: Vec<f64> = flexible.iter().map(|&c| tree.min_size(c, orientation, dims)).collect();
        let lens = sizing::distribute((axis_len - fixed_total).max(0.0), &shares, &mins);
        updates.extend(sizing::shares_following(&flexible, &shares, &lens));

        let mut lens = lens.into_iter();
        let mut offset = rect.start(orientation);
        for (&child, fixed) in children.iter().zip(&fixed) {
            let len = match fixed {
                Some(len) => *len,
                None => lens.next().unwrap_or(0.0),
            };
            let child_rect = rect.slice(orientation, offset, offset + len).round();
            self.place(tree, child, child_rect, dims, updates);
            offset += len;
        }
    }
}

fn split_evenly(rect: Rect, orientation: Orientation, count: usize) -> Vec<Rect> {
    if count == 0 {
        return vec![];
    }
    let step = rect.len(orientation) / count as f64;
    let start = rect.start(orientation);
    (0..count)
        .map(|i| {
            let from = start + step * i as f64;
            rect.slice(orientation, from, from + step)
        })
        .collect()
}

impl GeometryProvider for ComputedGeometry {
    fn bounds_of(&self, node: NodeId, region: Region) -> Option<Rect> {
        let frame = self.frames.get(node)?;
        match region {
            Region::Item => Some(frame.item),
            Region::Header => frame.header,
            Region::Body => frame.body,
            Region::Tab => frame.tab,
        }
    }

    fn container_bounds(&self) -> Option<Rect> { self.container }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_containment_excludes_the_border() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(rect.contains_strict(Point::new(50.0, 25.0)));
        assert!(!rect.contains_strict(Point::new(0.0, 25.0)));
        assert!(!rect.contains_strict(Point::new(100.0, 25.0)));
        assert!(!rect.contains_strict(Point::new(50.0, 50.0)));
        assert!(rect.contains(Point::new(100.0, 50.0)));
    }

    #[test]
    fn edges_and_remainders_tile_the_rect() {
        let rect = Rect::new(10.0, 20.0, 200.0, 100.0);
        assert_eq!(rect.edge(Side::Top, 20.0), Rect::new(10.0, 20.0, 200.0, 20.0));
        assert_eq!(rect.without_edge(Side::Top, 20.0), Rect::new(10.0, 40.0, 200.0, 80.0));
        assert_eq!(rect.edge(Side::Right, 50.0), Rect::new(160.0, 20.0, 50.0, 100.0));
        assert_eq!(rect.without_edge(Side::Left, 50.0), Rect::new(60.0, 20.0, 150.0, 100.0));
        assert_eq!(rect.edge(Side::Bottom, 500.0), rect);
    }

    #[test]
    fn portion_and_inset() {
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(rect.portion(Side::Right, 0.5), Rect::new(100.0, 0.0, 100.0, 100.0));
        assert_eq!(rect.portion(Side::Top, 0.25), Rect::new(0.0, 0.0, 200.0, 25.0));
        assert_eq!(rect.inset_fraction(0.5), Rect::new(50.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn round_rect() {
        let rect = Rect::new(10.4, 20.7, 100.0, 200.0);
        let rounded = rect.round();
        assert_eq!(rounded.origin.x, 10.0);
        assert_eq!(rounded.origin.y, 21.0);
        assert_eq!(rounded.size.width, 100.0);
        assert_eq!(rounded.size.height, 200.0);
    }

    #[test]
    fn is_within() {
        let a = Rect::new(10.0, 20.0, 100.0, 200.0);
        let b = Rect::new(10.05, 20.08, 100.03, 200.02);
        assert!(a.is_within(0.1, b));
        assert!(!a.is_within(0.01, b));
    }

    #[test]
    fn split_evenly_covers_the_rect() {
        let parts = split_evenly(Rect::new(0.0, 0.0, 90.0, 20.0), Orientation::Horizontal, 3);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], Rect::new(30.0, 0.0, 30.0, 20.0));
        assert!(split_evenly(Rect::default(), Orientation::Vertical, 0).is_empty());
    }
}
