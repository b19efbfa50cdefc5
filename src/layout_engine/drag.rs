use tracing::trace;

use super::area::AreaIndex;
use super::geometry::{GeometryProvider, Point, Rect, Size};
use super::graph::{Orientation, Side};
use super::stack::{Target, highlight_drop_zone};
use crate::common::config::{Dimensions, DropSettings};
use crate::model::ContentTree;
use crate::model::tree::NodeId;

/// The floating stand-in drawn under the pointer while dragging.
#[derive(Clone, Debug, PartialEq)]
pub struct DragProxy {
    pub position: Point,
    pub size: Size,
    /// The size left for content once the header is taken off.
    pub content_size: Size,
    pub title: String,
    pub header: Option<Side>,
}

impl DragProxy {
    pub fn new(title: String, header: Option<Side>, position: Point, dims: &Dimensions) -> Self {
        let size = Size::new(dims.drag_proxy_width, dims.drag_proxy_height);
        let content_size = match header.map(Side::orientation) {
            Some(Orientation::Horizontal) => {
                Size::new(size.width - dims.header_height, size.height)
            }
            Some(Orientation::Vertical) => {
                Size::new(size.width, size.height - dims.header_height)
            }
            None => size,
        };
        DragProxy {
            position,
            size,
            content_size,
            title,
            header,
        }
    }
}

/// Where a dragged item came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Origin {
    pub parent: NodeId,
    pub index: usize,
    pub was_active: bool,
}

/// What to do with the item when the pointer is released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DropPlan {
    Target(Target),
    ReturnHome(Origin),
    Destroy,
}

/// State of one drag gesture, from grab to release.
#[derive(Clone, Debug)]
pub struct DragSession {
    item: NodeId,
    origin: Option<Origin>,
    pointer: Point,
    offset: Point,
    area: Option<Target>,
    last_valid_area: Option<Target>,
    highlight: Option<Rect>,
    proxy: DragProxy,
    bounds: Rect,
    constrain: bool,
}

impl DragSession {
    pub fn new(
        item: NodeId,
        origin: Option<Origin>,
        proxy: DragProxy,
        bounds: Rect,
        constrain: bool,
    ) -> Self {
        Self {
            item,
            origin,
            pointer: proxy.position,
            offset: Point::default(),
            area: None,
            last_valid_area: None,
            highlight: None,
            proxy,
            bounds,
            constrain,
        }
    }

    pub fn item(&self) -> NodeId { self.item }

    pub fn origin(&self) -> Option<Origin> { self.origin }

    pub fn pointer(&self) -> Point { self.pointer }

    /// Distance travelled since the drag started, as reported by the host.
    pub fn offset(&self) -> Point { self.offset }

    /// The target under the pointer, if any.
    pub fn target(&self) -> Option<Target> { self.area }

    /// The last target the pointer was over.
    pub fn last_valid(&self) -> Option<Target> { self.last_valid_area }

    /// The drop indicator. Stays where it was while the pointer is over no
    /// target.
    pub fn highlight(&self) -> Option<Rect> { self.highlight }

    pub fn proxy(&self) -> &DragProxy { &self.proxy }

    pub fn bounds(&self) -> Rect { self.bounds }

    /// Handles a pointer move. Returns false if the move was ignored because
    /// the pointer left the container.
    pub fn on_move(
        &mut self,
        (dx, dy): (f64, f64),
        (x, y): (f64, f64),
        areas: &AreaIndex,
        tree: &ContentTree,
        geometry: &dyn GeometryProvider,
        settings: &DropSettings,
    ) -> bool {
        let point = Point::new(x, y);
        if self.constrain && !self.bounds.contains_strict(point) {
            trace!(x, y, "pointer outside the container, ignoring");
            return false;
        }
        self.pointer = point;
        self.offset = Point::new(dx, dy);
        self.proxy.position = point;

        let target = areas.query(x, y).map(|area| {
            let highlight = highlight_drop_zone(x, y, &area, tree, geometry, settings);
            self.highlight = Some(highlight.indicator);
            highlight.target
        });
        if target != self.area {
            trace!(?target, "drop target changed");
        }
        self.area = target;
        if target.is_some() {
            self.last_valid_area = target;
        }
        true
    }

    /// Decides where the item goes on release.
    pub fn finish(&self) -> DropPlan {
        if let Some(target) = self.area.or(self.last_valid_area) {
            DropPlan::Target(target)
        } else if let Some(origin) = self.origin {
            DropPlan::ReturnHome(origin)
        } else {
            DropPlan::Destroy
        }
    }
}
