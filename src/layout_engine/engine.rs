use slotmap::SecondaryMap;
use tracing::{debug, info, trace, warn};

use super::area::{Area, AreaIndex};
use super::drag::{DragProxy, DragSession, DropPlan, Origin};
use super::geometry::{ComputedGeometry, GeometryProvider, IsWithin, Point, Rect};
use super::graph::{ItemType, Orientation, Side};
use super::item_config::{self, ItemConfig, LayoutConfig};
use super::stack::{self, DropZone, Highlight, Target};
use crate::common::config::Settings;
use crate::error::{DockError, Result};
use crate::event::{EventSender, LayoutEvent};
use crate::model::ContentTree;
use crate::model::item::ItemKind;
use crate::model::tree::NodeId;

/// How a finished drag was resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DropOutcome {
    Dropped(Target),
    /// Nothing was targeted; the item went back where it came from.
    Returned,
    /// Nothing was targeted and the item had no home; it was destroyed.
    Destroyed,
}

fn geometry_of<'a>(
    host: &'a Option<Box<dyn GeometryProvider>>,
    computed: &'a ComputedGeometry,
) -> &'a dyn GeometryProvider {
    match host {
        Some(host) => host.as_ref(),
        None => computed,
    }
}

/// Owns the layout tree and turns host calls and pointer gestures into tree
/// changes and notifications.
pub struct LayoutManager {
    tree: ContentTree,
    settings: Settings,
    events: EventSender,
    areas: AreaIndex,
    drag: Option<DragSession>,
    /// Measurements supplied by the host. Without them the computed layout
    /// is used for hit-testing.
    host_geometry: Option<Box<dyn GeometryProvider>>,
    container: Option<Rect>,
    computed: ComputedGeometry,
    shown: SecondaryMap<NodeId, ()>,
    frames: SecondaryMap<NodeId, Rect>,
}

impl LayoutManager {
    pub fn new(settings: Settings, events: EventSender) -> Result<Self> {
        let issues = settings.validate();
        if !issues.is_empty() {
            return Err(DockError::InvalidConfig(issues.join("; ")));
        }
        let tree = ContentTree::new();
        let mut shown = SecondaryMap::new();
        shown.insert(tree.root(), ());
        Ok(LayoutManager {
            tree,
            settings,
            events,
            areas: AreaIndex::default(),
            drag: None,
            host_geometry: None,
            container: None,
            computed: ComputedGeometry::default(),
            shown,
            frames: SecondaryMap::new(),
        })
    }

    pub fn from_config(
        config: &LayoutConfig,
        settings: Settings,
        events: EventSender,
    ) -> Result<Self> {
        let mut manager = Self::new(settings, events)?;
        manager.load(config)?;
        Ok(manager)
    }

    pub fn with_geometry(mut self, provider: Box<dyn GeometryProvider>) -> Self {
        self.host_geometry = Some(provider);
        self
    }

    pub fn set_geometry_provider(&mut self, provider: Option<Box<dyn GeometryProvider>>) {
        self.host_geometry = provider;
    }

    fn geometry(&self) -> &dyn GeometryProvider {
        geometry_of(&self.host_geometry, &self.computed)
    }

    pub fn tree(&self) -> &ContentTree { &self.tree }

    pub fn root(&self) -> NodeId { self.tree.root() }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn computed_geometry(&self) -> &ComputedGeometry { &self.computed }

    pub fn draw_tree(&self) -> String { self.tree.draw_tree() }

    pub fn check_invariants(&self) -> Result<()> { self.tree.check_invariants() }

    /// Replaces the current content with the layout described by `config`.
    pub fn load(&mut self, config: &LayoutConfig) -> Result<()> {
        if config.content.len() > 1 {
            return Err(DockError::InvalidConfig(format!(
                "a layout has at most one top level item, got {}",
                config.content.len()
            )));
        }
        let built = match config.content.first() {
            Some(item) if item.kind == ItemType::Component => {
                Some(item_config::build(&mut self.tree, &item.wrapped_in_stack())?)
            }
            Some(item) => Some(item_config::build(&mut self.tree, item)?),
            None => None,
        };
        for child in self.tree.children(self.root()) {
            self.tree.destroy(child);
        }
        if let Some(node) = built
            && let Err(e) = self.tree.attach(self.root(), node, None)
        {
            self.tree.destroy(node);
            return Err(e);
        }
        info!("layout loaded");
        self.finish_change();
        self.events.send(LayoutEvent::TreeChanged);
        Ok(())
    }

    pub fn to_config(&self) -> LayoutConfig {
        let content = self
            .tree
            .children(self.root())
            .into_iter()
            .filter_map(|c| item_config::export(&self.tree, c))
            .collect();
        LayoutConfig { content }
    }

    /// Creates the items described by `config` without attaching them.
    pub fn create_item(&mut self, config: &ItemConfig) -> Result<NodeId> {
        item_config::build(&mut self.tree, config)
    }

    pub fn add_child(&mut self, parent: NodeId, item: NodeId, index: Option<usize>) -> Result<()> {
        self.tree.add_child(parent, item, index)?;
        self.tree_changed();
        Ok(())
    }

    pub fn remove_child(&mut self, item: NodeId, keep_item: bool) -> Result<()> {
        self.tree.remove_child(item, keep_item)?;
        self.tree_changed();
        Ok(())
    }

    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        self.tree.replace_child(old, new)?;
        self.tree_changed();
        Ok(())
    }

    pub fn set_parent(&mut self, item: NodeId, parent: NodeId) -> Result<()> {
        self.tree.set_parent(item, parent)?;
        self.finish_change();
        Ok(())
    }

    /// Adds a component under `parent`. A stack takes it as a new tab;
    /// anywhere else it gets a stack of its own.
    pub fn add_component(
        &mut self,
        parent: NodeId,
        config: &ItemConfig,
        index: Option<usize>,
    ) -> Result<NodeId> {
        if config.kind != ItemType::Component {
            return Err(DockError::InvalidConfig(format!("{} is not a component", config.kind)));
        }
        let parent_type = self.tree.item_type(parent).ok_or(DockError::ItemNotFound(parent))?;
        let component = if parent_type == ItemType::Stack {
            let component = item_config::build(&mut self.tree, config)?;
            if let Err(e) = self.tree.add_child(parent, component, index) {
                self.tree.destroy(component);
                return Err(e);
            }
            component
        } else {
            let stack = item_config::build(&mut self.tree, &config.wrapped_in_stack())?;
            if let Err(e) = self.tree.add_child(parent, stack, index) {
                self.tree.destroy(stack);
                return Err(e);
            }
            match self.tree.children(stack).first() {
                Some(&component) => component,
                None => return Err(DockError::InvariantViolation("empty component stack".into())),
            }
        };
        self.tree_changed();
        Ok(component)
    }

    /// Removes a closable item and everything below it.
    pub fn close_item(&mut self, item: NodeId) -> Result<()> {
        let info = self.tree.info(item).ok_or(DockError::ItemNotFound(item))?;
        if !info.is_closable {
            return Err(DockError::NotClosable(item));
        }
        self.remove_child(item, false)
    }

    /// Removes an item whether or not it is closable.
    pub fn destroy(&mut self, item: NodeId) -> Result<()> {
        if !self.tree.contains(item) {
            return Err(DockError::ItemNotFound(item));
        }
        if item == self.root() {
            return Err(DockError::NotClosable(item));
        }
        if self.tree.parent(item).is_some() {
            self.tree.remove_child(item, false)?;
        } else {
            self.tree.destroy(item);
        }
        self.tree_changed();
        Ok(())
    }

    pub fn set_title(&mut self, item: NodeId, title: &str) -> Result<()> {
        let info = self.tree.info_mut(item).ok_or(DockError::ItemNotFound(item))?;
        let ItemKind::Component(component) = &mut info.kind else {
            return Err(DockError::InvariantViolation(format!("{item:?} has no title")));
        };
        if component.title != title {
            component.title = title.to_owned();
            self.events.send(LayoutEvent::TitleChanged { item, title: title.to_owned() });
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> { self.tree.find_by_id(id) }

    pub fn components(&self) -> Vec<NodeId> { self.tree.components() }

    fn require_stack(&self, stack: NodeId) -> Result<()> {
        match self.tree.item_type(stack) {
            Some(ItemType::Stack) => Ok(()),
            Some(_) => Err(DockError::NotAStack(stack)),
            None => Err(DockError::ItemNotFound(stack)),
        }
    }

    pub fn active_item(&self, stack: NodeId) -> Option<NodeId> { self.tree.active_tab(stack) }

    pub fn active_item_index(&self, stack: NodeId) -> Option<usize> {
        self.active_item(stack).and_then(|item| self.tree.index_of(item))
    }

    /// Makes `item` the active tab of `stack`. Does nothing if it already is.
    pub fn set_active_item(&mut self, stack: NodeId, item: NodeId) -> Result<()> {
        self.require_stack(stack)?;
        if self.tree.parent(item) != Some(stack) {
            return Err(DockError::InvariantViolation(format!(
                "{item:?} is not a tab of {stack:?}"
            )));
        }
        if self.tree.activate(item) {
            self.finish_change();
        }
        Ok(())
    }

    /// Moves the tab strip of `stack` to `side`, or hides it with `None`.
    pub fn set_header_side(&mut self, stack: NodeId, side: Option<Side>) -> Result<()> {
        self.require_stack(stack)?;
        if let Some(ItemKind::Stack(info)) = self.tree.info_mut(stack).map(|i| &mut i.kind) {
            info.header = side;
        }
        self.tree_changed();
        Ok(())
    }

    /// Docks or undocks `stack`. Only stacks inside a row or column can be
    /// docked, and never the last undocked child there. Returns whether the
    /// state changed.
    pub fn set_docked(&mut self, stack: NodeId, docked: bool) -> Result<bool> {
        self.require_stack(stack)?;
        if self.tree.is_docked(stack) == docked {
            return Ok(false);
        }
        if docked {
            let Some(parent) = self.tree.parent(stack) else { return Ok(false) };
            if !self.tree.item_type(parent).is_some_and(ItemType::is_row_or_column) {
                debug!(?stack, "only stacks in a row or column can be docked");
                return Ok(false);
            }
            let others_flexible = self
                .tree
                .visible_children(parent)
                .any(|c| c != stack && !self.tree.is_docked(c));
            if !others_flexible {
                debug!(?stack, "refusing to dock the last flexible child");
                return Ok(false);
            }
        }
        if let Some(ItemKind::Stack(info)) = self.tree.info_mut(stack).map(|i| &mut i.kind) {
            info.docked = docked;
        }
        self.tree_changed();
        Ok(true)
    }

    /// Lays the tree out into `bounds` and rebuilds the drop areas.
    pub fn update_size(&mut self, bounds: Rect) {
        trace!(?bounds, "update_size");
        self.container = Some(bounds);
        self.finish_change();
        self.rebuild_areas();
    }

    pub fn rebuild_areas(&mut self) {
        let geometry = geometry_of(&self.host_geometry, &self.computed);
        self.areas.rebuild(&self.tree, geometry, &self.settings.drop);
    }

    pub fn areas(&self) -> &[Area] { self.areas.areas() }

    pub fn find_area_at(&self, x: f64, y: f64) -> Option<Area> { self.areas.query(x, y) }

    pub fn highlight_drop_zone(&self, x: f64, y: f64, area: &Area) -> Highlight {
        stack::highlight_drop_zone(x, y, area, &self.tree, self.geometry(), &self.settings.drop)
    }

    pub fn drag_session(&self) -> Option<&DragSession> { self.drag.as_ref() }

    /// Starts dragging a component out of its stack.
    pub fn start_drag(&mut self, item: NodeId, x: f64, y: f64) -> Result<()> {
        if self.drag.is_some() {
            return Err(DockError::DragInProgress);
        }
        let info = self.tree.info(item).ok_or(DockError::ItemNotFound(item))?;
        let Some(component) = info.kind.as_component().filter(|c| c.reorder_enabled) else {
            return Err(DockError::NotDraggable(item));
        };
        let title = component.title.clone();
        let (Some(parent), Some(index)) = (self.tree.parent(item), self.tree.index_of(item)) else {
            return Err(DockError::NotDraggable(item));
        };
        if !self.tree.is_attached(item) {
            return Err(DockError::NotDraggable(item));
        }
        let Some(bounds) = self.geometry().container_bounds() else {
            return Err(DockError::MissingGeometry("container bounds".into()));
        };
        let header = self.tree.info(parent).and_then(|i| i.kind.as_stack()).and_then(|s| s.header);

        let was_active = self.tree.undisplay(item);
        debug!(?item, ?parent, index, was_active, "drag started");
        self.finish_change();
        self.rebuild_areas();

        let proxy = DragProxy::new(title, header, Point::new(x, y), &self.settings.dimensions);
        let origin = Origin { parent, index, was_active };
        self.begin(DragSession::new(
            item,
            Some(origin),
            proxy,
            bounds,
            self.settings.constrain_drag_to_container,
        ));
        Ok(())
    }

    /// Starts dragging a new component from outside the layout. If it is
    /// released over no target it is destroyed.
    pub fn start_external_drag(&mut self, config: &ItemConfig, x: f64, y: f64) -> Result<NodeId> {
        if self.drag.is_some() {
            return Err(DockError::DragInProgress);
        }
        if config.kind != ItemType::Component {
            return Err(DockError::InvalidConfig(format!("{} is not a component", config.kind)));
        }
        let Some(bounds) = self.geometry().container_bounds() else {
            return Err(DockError::MissingGeometry("container bounds".into()));
        };
        let item = item_config::build(&mut self.tree, config)?;
        debug!(?item, "external drag started");
        self.rebuild_areas();

        let proxy = DragProxy::new(
            config.title.clone(),
            Some(Side::Top),
            Point::new(x, y),
            &self.settings.dimensions,
        );
        self.begin(DragSession::new(
            item,
            None,
            proxy,
            bounds,
            self.settings.constrain_drag_to_container,
        ));
        Ok(item)
    }

    fn begin(&mut self, mut session: DragSession) {
        let position = session.proxy().position;
        let geometry = geometry_of(&self.host_geometry, &self.computed);
        session.on_move(
            (0.0, 0.0),
            (position.x, position.y),
            &self.areas,
            &self.tree,
            geometry,
            &self.settings.drop,
        );
        let item = session.item();
        self.drag = Some(session);
        self.events.send(LayoutEvent::DragStarted(item));
    }

    /// Feeds a pointer move to the current drag. Returns false if the move
    /// was ignored.
    pub fn drag_move(&mut self, dx: f64, dy: f64, x: f64, y: f64) -> Result<bool> {
        let Some(session) = self.drag.as_mut() else {
            return Err(DockError::NoActiveDrag);
        };
        let geometry = geometry_of(&self.host_geometry, &self.computed);
        let settings = &self.settings.drop;
        Ok(session.on_move((dx, dy), (x, y), &self.areas, &self.tree, geometry, settings))
    }

    /// Ends the current drag and splices the item into the tree.
    ///
    /// If the drop fails the tree is left as before the drag started, the
    /// item goes back home (or is destroyed if it came from outside) and the
    /// error is returned.
    pub fn drag_stop(&mut self) -> Result<DropOutcome> {
        let session = self.drag.take().ok_or(DockError::NoActiveDrag)?;
        let item = session.item();
        self.tree.set_displayed(item, true);
        let origin = session.origin().filter(|o| match self.tree.set_parent(item, o.parent) {
            Ok(()) => true,
            Err(e) => {
                warn!(?item, "original parent lost during drag: {e}");
                false
            }
        });

        let outcome = match session.finish() {
            DropPlan::Target(target) => match self.apply_drop(item, target, origin) {
                Ok(()) => DropOutcome::Dropped(target),
                Err(e) => {
                    warn!(?item, ?target, "drop failed: {e}");
                    self.return_home(item, origin);
                    self.finish_change();
                    self.rebuild_areas();
                    self.events.send(LayoutEvent::DragAborted(item));
                    return Err(e);
                }
            },
            DropPlan::ReturnHome(_) if origin.is_some() => {
                self.return_home(item, origin);
                DropOutcome::Returned
            }
            DropPlan::ReturnHome(_) | DropPlan::Destroy => {
                self.tree.destroy(item);
                DropOutcome::Destroyed
            }
        };
        debug!(?item, ?outcome, "drag finished");
        if let Some(origin) = origin {
            self.tree.collapse_from(origin.parent);
        }
        self.finish_change();
        self.rebuild_areas();
        self.events.send(LayoutEvent::ItemDropped(item));
        self.events.send(LayoutEvent::TreeChanged);
        Ok(outcome)
    }

    fn return_home(&mut self, item: NodeId, origin: Option<Origin>) {
        if !self.tree.contains(item) {
            return;
        }
        let Some(origin) = origin.filter(|o| self.tree.contains(o.parent)) else {
            self.tree.destroy(item);
            return;
        };
        let active = self.tree.active_tab(origin.parent).filter(|&a| a != item);
        match self.tree.attach(origin.parent, item, Some(origin.index)) {
            Ok(()) => {
                if !origin.was_active
                    && let Some(active) = active
                {
                    self.tree.activate(active);
                }
                self.tree.set_displayed(item, true);
            }
            Err(e) => {
                warn!(?item, "could not return item home: {e}");
                self.tree.destroy(item);
            }
        }
    }

    fn validate_drop(&self, item: NodeId, target: Target) -> Result<()> {
        let ty = self.tree.item_type(target.item).ok_or(DockError::ItemNotFound(target.item))?;
        if !self.tree.is_attached(target.item) || target.item == item {
            return Err(DockError::InvariantViolation(format!(
                "stale drop target {:?}",
                target.item
            )));
        }
        match target.zone {
            DropZone::Header { .. } | DropZone::Center => {
                self.require_stack(target.item)?;
                self.tree.check_attach(target.item, item)
            }
            DropZone::Split(_) => {
                self.require_stack(target.item)?;
                match self.tree.parent(target.item) {
                    Some(_) => Ok(()),
                    None => Err(DockError::InvariantViolation("split target has no parent".into())),
                }
            }
            DropZone::Between { index } => {
                if !ty.is_row_or_column() {
                    return Err(DockError::InvalidChild { parent: ty, child: ItemType::Stack });
                }
                let len = self.tree.children(target.item).len();
                if index > len {
                    return Err(DockError::InvariantViolation(format!(
                        "insert position {index} past {len} children"
                    )));
                }
                Ok(())
            }
            DropZone::RootEdge(_) | DropZone::RootEmpty => {
                if target.item != self.root() {
                    return Err(DockError::InvariantViolation(format!(
                        "{:?} is not the root",
                        target.item
                    )));
                }
                match target.zone {
                    DropZone::RootEdge(_) if self.tree.children(self.root()).is_empty() => {
                        Err(DockError::InvariantViolation("root has no content".into()))
                    }
                    DropZone::RootEmpty if self.tree.components().iter().any(|&c| c != item) => {
                        Err(DockError::InvariantViolation("layout is not empty".into()))
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    /// True if taking `item` out of `parent` collapses everything up to the
    /// root.
    fn empties_root(&self, item: NodeId, parent: NodeId) -> bool {
        if self.tree.children(parent) != [item] {
            return false;
        }
        let mut node = parent;
        loop {
            if !self.tree.info(node).is_some_and(|i| i.is_closable) {
                return false;
            }
            let Some(up) = self.tree.parent(node) else { return false };
            if up == self.root() {
                return true;
            }
            if self.tree.children(up).len() != 1 {
                return false;
            }
            node = up;
        }
    }

    /// The first container left below the root of a layout that shows
    /// nothing, stacks before rows and columns. None if dropping `item`
    /// there leaves the root bare.
    fn hollow_host(&self, item: NodeId, origin: Option<Origin>) -> Option<NodeId> {
        if origin.is_some_and(|o| self.empties_root(item, o.parent)) {
            return None;
        }
        let root = self.root();
        let below: Vec<_> = root.traverse_preorder(self.tree.map()).skip(1).collect();
        let of_type = |pred: fn(ItemType) -> bool| {
            below.iter().copied().find(|&n| self.tree.item_type(n).is_some_and(pred))
        };
        of_type(|ty| ty == ItemType::Stack).or_else(|| of_type(ItemType::is_row_or_column))
    }

    fn apply_drop(&mut self, item: NodeId, target: Target, origin: Option<Origin>) -> Result<()> {
        self.validate_drop(item, target)?;
        debug!(?item, ?target, "applying drop");
        match target.zone {
            DropZone::Header { index } => self.tree.attach(target.item, item, Some(index)),
            DropZone::Center => self.tree.attach(target.item, item, None),
            DropZone::RootEmpty => match self.hollow_host(item, origin) {
                Some(host) if self.tree.item_type(host) == Some(ItemType::Stack) => {
                    debug!(?host, "dropping into a stack with nothing shown");
                    self.tree.attach(host, item, None)
                }
                host => self.drop_in_new_stack(item, target, origin, host),
            },
            _ => self.drop_in_new_stack(item, target, origin, None),
        }
    }

    fn drop_in_new_stack(
        &mut self,
        item: NodeId,
        target: Target,
        origin: Option<Origin>,
        host: Option<NodeId>,
    ) -> Result<()> {
        let stack = self.tree.create(ItemKind::stack());
        if let Err(e) = self.tree.attach(stack, item, None) {
            self.tree.destroy(stack);
            return Err(e);
        }
        if let Err(e) = self.place_new_stack(stack, target, origin, host) {
            self.tree.remove_child(item, true)?;
            self.tree.destroy(stack);
            return Err(e);
        }
        Ok(())
    }

    fn place_new_stack(
        &mut self,
        stack: NodeId,
        target: Target,
        origin: Option<Origin>,
        host: Option<NodeId>,
    ) -> Result<()> {
        let ratio = self.settings.drop.drop_split_ratio;
        match target.zone {
            DropZone::Split(side) => {
                let parent = self.tree.parent(target.item).ok_or_else(|| {
                    DockError::InvariantViolation("split target has no parent".into())
                })?;
                let parent_axis = self.tree.item_type(parent).and_then(ItemType::orientation);
                if parent_axis == Some(side.orientation()) {
                    self.tree.insert_beside(target.item, stack, !side.is_leading(), ratio)
                } else {
                    self.tree
                        .wrap(target.item, stack, side.orientation(), side.is_leading(), ratio)
                        .map(|_| ())
                }
            }
            DropZone::Between { index } => self.tree.attach(target.item, stack, Some(index)),
            DropZone::RootEdge(side) => {
                let Some(content) = self.tree.children(self.root()).first().copied() else {
                    return Err(DockError::InvariantViolation("root has no content".into()));
                };
                let axis = side.orientation();
                if self.tree.item_type(content).and_then(ItemType::orientation) == Some(axis) {
                    let index =
                        if side.is_leading() { 0 } else { self.tree.children(content).len() };
                    self.tree.attach(content, stack, Some(index))?;
                    self.give_share(content, stack, axis, ratio);
                    Ok(())
                } else {
                    self.tree.wrap(content, stack, axis, side.is_leading(), ratio).map(|_| ())
                }
            }
            DropZone::RootEmpty => {
                if let Some(origin) = origin {
                    self.tree.collapse_from(origin.parent);
                }
                self.tree.attach(host.unwrap_or(self.root()), stack, None)
            }
            DropZone::Header { .. } | DropZone::Center => Ok(()),
        }
    }

    /// Gives `item` `ratio` of `container` and scales its siblings into the
    /// rest.
    fn give_share(&mut self, container: NodeId, item: NodeId, axis: Orientation, ratio: f64) {
        let siblings: Vec<_> =
            self.tree.children(container).into_iter().filter(|&c| c != item).collect();
        let total: f64 = siblings.iter().map(|&c| self.tree.share(c, axis)).sum();
        if siblings.is_empty() || total <= 0.0 {
            return;
        }
        for sibling in siblings {
            let share = self.tree.share(sibling, axis) * 100.0 * (1.0 - ratio) / total;
            self.tree.set_share(sibling, axis, share);
        }
        self.tree.set_share(item, axis, 100.0 * ratio);
    }

    fn tree_changed(&mut self) {
        self.finish_change();
        if self.drag.is_none() {
            self.rebuild_areas();
        }
        self.events.send(LayoutEvent::TreeChanged);
    }

    /// Reports what the last tree edit changed: destroyed items, active tab
    /// switches, new sizes and visibility.
    fn finish_change(&mut self) {
        for node in self.tree.take_destroyed() {
            self.shown.remove(node);
            self.frames.remove(node);
            self.events.send(LayoutEvent::ItemDestroyed(node));
        }
        for stack in self.tree.take_active_changes() {
            if self.tree.item_type(stack) == Some(ItemType::Stack) {
                let active = self.tree.active_tab(stack);
                self.events.send(LayoutEvent::ActiveTabChanged { stack, active });
            }
        }
        self.relayout();
        self.report_visibility();
    }

    fn relayout(&mut self) {
        let Some(container) = self.container else { return };
        let (geometry, updates) =
            ComputedGeometry::compute(&self.tree, container, &self.settings.dimensions);
        for update in updates {
            let axis = self
                .tree
                .parent(update.node)
                .and_then(|p| self.tree.item_type(p))
                .and_then(ItemType::orientation);
            if let Some(axis) = axis {
                trace!(node = ?update.node, share = update.share, "share follows minimum size");
                self.tree.set_share(update.node, axis, update.share);
            }
        }
        self.computed = geometry;

        let frames: Vec<_> = self.computed.frames().map(|(node, f)| (node, f.item)).collect();
        for (item, frame) in frames {
            if self.frames.insert(item, frame).is_none_or(|old| !old.is_within(0.5, frame)) {
                self.events.send(LayoutEvent::ItemResized { item, frame });
            }
        }
    }

    fn report_visibility(&mut self) {
        let mut order = Vec::new();
        let mut pending = vec![self.root()];
        while let Some(node) = pending.pop() {
            order.push(node);
            let children: Vec<_> = self.tree.visible_children(node).collect();
            pending.extend(children.into_iter().rev());
        }
        let visible: SecondaryMap<NodeId, ()> = order.iter().map(|&n| (n, ())).collect();
        let hidden: Vec<_> = self.shown.keys().filter(|&n| !visible.contains_key(n)).collect();
        for node in hidden {
            self.shown.remove(node);
            self.frames.remove(node);
            if self.tree.contains(node) {
                self.events.send(LayoutEvent::ItemHidden(node));
            }
        }
        for node in order {
            if self.shown.insert(node, ()).is_none() {
                self.events.send(LayoutEvent::ItemShown(node));
            }
        }
    }
}
