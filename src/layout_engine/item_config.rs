//! Serializable description of a layout, used to build and export trees.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::graph::{ItemType, Orientation, Side};
use super::sizing::relative_sizes;
use crate::error::{DockError, Result};
use crate::model::ContentTree;
use crate::model::item::{ComponentInfo, ItemKind, StackInfo};
use crate::model::tree::NodeId;

fn yes() -> bool { true }

fn is_true(value: &bool) -> bool { *value }

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LayoutConfig {
    /// At most one item, which becomes the root's child.
    #[serde(default)]
    pub content: Vec<ItemConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemConfig {
    #[serde(rename = "type")]
    pub kind: ItemType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ItemConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub is_closable: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub component_state: Value,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub reorder_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderConfig>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub docked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_item_index: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HeaderConfig {
    pub show: HeaderShow,
}

/// `false` hides the header, `true` shows it on top, a side places it there.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum HeaderShow {
    Flag(bool),
    Side(Side),
}

impl HeaderShow {
    fn side(self) -> Option<Side> {
        match self {
            HeaderShow::Flag(true) => Some(Side::Top),
            HeaderShow::Flag(false) => None,
            HeaderShow::Side(side) => Some(side),
        }
    }
}

impl ItemConfig {
    pub fn new(kind: ItemType) -> ItemConfig {
        ItemConfig {
            kind,
            content: vec![],
            width: None,
            height: None,
            min_width: None,
            min_height: None,
            id: None,
            is_closable: true,
            title: String::new(),
            component_type: None,
            component_state: Value::Null,
            reorder_enabled: true,
            header: None,
            docked: false,
            active_item_index: None,
        }
    }

    pub fn component(component_type: &str, title: &str) -> ItemConfig {
        ItemConfig {
            component_type: Some(component_type.to_owned()),
            title: title.to_owned(),
            ..ItemConfig::new(ItemType::Component)
        }
    }

    pub fn row(content: Vec<ItemConfig>) -> ItemConfig {
        ItemConfig { content, ..ItemConfig::new(ItemType::Row) }
    }

    pub fn column(content: Vec<ItemConfig>) -> ItemConfig {
        ItemConfig { content, ..ItemConfig::new(ItemType::Column) }
    }

    pub fn stack(content: Vec<ItemConfig>) -> ItemConfig {
        ItemConfig { content, ..ItemConfig::new(ItemType::Stack) }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    fn item_kind(&self) -> Result<ItemKind> {
        Ok(match self.kind {
            ItemType::Root => {
                return Err(DockError::InvalidConfig("a root cannot appear in content".into()));
            }
            ItemType::Row => ItemKind::Row,
            ItemType::Column => ItemKind::Column,
            ItemType::Stack => ItemKind::Stack(StackInfo {
                header: self.header.map_or(Some(Side::Top), |h| h.show.side()),
                docked: self.docked,
            }),
            ItemType::Component => {
                let Some(component_type) = self.component_type.clone().filter(|t| !t.is_empty())
                else {
                    return Err(DockError::InvalidConfig(format!(
                        "component {:?} has no component type",
                        self.title
                    )));
                };
                ItemKind::Component(ComponentInfo {
                    title: self.title.clone(),
                    component_type,
                    component_state: self.component_state.clone(),
                    reorder_enabled: self.reorder_enabled,
                })
            }
        })
    }

    /// The stack a bare component is wrapped in when placed outside one.
    pub(crate) fn wrapped_in_stack(&self) -> ItemConfig {
        ItemConfig {
            width: self.width,
            height: self.height,
            content: vec![self.clone()],
            ..ItemConfig::new(ItemType::Stack)
        }
    }
}

/// Builds the items described by `config` without attaching them. On error
/// nothing is left behind in the tree.
pub(crate) fn build(tree: &mut ContentTree, config: &ItemConfig) -> Result<NodeId> {
    let kind = config.item_kind()?;
    let node = tree.create(kind);
    if let Err(e) = fill(tree, node, config) {
        tree.destroy(node);
        return Err(e);
    }
    Ok(node)
}

fn fill(tree: &mut ContentTree, node: NodeId, config: &ItemConfig) -> Result<()> {
    if let Some(info) = tree.info_mut(node) {
        info.min_width = config.min_width;
        info.min_height = config.min_height;
        info.id = config.id.clone();
        info.is_closable = config.is_closable;
    }
    match config.kind {
        ItemType::Component => {
            if !config.content.is_empty() {
                return Err(DockError::InvalidConfig("components cannot have content".into()));
            }
        }
        ItemType::Stack => {
            for child in &config.content {
                if child.kind != ItemType::Component {
                    return Err(DockError::InvalidChild {
                        parent: ItemType::Stack,
                        child: child.kind,
                    });
                }
                let child = build(tree, child)?;
                if let Err(e) = tree.attach(node, child, None) {
                    tree.destroy(child);
                    return Err(e);
                }
            }
            let tabs = tree.children(node);
            let active = config.active_item_index.unwrap_or(0);
            if let Some(&tab) = tabs.get(active) {
                tree.activate(tab);
            } else if !tabs.is_empty() {
                return Err(DockError::InvalidConfig(format!(
                    "active item index {active} out of range for {} tabs",
                    tabs.len()
                )));
            }
        }
        ItemType::Row | ItemType::Column | ItemType::Root => {
            for child in &config.content {
                let child = if child.kind == ItemType::Component {
                    debug!(title = %child.title, "wrapping bare component in a stack");
                    build(tree, &child.wrapped_in_stack())?
                } else {
                    build(tree, child)?
                };
                if let Err(e) = tree.attach(node, child, None) {
                    tree.destroy(child);
                    return Err(e);
                }
            }
            if let Some(orientation) = config.kind.orientation() {
                let specified: Vec<_> = config
                    .content
                    .iter()
                    .map(|c| match orientation {
                        Orientation::Horizontal => c.width,
                        Orientation::Vertical => c.height,
                    })
                    .collect();
                let children = tree.children(node);
                for (child, share) in children.into_iter().zip(relative_sizes(&specified)) {
                    tree.set_share(child, orientation, share);
                }
            }
        }
    }
    Ok(())
}

/// Describes the subtree at `node`.
pub(crate) fn export(tree: &ContentTree, node: NodeId) -> Option<ItemConfig> {
    let info = tree.info(node)?;
    let mut config = ItemConfig::new(info.kind.item_type());
    config.width = Some(info.width);
    config.height = Some(info.height);
    config.min_width = info.min_width;
    config.min_height = info.min_height;
    config.id = info.id.clone();
    config.is_closable = info.is_closable;
    match &info.kind {
        ItemKind::Stack(stack) => {
            config.header = match stack.header {
                Some(Side::Top) => None,
                Some(side) => Some(HeaderConfig { show: HeaderShow::Side(side) }),
                None => Some(HeaderConfig { show: HeaderShow::Flag(false) }),
            };
            config.docked = stack.docked;
            config.active_item_index =
                tree.active_tab(node).and_then(|active| tree.index_of(active));
        }
        ItemKind::Component(component) => {
            config.title = component.title.clone();
            config.component_type = Some(component.component_type.clone());
            config.component_state = component.component_state.clone();
            config.reorder_enabled = component.reorder_enabled;
        }
        ItemKind::Root | ItemKind::Row | ItemKind::Column => {}
    }
    config.content = tree.children(node).into_iter().filter_map(|c| export(tree, c)).collect();
    Some(config)
}
