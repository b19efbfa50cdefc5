use thiserror::Error;

use crate::layout_engine::ItemType;
use crate::model::tree::NodeId;

pub type Result<T, E = DockError> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DockError {
    #[error("Item not found: {0:?}")]
    ItemNotFound(NodeId),
    #[error("Moving {item:?} under {parent:?} would create a cycle")]
    Cycle { item: NodeId, parent: NodeId },
    #[error("A {child} cannot be placed inside a {parent}")]
    InvalidChild { parent: ItemType, child: ItemType },
    #[error("Item {0:?} is not a stack")]
    NotAStack(NodeId),
    #[error("Item {0:?} is not closable")]
    NotClosable(NodeId),
    #[error("Item {0:?} cannot be dragged")]
    NotDraggable(NodeId),
    #[error("A drag is already in progress")]
    DragInProgress,
    #[error("No drag is in progress")]
    NoActiveDrag,
    #[error("Missing geometry: {0}")]
    MissingGeometry(String),
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
