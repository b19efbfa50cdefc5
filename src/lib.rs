//! Docking layout tree with tabbed stacks and drag-and-drop re-docking.
//!
//! The [`layout_engine::LayoutManager`] owns a tree of rows, columns, stacks
//! and components, hit-tests pointer positions against drop areas while an
//! item is dragged, and splices the item into the tree on release.

pub mod common;
pub mod error;
pub mod event;
pub mod layout_engine;
pub mod model;

pub use error::{DockError, Result};
pub use event::{EventReceiver, EventSender, LayoutEvent};
pub use layout_engine::LayoutManager;
