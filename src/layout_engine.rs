mod area;
mod drag;
pub mod engine;
pub mod geometry;
pub(crate) mod graph;
mod item_config;
pub mod sizing;
mod stack;

pub use area::{Area, AreaIndex, AreaSide};
pub use drag::{DragProxy, DragSession, DropPlan, Origin};
pub use engine::{DropOutcome, LayoutManager};
pub use geometry::{ComputedGeometry, GeometryProvider, ItemFrame, Point, Rect, Region, Size};
pub use graph::{ItemType, Orientation, Side};
pub use item_config::{HeaderConfig, HeaderShow, ItemConfig, LayoutConfig};
pub use stack::{DropZone, Highlight, Target};
