pub mod content;
pub mod item;
pub mod selection;
pub mod tree;

pub use content::{Components, ContentTree};
