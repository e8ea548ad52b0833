//! Application pages.

mod grid;
mod object_viewer;

pub use grid::{GridAction, GridView};
pub use object_viewer::{ObjectViewer, ViewerAction};
