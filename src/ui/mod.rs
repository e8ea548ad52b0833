//! Terminal rendering: the table page, the object viewer page and the
//! components they share.

pub mod components;
mod views;

pub use components::{Spinner, Toasts};
pub use views::{GridAction, GridView, ObjectViewer, ViewerAction};
