//! Reusable UI components.

mod filter_input;
mod hints;
mod spinner;
mod toast;

pub use filter_input::{FilterInput, InputOutcome};
pub use hints::{hint_spans, FILTER_HINTS, TABLE_HINTS, VIEWER_HINTS};
pub use spinner::Spinner;
pub use toast::{Toast, ToastKind, Toasts};
