//! UI primitives for the Keybase CLI.
//!
//! - **context**: terminal detection (TTY, width, color, unicode)
//! - **mode**: output mode resolution (json, plain, pretty)
//! - **theme**: badges and color styles
//! - **render**: tables, headers, receipts, hints
//! - **format**: string helpers

mod context;
pub mod format;
mod mode;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use theme::Badge;

pub use render::{badge, header, hint, kv, print, print_error, receipt, table};
