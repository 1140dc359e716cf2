//! Moving keys in and out of the store as armor.

mod export;
mod import;

pub use export::handle_export;
pub use import::handle_import;
