//! Output formatting for key records.

mod json;
mod text;

pub use json::{record_json, records_json};
pub use text::{print_record, record_rows, RECORD_COLUMNS};
