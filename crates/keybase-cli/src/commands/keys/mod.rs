//! Key lifecycle commands.

mod add;
mod add_multi;
mod add_offline;
mod delete;
mod list;
mod show;
mod update;

pub use add::handle_add;
pub use add_multi::handle_add_multi;
pub use add_offline::handle_add_offline;
pub use delete::handle_delete;
pub use list::handle_list;
pub use show::handle_show;
pub use update::handle_update;

use keybase_core::KeyRecord;

use crate::output::record_json;
use crate::ui::{print, receipt, UiContext};

/// Print the outcome of a command that stored a record.
pub(crate) fn report_record(
    ui: &UiContext,
    title: &str,
    record: &KeyRecord,
    quiet: bool,
) -> anyhow::Result<()> {
    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&record_json(record))?);
        return Ok(());
    }
    let address = record.address().to_string();
    if quiet {
        println!("{}", address);
        return Ok(());
    }
    print(
        ui,
        &receipt(
            ui,
            title,
            &[
                ("Name", record.name()),
                ("Type", record.key_type().as_str()),
                ("Address", address.as_str()),
            ],
        ),
    );
    Ok(())
}
