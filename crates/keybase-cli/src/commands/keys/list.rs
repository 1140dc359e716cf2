use crate::app::AppContext;
use crate::cli::ListArgs;
use crate::output::{record_rows, records_json, RECORD_COLUMNS};
use crate::ui::{badge, header, hint, print, table, Badge};

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let records = ctx.keybase()?.list()?;
    let ui = ctx.ui(args.json, args.format.as_deref());

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&records_json(&records))?);
        return Ok(());
    }

    if records.is_empty() {
        if !ctx.quiet() {
            print(&ui, &badge(&ui, Badge::Info, "No keys found."));
            print(&ui, &hint(&ui, "keybase add <name>"));
        }
        return Ok(());
    }

    if ui.mode.is_pretty() && !ctx.quiet() {
        let count = format!("{} key{}", records.len(), if records.len() == 1 { "" } else { "s" });
        print(&ui, &header(&ui, "list", Some(count.as_str())));
    }
    print(&ui, &table(&ui, &RECORD_COLUMNS, &record_rows(&records)));
    Ok(())
}
