use keybase_core::{Address, KeybaseError};

use crate::app::AppContext;
use crate::cli::ShowArgs;
use crate::output::{print_record, record_json};

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let keybase = ctx.keybase()?;

    let record = match keybase.get(&args.name) {
        Err(KeybaseError::NotFound(_)) if args.name.parse::<Address>().is_ok() => {
            let address: Address = args.name.parse()?;
            keybase.get_by_address(&address)?
        }
        other => other?,
    };

    let ui = ctx.ui(args.json, None);
    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&record_json(&record))?);
    } else {
        print_record(&ui, &record);
    }
    Ok(())
}
