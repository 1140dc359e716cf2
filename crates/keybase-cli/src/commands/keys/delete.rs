use dialoguer::Confirm;
use keybase_core::RecordKind;

use crate::app::{with_passphrase_retry, AppContext};
use crate::cli::DeleteArgs;
use crate::errors::CliError;
use crate::ui::{print, receipt};

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let keybase = ctx.keybase()?;
    let record = keybase.get(&args.name)?;
    let ui = ctx.ui(false, None);

    if !args.yes {
        if !ctx.interactive() {
            return Err(CliError::invalid_input(
                "Refusing to delete without confirmation. Pass --yes.",
            )
            .into());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete key '{}'?", args.name))
            .default(false)
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))?;
        if !confirmed {
            print(&ui, "Aborted.");
            return Ok(());
        }
    }

    if matches!(record.kind(), RecordKind::Local { .. }) && !args.force {
        with_passphrase_retry(ctx.interactive(), |passphrase| {
            keybase.delete(&args.name, passphrase, false)
        })?;
    } else {
        keybase.delete(&args.name, "", true)?;
    }

    if !ctx.quiet() {
        print(&ui, &receipt(&ui, "Key deleted", &[("Name", args.name.as_str())]));
    }
    Ok(())
}
