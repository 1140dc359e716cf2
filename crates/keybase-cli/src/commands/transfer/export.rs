use keybase_core::RecordKind;

use crate::app::{prompt_new_passphrase, with_passphrase_retry, AppContext};
use crate::cli::ExportArgs;
use crate::constants::{env_vars, exit_codes};
use crate::errors::CliError;

pub fn handle_export(ctx: &AppContext, args: &ExportArgs) -> anyhow::Result<()> {
    let keybase = ctx.keybase()?;

    let armor = if args.pubkey {
        keybase.export_pub_key(&args.name)?
    } else if args.private {
        let record = keybase.get(&args.name)?;
        if !matches!(record.kind(), RecordKind::Local { .. }) {
            return Err(CliError::new(
                exit_codes::UNSUPPORTED,
                format!("'{}' is a {} key with no private key to export", args.name, record.key_type()),
            )
            .into());
        }
        let export_passphrase = prompt_new_passphrase(
            ctx.interactive(),
            env_vars::EXPORT_PASSPHRASE,
            "Passphrase for the exported key",
        )?;
        with_passphrase_retry(ctx.interactive(), |passphrase| {
            keybase.export_priv_key(&args.name, passphrase, &export_passphrase)
        })?
    } else {
        keybase.export(&args.name)?
    };

    print!("{}", armor);
    Ok(())
}
