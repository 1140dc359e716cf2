use crate::app::{with_passphrase_retry, AppContext};
use crate::cli::ImportArgs;
use crate::commands::keys::report_record;
use crate::helpers::read_input;

pub fn handle_import(ctx: &AppContext, args: &ImportArgs) -> anyhow::Result<()> {
    let keybase = ctx.keybase()?;
    let armor = read_input(&args.file)?;

    let record = if args.pubkey {
        keybase.import_pub_key(&args.name, &armor)?
    } else if args.private {
        with_passphrase_retry(ctx.interactive(), |passphrase| {
            keybase.import_priv_key(&args.name, &armor, passphrase)
        })?
    } else {
        keybase.import(&args.name, &armor)?
    };

    report_record(&ctx.ui(false, None), "Key imported", &record, ctx.quiet())
}
