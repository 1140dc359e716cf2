use keybase_core::{MultisigThreshold, PublicKey};

use crate::app::AppContext;
use crate::cli::AddMultiArgs;
use crate::errors::CliError;

use super::report_record;

pub fn handle_add_multi(ctx: &AppContext, args: &AddMultiArgs) -> anyhow::Result<()> {
    let keybase = ctx.keybase()?;

    let mut members = Vec::with_capacity(args.keys.len());
    for name in &args.keys {
        let record = keybase.get(name)?;
        if matches!(record.public_key(), PublicKey::Multisig(_)) {
            return Err(CliError::invalid_input(format!(
                "'{}' is itself a multisig key and cannot be a member",
                name
            ))
            .into());
        }
        members.push(record.public_key().clone());
    }

    let threshold = MultisigThreshold::new(args.threshold, members)
        .map_err(|e| CliError::invalid_input(e.to_string()))?;
    let record = keybase.create_multi(&args.name, PublicKey::Multisig(threshold))?;
    report_record(&ctx.ui(false, None), "Multisig key added", &record, ctx.quiet())
}
