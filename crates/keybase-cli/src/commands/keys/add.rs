use keybase_core::{DerivationPath, Language};

use crate::app::{prompt_new_passphrase, AppContext};
use crate::cli::AddArgs;
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::helpers::{parse_algo, parse_path, read_mnemonic};
use crate::ui::{badge, print, Badge};

use super::report_record;

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let options = &ctx.config()?.options;
    let keybase = ctx.keybase()?;
    let algo = parse_algo(args.algo.as_deref(), options.default_algo)?;
    let ui = ctx.ui(args.json, None);

    if args.ledger {
        let record = keybase.create_ledger(&args.name, algo, &args.hrp, args.account, args.index)?;
        return report_record(&ui, "Hardware key registered", &record, ctx.quiet());
    }

    if !args.recover && (args.account != 0 || args.index != 0) {
        return Err(CliError::invalid_input(
            "--account and --index apply to --recover and --ledger; new mnemonics start at 0/0",
        )
        .into());
    }

    let passphrase = prompt_new_passphrase(
        ctx.interactive(),
        env_vars::PASSPHRASE,
        "Passphrase for the new key",
    )?;

    if args.recover {
        let mnemonic = read_mnemonic(ctx.interactive())?;
        let bip39_passphrase = std::env::var(env_vars::BIP39_PASSPHRASE).unwrap_or_default();
        let record = match args.path.as_deref() {
            Some(path) => keybase.derive(
                &args.name,
                &mnemonic,
                &bip39_passphrase,
                &passphrase,
                &parse_path(path)?,
                algo,
            )?,
            None if algo == options.default_algo => keybase.create_account(
                &args.name,
                &mnemonic,
                &bip39_passphrase,
                &passphrase,
                args.account,
                args.index,
            )?,
            None => {
                let path = DerivationPath::bip44(options.coin_type, args.account, args.index)?;
                keybase.derive(
                    &args.name,
                    &mnemonic,
                    &bip39_passphrase,
                    &passphrase,
                    &path,
                    algo,
                )?
            }
        };
        return report_record(&ui, "Key recovered", &record, ctx.quiet());
    }

    let (record, mnemonic) =
        keybase.create_mnemonic(&args.name, Language::English, &passphrase, algo)?;

    if ui.mode.is_json() {
        let mut value = crate::output::record_json(&record);
        value["mnemonic"] = serde_json::Value::String(mnemonic.phrase().to_string());
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    report_record(&ui, "Key created", &record, ctx.quiet())?;
    print(
        &ui,
        &badge(
            &ui,
            Badge::Warn,
            "Write down this mnemonic. It is the only way to recover the key.",
        ),
    );
    println!("{}", mnemonic.phrase());
    Ok(())
}
