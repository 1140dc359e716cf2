use crate::app::{prompt_new_passphrase, with_passphrase_retry, AppContext};
use crate::cli::UpdateArgs;
use crate::constants::env_vars;
use crate::ui::{print, receipt};

pub fn handle_update(ctx: &AppContext, args: &UpdateArgs) -> anyhow::Result<()> {
    let keybase = ctx.keybase()?;
    let interactive = ctx.interactive();

    // Prompts run between store scopes, never inside one.
    let old = with_passphrase_retry(interactive, |passphrase| {
        keybase
            .export_private_key_object(&args.name, passphrase)
            .map(|_| zeroize::Zeroizing::new(passphrase.to_string()))
    })?;
    let new = prompt_new_passphrase(interactive, env_vars::NEW_PASSPHRASE, "New passphrase")?;

    keybase.update(&args.name, &old, || Ok(new.to_string()))?;

    if !ctx.quiet() {
        let ui = ctx.ui(false, None);
        print(
            &ui,
            &receipt(&ui, "Passphrase changed", &[("Name", args.name.as_str())]),
        );
    }
    Ok(())
}
