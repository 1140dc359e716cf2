use keybase_core::{Keybase, KeybaseOptions};

use crate::app::AppContext;
use crate::cli::InitArgs;
use crate::config::{config_path, default_store_dir, write_config, CliConfig};
use crate::constants::exit_codes;
use crate::errors::CliError;
use crate::helpers::parse_algo;
use crate::ui::{hint, print, receipt};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let home = ctx.home()?.clone();
    let path = config_path(&home);
    if path.exists() && !args.force {
        return Err(CliError::new(
            exit_codes::CONFLICT,
            format!("Config already exists at {}", path.display()),
        )
        .with_hint("Pass --force to overwrite it")
        .into());
    }

    let mut options = KeybaseOptions::default();
    if let Some(coin_type) = args.coin_type {
        options.coin_type = coin_type;
    }
    options.default_algo = parse_algo(args.algo.as_deref(), options.default_algo)?;
    let config = CliConfig::new(&args.name, default_store_dir(&home), options);

    let keybase = Keybase::new(config.keybase_config())?;
    let existing = keybase.list()?.len();
    write_config(&path, &config)?;
    tracing::info!(config = %path.display(), "wrote keybase config");

    if ctx.quiet() {
        return Ok(());
    }
    let ui = ctx.ui(false, None);
    let config_display = path.display().to_string();
    let existing_display = existing.to_string();
    print(
        &ui,
        &receipt(
            &ui,
            "Keybase initialized",
            &[
                ("Config", config_display.as_str()),
                ("Store", config.keybase.dir.as_str()),
                ("Keys", existing_display.as_str()),
            ],
        ),
    );
    print(&ui, &hint(&ui, "keybase add <name>"));
    Ok(())
}
