//! Keybase CLI - named signing keys, encrypted at rest
//!
//! Command-line front end for `keybase-core`: key creation and recovery,
//! signing, passphrase rotation, and armored import/export.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod ui;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands as cmd;
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::ui::print_error;

fn main() {
    let cli = Cli::parse();
    init_tracing();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx) {
        let ui_ctx = ctx.ui(false, None);
        let err = CliError::from_anyhow(&e);
        tracing::debug!(code = err.code, error = %format!("{:#}", e), "command failed");
        print_error(&ui_ctx, &err.message, err.hint.as_deref());
        std::process::exit(err.code);
    }
}

/// Logs go to stderr; `KEYBASE_LOG` takes an `EnvFilter` directive.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(env_vars::LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(ctx: &AppContext) -> anyhow::Result<()> {
    match &ctx.cli().command {
        Some(Commands::Init(args)) => cmd::handle_init(ctx, args),
        Some(Commands::Add(args)) => cmd::handle_add(ctx, args),
        Some(Commands::AddOffline(args)) => cmd::handle_add_offline(ctx, args),
        Some(Commands::AddMulti(args)) => cmd::handle_add_multi(ctx, args),
        Some(Commands::List(args)) => cmd::handle_list(ctx, args),
        Some(Commands::Show(args)) => cmd::handle_show(ctx, args),
        Some(Commands::Delete(args)) => cmd::handle_delete(ctx, args),
        Some(Commands::Update(args)) => cmd::handle_update(ctx, args),
        Some(Commands::Sign(args)) => cmd::handle_sign(ctx, args),
        Some(Commands::Export(args)) => cmd::handle_export(ctx, args),
        Some(Commands::Import(args)) => cmd::handle_import(ctx, args),
        Some(Commands::Completions(args)) => cmd::handle_completions(args.shell),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
