//! Application context for the Keybase CLI.
//!
//! Combines CLI arguments with lazily-loaded configuration.

use std::io::IsTerminal;
use std::path::PathBuf;

use keybase_core::Keybase;
use once_cell::unsync::OnceCell;

use crate::cli::Cli;
use crate::config::{config_path, read_config, CliConfig};
use crate::errors::CliError;
use crate::ui::UiContext;

use super::resolver::{missing_config_message, resolve_home};

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    home: OnceCell<PathBuf>,
    config: OnceCell<CliConfig>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            home: OnceCell::new(),
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Whether prompts may be shown.
    pub fn interactive(&self) -> bool {
        !self.cli.no_input && std::io::stdin().is_terminal()
    }

    pub fn ui(&self, json: bool, format: Option<&str>) -> UiContext {
        UiContext::from_env(json, format, self.cli.no_color, self.cli.ascii)
    }

    pub fn home(&self) -> anyhow::Result<&PathBuf> {
        self.home.get_or_try_init(|| resolve_home(self.cli))
    }

    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        Ok(config_path(self.home()?))
    }

    /// The config file, loaded on first use.
    pub fn config(&self) -> anyhow::Result<&CliConfig> {
        self.config.get_or_try_init(|| {
            let path = self.config_path()?;
            if !path.exists() {
                return Err(CliError::not_found(
                    missing_config_message(&path),
                    "keybase init",
                )
                .into());
            }
            read_config(&path)
        })
    }

    /// A keybase facade for the configured store.
    pub fn keybase(&self) -> anyhow::Result<Keybase> {
        let config = self.config()?.keybase_config();
        Ok(Keybase::new(config)?)
    }
}
