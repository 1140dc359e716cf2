//! Path resolution for the keybase home directory.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::xdg_config_dir;

/// Resolve the keybase home: `--home` / `KEYBASE_HOME`, else the XDG
/// config directory.
pub fn resolve_home(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(home) = cli.home.as_deref() {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home));
        }
    }
    xdg_config_dir()
}

/// Error message when the config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "No keybase config found at {}\n\nRun:\n  keybase init\n\nOr point at another home:\n  KEYBASE_HOME=/path/to/home keybase init",
        config_path.display()
    )
}
