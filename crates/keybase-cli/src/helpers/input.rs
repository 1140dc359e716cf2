//! Reading user input from files, stdin and prompts.

use std::io::{self, Read};

use dialoguer::Password;
use zeroize::Zeroizing;

use crate::constants::env_vars;
use crate::errors::CliError;

/// Read a whole file, or stdin when `source` is "-".
pub fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        return Ok(buffer);
    }
    std::fs::read_to_string(source).map_err(|e| {
        CliError::not_found(
            format!("Failed to read {}: {}", source, e),
            "Pass a readable file, or - for stdin",
        )
        .into()
    })
}

/// Read a mnemonic from KEYBASE_MNEMONIC, a hidden prompt, or one line of
/// stdin.
pub fn read_mnemonic(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Ok(value) = std::env::var(env_vars::MNEMONIC) {
        if !value.trim().is_empty() {
            return Ok(Zeroizing::new(value));
        }
    }
    if interactive {
        return Password::new()
            .with_prompt("Mnemonic")
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| anyhow::anyhow!("Failed to read mnemonic: {}", e));
    }

    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .read_line(&mut line)
        .map_err(|e| anyhow::anyhow!("Failed to read mnemonic from stdin: {}", e))?;
    if line.trim().is_empty() {
        return Err(CliError::invalid_input(format!(
            "No mnemonic provided. Set {} or pipe it on stdin.",
            env_vars::MNEMONIC
        ))
        .into());
    }
    Ok(line)
}
