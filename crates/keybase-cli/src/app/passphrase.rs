//! Passphrase prompts and retry logic.

use dialoguer::Password;
use keybase_core::crypto::validate_passphrase;
use keybase_core::KeybaseError;
use zeroize::Zeroizing;

use crate::constants::env_vars;
use crate::errors::CliError;

const MAX_ATTEMPTS: u32 = 3;

fn env_passphrase(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(Zeroizing::new)
}

/// Prompt for an existing passphrase, or read it from KEYBASE_PASSPHRASE.
pub fn prompt_passphrase(interactive: bool, prompt: &str) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = env_passphrase(env_vars::PASSPHRASE) {
        return Ok(value);
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No passphrase provided and no TTY available. Set {}.",
            env_vars::PASSPHRASE
        ))
        .into());
    }
    Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt for a new passphrase with confirmation, or read it from `env_var`.
///
/// New passphrases must pass [`validate_passphrase`].
pub fn prompt_new_passphrase(
    interactive: bool,
    env_var: &str,
    prompt: &str,
) -> anyhow::Result<Zeroizing<String>> {
    let passphrase = match env_passphrase(env_var) {
        Some(value) => value,
        None if interactive => Password::new()
            .with_prompt(prompt)
            .with_confirmation("Confirm passphrase", "Passphrases do not match")
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))?,
        None => {
            return Err(CliError::invalid_input(format!(
                "No passphrase provided and no TTY available. Set {}.",
                env_var
            ))
            .into())
        }
    };

    validate_passphrase(&passphrase).map_err(|e| CliError::invalid_input(e.to_string()))?;
    Ok(passphrase)
}

/// Run `op` with the user's passphrase, prompting again after a wrong one.
///
/// A passphrase from the environment gets a single attempt.
pub fn with_passphrase_retry<T, F>(interactive: bool, mut op: F) -> anyhow::Result<T>
where
    F: FnMut(&str) -> keybase_core::Result<T>,
{
    if let Some(passphrase) = env_passphrase(env_vars::PASSPHRASE) {
        return match op(&passphrase) {
            Ok(value) => Ok(value),
            Err(KeybaseError::Authentication) => {
                Err(CliError::auth_failed("Incorrect passphrase.").into())
            }
            Err(err) => Err(err.into()),
        };
    }

    let max_attempts = if interactive { MAX_ATTEMPTS } else { 1 };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let passphrase = prompt_passphrase(interactive, "Passphrase")?;
        match op(&passphrase) {
            Ok(value) => return Ok(value),
            Err(KeybaseError::Authentication) => {
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    return Err(CliError::auth_failed("Too many failed passphrase attempts.")
                        .with_hint(
                            "If you forgot the passphrase, recover the key from its mnemonic.",
                        )
                        .into());
                }
                eprintln!(
                    "Incorrect passphrase. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}
