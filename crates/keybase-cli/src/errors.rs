//! CLI error with an exit code and an optional hint.

use std::fmt;

use keybase_core::{HardwareError, KeybaseError};

use crate::constants::exit_codes;

#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub hint: Option<String>,
    pub code: i32,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
            code,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::new(exit_codes::NOT_FOUND, message).with_hint(hint)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(exit_codes::INVALID_INPUT, message)
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(exit_codes::AUTH_FAILED, message)
    }

    /// Classify an error bubbling out of a command.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(cli) = err.downcast_ref::<CliError>() {
            return Self {
                message: cli.message.clone(),
                hint: cli.hint.clone(),
                code: cli.code,
            };
        }
        match err.downcast_ref::<KeybaseError>() {
            Some(core) => Self::from_core(core),
            None => Self::new(1, format!("{:#}", err)),
        }
    }

    fn from_core(err: &KeybaseError) -> Self {
        let message = err.to_string();
        match err {
            KeybaseError::NotFound(_) => {
                Self::not_found(message, "Run `keybase list` to see available keys")
            }
            KeybaseError::Conflict(_) => Self::new(exit_codes::CONFLICT, message)
                .with_hint("Pick another name or delete the existing key first"),
            KeybaseError::Authentication => Self::auth_failed("Incorrect passphrase."),
            KeybaseError::Format(_) | KeybaseError::Validation(_) => {
                Self::invalid_input(message)
            }
            KeybaseError::StorageBusy(_) => Self::new(exit_codes::BUSY, message)
                .with_hint("Another keybase command is using the store; try again"),
            KeybaseError::UnsupportedOperation(_) => Self::new(exit_codes::UNSUPPORTED, message),
            KeybaseError::Hardware(HardwareError::NotConnected(_)) => {
                Self::new(exit_codes::HARDWARE, message)
                    .with_hint("This build has no hardware wallet driver")
            }
            KeybaseError::Hardware(_) => Self::new(exit_codes::HARDWARE, message),
            _ => Self::new(1, message),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let err = anyhow::Error::new(KeybaseError::Authentication);
        assert_eq!(CliError::from_anyhow(&err).code, exit_codes::AUTH_FAILED);

        let err = anyhow::Error::new(KeybaseError::NotFound("key 'x'".to_string()));
        let cli = CliError::from_anyhow(&err);
        assert_eq!(cli.code, exit_codes::NOT_FOUND);
        assert!(cli.hint.is_some());

        let err = anyhow::anyhow!("plain failure");
        assert_eq!(CliError::from_anyhow(&err).code, 1);
    }

    #[test]
    fn test_cli_error_passes_through() {
        let err = anyhow::Error::new(CliError::invalid_input("bad"));
        let cli = CliError::from_anyhow(&err);
        assert_eq!(cli.code, exit_codes::INVALID_INPUT);
        assert_eq!(cli.message, "bad");
    }
}
