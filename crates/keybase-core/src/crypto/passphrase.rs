//! Rules for passphrases chosen by a user.
//!
//! Encryption itself accepts any non-empty passphrase (see
//! [`derive_key`](super::derive_key)). Front ends call
//! [`validate_passphrase`] when a person picks a new one, so that stored
//! keys are not protected by something trivially short.

use crate::error::{KeybaseError, Result};

/// Shortest accepted new passphrase, counted in characters.
pub const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Check a newly chosen passphrase.
///
/// Blank input and anything shorter than [`MIN_PASSPHRASE_LENGTH`]
/// characters is a `Validation` error.
///
/// ```
/// use keybase_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("lantern-orbit-42").is_ok());
/// assert!(validate_passphrase("1234567").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(KeybaseError::Validation(
            "Passphrase must not be blank".to_string(),
        ));
    }

    match passphrase.chars().count() {
        n if n < MIN_PASSPHRASE_LENGTH => Err(KeybaseError::Validation(format!(
            "Passphrase needs {} or more characters, got {}",
            MIN_PASSPHRASE_LENGTH, n
        ))),
        _ => Ok(()),
    }
}
