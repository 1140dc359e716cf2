//! Application-level utilities for the Keybase CLI.
//!
//! This module provides:
//! - Path resolution for the keybase home and its config file
//! - Lazily loaded configuration bundled with CLI flags
//! - Passphrase prompts with retry logic

mod context;
mod passphrase;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use passphrase::{prompt_new_passphrase, with_passphrase_retry};
