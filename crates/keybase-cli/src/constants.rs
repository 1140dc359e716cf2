//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, key, address).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase, too many attempts).
    pub const AUTH_FAILED: i32 = 5;

    /// A key with that name already exists.
    pub const CONFLICT: i32 = 6;

    /// The store is held by another process.
    pub const BUSY: i32 = 7;

    /// The key kind cannot do what was asked.
    pub const UNSUPPORTED: i32 = 8;

    /// Hardware wallet missing, refused or timed out.
    pub const HARDWARE: i32 = 9;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    /// Passphrase unlocking an existing key, or protecting a new one.
    pub const PASSPHRASE: &str = "KEYBASE_PASSPHRASE";

    /// New passphrase for `update`.
    pub const NEW_PASSPHRASE: &str = "KEYBASE_NEW_PASSPHRASE";

    /// Passphrase protecting private key armor on `export --private`.
    pub const EXPORT_PASSPHRASE: &str = "KEYBASE_EXPORT_PASSPHRASE";

    /// Mnemonic for `add --recover`.
    pub const MNEMONIC: &str = "KEYBASE_MNEMONIC";

    /// Optional BIP39 passphrase for `add --recover`.
    pub const BIP39_PASSPHRASE: &str = "KEYBASE_BIP39_PASSPHRASE";

    /// Log filter directives.
    pub const LOG: &str = "KEYBASE_LOG";
}
