use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use keybase_core::VERSION;

/// Keybase - named signing keys, encrypted at rest
#[derive(Parser)]
#[command(name = "keybase")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding config.toml and the key store
    #[arg(long, global = true, env = "KEYBASE_HOME")]
    pub home: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Store name
    #[arg(long, default_value = "keybase")]
    pub name: String,

    /// BIP44 coin type for new accounts
    #[arg(long)]
    pub coin_type: Option<u32>,

    /// Default signing algorithm (secp256k1, ed25519)
    #[arg(long)]
    pub algo: Option<String>,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Key name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Recover from an existing mnemonic instead of generating one
    #[arg(long, conflicts_with = "ledger")]
    pub recover: bool,

    /// Register a key held by a hardware wallet
    #[arg(long)]
    pub ledger: bool,

    /// Signing algorithm (defaults to the configured one)
    #[arg(long)]
    pub algo: Option<String>,

    /// BIP44 account number
    #[arg(long, default_value_t = 0)]
    pub account: u32,

    /// BIP44 address index
    #[arg(long, default_value_t = 0)]
    pub index: u32,

    /// Full derivation path (overrides --account/--index)
    #[arg(long, value_name = "PATH", requires = "recover")]
    pub path: Option<String>,

    /// Address prefix shown on the hardware wallet
    #[arg(long, default_value = "cosmos")]
    pub hrp: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `add-offline` command
#[derive(Args)]
pub struct AddOfflineArgs {
    /// Key name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// File with public key armor or a hex public key ("-" for stdin)
    #[arg(value_name = "FILE")]
    pub file: String,
}

/// Arguments for the `add-multi` command
#[derive(Args)]
pub struct AddMultiArgs {
    /// Key name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Signatures required
    #[arg(long)]
    pub threshold: u32,

    /// Member keys by name
    #[arg(long = "key", value_name = "NAME", required = true)]
    pub keys: Vec<String>,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (table, plain)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Key name or hex address
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Key name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Delete without checking the passphrase
    #[arg(long)]
    pub force: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `update` command
#[derive(Args)]
pub struct UpdateArgs {
    /// Key name
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Arguments for the `sign` command
#[derive(Args)]
pub struct SignArgs {
    /// Key name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Message to sign ("-" reads stdin)
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `export` command
#[derive(Args)]
pub struct ExportArgs {
    /// Key name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Export only the public key
    #[arg(long, conflicts_with = "private")]
    pub pubkey: bool,

    /// Export the encrypted private key
    #[arg(long)]
    pub private: bool,
}

/// Arguments for the `import` command
#[derive(Args)]
pub struct ImportArgs {
    /// Name for the imported key
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Armor file ("-" for stdin)
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Import public key armor as an offline key
    #[arg(long, conflicts_with = "private")]
    pub pubkey: bool,

    /// Import private key armor
    #[arg(long)]
    pub private: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config and create an empty key store
    Init(InitArgs),

    /// Create a key from a new or existing mnemonic, or a hardware wallet
    Add(AddArgs),

    /// Register a public key without its private key
    AddOffline(AddOfflineArgs),

    /// Register a multisig key from existing keys
    AddMulti(AddMultiArgs),

    /// List keys
    List(ListArgs),

    /// Show a key by name or address
    Show(ShowArgs),

    /// Delete a key
    Delete(DeleteArgs),

    /// Change the passphrase of a key
    Update(UpdateArgs),

    /// Sign a message
    Sign(SignArgs),

    /// Export a key as armor
    Export(ExportArgs),

    /// Import a key from armor
    Import(ImportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
