//! Input and parsing helper functions for the CLI.
//!
//! - Reading files, stdin and mnemonics (`input`)
//! - Algorithm, path and public key parsing (`parsing`)

mod input;
mod parsing;

pub use input::{read_input, read_mnemonic};
pub use parsing::{parse_algo, parse_path, parse_public_key};
