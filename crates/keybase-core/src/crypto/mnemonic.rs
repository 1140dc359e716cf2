//! BIP39 mnemonic phrases.

use std::fmt;
use std::str::FromStr;

use bip39::Mnemonic as Bip39Mnemonic;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::cipher::random_bytes;
use crate::error::{KeybaseError, Result};

/// Entropy size used for newly created accounts.
pub const DEFAULT_STRENGTH_BITS: usize = 256;

/// BIP39 seed length in bytes.
pub const SEED_LENGTH: usize = 64;

/// Wordlist languages defined by BIP39.
///
/// Only English is accepted for generation and parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    #[default]
    English,
    ChineseSimplified,
    ChineseTraditional,
    Czech,
    French,
    Italian,
    Japanese,
    Korean,
    Portuguese,
    Spanish,
}

impl Language {
    fn bip39(self) -> Result<bip39::Language> {
        match self {
            Language::English => Ok(bip39::Language::English),
            other => Err(KeybaseError::Validation(format!(
                "Unsupported mnemonic language: {:?}",
                other
            ))),
        }
    }
}

impl FromStr for Language {
    type Err = KeybaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "chinese-simplified" => Ok(Language::ChineseSimplified),
            "chinese-traditional" => Ok(Language::ChineseTraditional),
            "czech" => Ok(Language::Czech),
            "french" => Ok(Language::French),
            "italian" => Ok(Language::Italian),
            "japanese" => Ok(Language::Japanese),
            "korean" => Ok(Language::Korean),
            "portuguese" => Ok(Language::Portuguese),
            "spanish" => Ok(Language::Spanish),
            other => Err(KeybaseError::Validation(format!(
                "Unknown mnemonic language: {}",
                other
            ))),
        }
    }
}

/// A validated BIP39 phrase.
///
/// The phrase is kept in a [`SecretString`] and wiped on drop. `Debug`
/// never prints the words.
pub struct Mnemonic {
    inner: Bip39Mnemonic,
    phrase: SecretString,
}

impl Mnemonic {
    /// Generate a fresh phrase from `strength_bits` of OS entropy.
    ///
    /// # Errors
    ///
    /// `Validation` for a strength outside 128..=256 or not a multiple of
    /// 32, or a language other than English. `Entropy` if the OS source
    /// fails.
    pub fn generate(strength_bits: usize, language: Language) -> Result<Self> {
        if !(128..=256).contains(&strength_bits) || strength_bits % 32 != 0 {
            return Err(KeybaseError::Validation(format!(
                "Mnemonic strength must be 128..=256 bits in steps of 32 (got {})",
                strength_bits
            )));
        }
        let language = language.bip39()?;

        let entropy = Zeroizing::new(random_bytes::<32>()?);
        let inner = Bip39Mnemonic::from_entropy_in(language, &entropy[..strength_bits / 8])
            .map_err(|e| KeybaseError::Validation(format!("Invalid mnemonic entropy: {}", e)))?;

        Ok(Self::from_inner(inner))
    }

    /// Parse and checksum-validate a phrase.
    ///
    /// Case and surrounding or repeated whitespace are normalized away.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let normalized = Zeroizing::new(
            phrase
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join(" "),
        );
        let inner = Bip39Mnemonic::parse_in_normalized(bip39::Language::English, &normalized)
            .map_err(|e| KeybaseError::Validation(format!("Invalid mnemonic: {}", e)))?;

        Ok(Self::from_inner(inner))
    }

    fn from_inner(inner: Bip39Mnemonic) -> Self {
        Self {
            phrase: SecretString::from(inner.to_string()),
            inner,
        }
    }

    /// The words, space separated. Show once and drop.
    pub fn phrase(&self) -> &str {
        self.phrase.expose_secret()
    }

    pub fn word_count(&self) -> usize {
        self.inner.word_count()
    }

    /// BIP39 seed (PBKDF2-HMAC-SHA512, 2048 rounds) for `passphrase`.
    ///
    /// The passphrase is NFKD-normalized first, so every Unicode spelling
    /// of the same text recovers the same seed.
    pub fn to_seed(&self, passphrase: &str) -> Zeroizing<[u8; SEED_LENGTH]> {
        Zeroizing::new(self.inner.to_seed(passphrase))
    }
}

impl Clone for Mnemonic {
    fn clone(&self) -> Self {
        Self::from_inner(self.inner.clone())
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("word_count", &self.word_count())
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

/// Generate a new mnemonic. See [`Mnemonic::generate`].
pub fn generate_mnemonic(strength_bits: usize, language: Language) -> Result<Mnemonic> {
    Mnemonic::generate(strength_bits, language)
}

/// Derive the 64-byte BIP39 seed. Deterministic in both inputs.
pub fn mnemonic_to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Zeroizing<[u8; SEED_LENGTH]> {
    mnemonic.to_seed(passphrase)
}
