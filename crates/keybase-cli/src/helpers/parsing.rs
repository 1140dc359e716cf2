//! Parsing helpers for algorithms, derivation paths and public keys.

use keybase_core::{armor, DerivationPath, PublicKey, SigningAlgo};

use crate::errors::CliError;

/// Parse `--algo`, falling back to `default`.
pub fn parse_algo(value: Option<&str>, default: SigningAlgo) -> anyhow::Result<SigningAlgo> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|e: keybase_core::KeybaseError| CliError::invalid_input(e.to_string()).into()),
        None => Ok(default),
    }
}

pub fn parse_path(value: &str) -> anyhow::Result<DerivationPath> {
    value
        .parse()
        .map_err(|e: keybase_core::KeybaseError| CliError::invalid_input(e.to_string()).into())
}

/// Parse public key armor, or canonical public key bytes in hex.
pub fn parse_public_key(text: &str) -> anyhow::Result<PublicKey> {
    let trimmed = text.trim();
    let parsed = if trimmed.starts_with("-----BEGIN") {
        armor::decode_armor(trimmed).and_then(|envelope| envelope.to_public_key())
    } else {
        let bytes = hex::decode(trimmed)
            .map_err(|e| CliError::invalid_input(format!("Invalid hex public key: {}", e)))?;
        PublicKey::from_bytes(&bytes)
    };
    parsed.map_err(|e| CliError::invalid_input(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keybase_core::{encode_armor, ArmorEnvelope, PrivateKey};

    #[test]
    fn test_parse_algo() {
        assert_eq!(
            parse_algo(None, SigningAlgo::Ed25519).unwrap(),
            SigningAlgo::Ed25519
        );
        assert_eq!(
            parse_algo(Some("SECP256K1"), SigningAlgo::Ed25519).unwrap(),
            SigningAlgo::Secp256k1
        );
        assert!(parse_algo(Some("rsa"), SigningAlgo::Ed25519).is_err());
    }

    #[test]
    fn test_parse_path() {
        assert_eq!(
            parse_path("m/44'/118'/0'/0/3").unwrap().to_string(),
            "m/44'/118'/0'/0/3"
        );
        assert!(parse_path("m/x").is_err());
    }

    #[test]
    fn test_parse_public_key_accepts_hex_and_armor() {
        let key = PrivateKey::from_bytes(SigningAlgo::Ed25519, &[4u8; 32])
            .unwrap()
            .public_key();

        let from_hex = parse_public_key(&hex::encode(key.to_bytes())).unwrap();
        assert_eq!(from_hex, key);

        let armor = encode_armor(&ArmorEnvelope::public_key(&key).unwrap());
        assert_eq!(parse_public_key(&armor).unwrap(), key);

        assert!(parse_public_key("zz").is_err());
    }
}
