//! Property-based tests for derivation, encryption and armor.

use std::collections::{BTreeMap, HashSet};

use keybase_core::crypto::{decrypt_private_key, derive_key_pair, encrypt_private_key};
use keybase_core::{
    decode_armor, encode_armor, ArmorEnvelope, ArmorKind, DerivationPath, KdfParams,
    KeybaseError, Language, Mnemonic, PrivateKey, SigningAlgo,
};
use proptest::prelude::*;

const PHRASE: &str = "legal winner thank year wave sausage worth useful legal winner thank yellow";

fn light_kdf() -> KdfParams {
    KdfParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

fn algo_strategy() -> impl Strategy<Value = SigningAlgo> {
    prop_oneof![Just(SigningAlgo::Secp256k1), Just(SigningAlgo::Ed25519)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// The same phrase and passphrase always give the same seed.
    #[test]
    fn prop_seed_is_deterministic(passphrase in "[ -~]{0,16}") {
        let first = Mnemonic::from_phrase(PHRASE).expect("phrase should parse");
        let second = Mnemonic::from_phrase(&PHRASE.to_uppercase()).expect("phrase should parse");
        prop_assert_eq!(*first.to_seed(&passphrase), *second.to_seed(&passphrase));
    }

    #[test]
    fn prop_passphrase_changes_seed(a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
        prop_assume!(a != b);
        let mnemonic = Mnemonic::from_phrase(PHRASE).expect("phrase should parse");
        prop_assert_ne!(*mnemonic.to_seed(&a), *mnemonic.to_seed(&b));
    }

    #[test]
    fn prop_generated_phrase_reparses(_run in 0u8..4) {
        let mnemonic = Mnemonic::generate(256, Language::English).expect("generate should succeed");
        let restored = Mnemonic::from_phrase(mnemonic.phrase()).expect("phrase should parse");
        prop_assert_eq!(*mnemonic.to_seed(""), *restored.to_seed(""));
    }

    /// Derivation is a pure function of seed, path and algorithm.
    #[test]
    fn prop_derivation_is_deterministic(
        seed in prop::collection::vec(any::<u8>(), 16..=64),
        account in 0u32..1000,
        index in 0u32..1000,
        algo in algo_strategy(),
    ) {
        let path = DerivationPath::bip44(118, account, index).expect("path should be valid");
        let (private_a, public_a) = derive_key_pair(&seed, &path, algo).expect("derive should succeed");
        let (private_b, public_b) = derive_key_pair(&seed, &path, algo).expect("derive should succeed");
        prop_assert_eq!(public_a, public_b);
        prop_assert_eq!(&*private_a.to_bytes(), &*private_b.to_bytes());
    }

    /// Two encryptions of one key differ, and both open with the passphrase.
    #[test]
    fn prop_encryption_is_randomized(secret in any::<[u8; 32]>(), passphrase in "[ -~]{1,24}") {
        let first = encrypt_private_key(&secret, &passphrase, &light_kdf()).expect("encrypt should succeed");
        let second = encrypt_private_key(&secret, &passphrase, &light_kdf()).expect("encrypt should succeed");
        prop_assert_ne!(&first.ciphertext, &second.ciphertext);

        let opened = decrypt_private_key(&second, &passphrase).expect("decrypt should succeed");
        prop_assert_eq!(&opened[..], &secret[..]);
    }

    /// Any wrong passphrase or flipped bit fails with the same error.
    #[test]
    fn prop_decryption_fails_closed(
        secret in any::<[u8; 32]>(),
        wrong in "[a-z]{1,16}",
        flip in 0usize..48,
    ) {
        let blob = encrypt_private_key(&secret, "correct horse", &light_kdf()).expect("encrypt should succeed");
        prop_assert!(matches!(
            decrypt_private_key(&blob, &wrong),
            Err(KeybaseError::Authentication)
        ));

        let mut tampered = blob.clone();
        let at = flip % tampered.ciphertext.len();
        tampered.ciphertext[at] ^= 0x01;
        prop_assert!(matches!(
            decrypt_private_key(&tampered, "correct horse"),
            Err(KeybaseError::Authentication)
        ));
    }

    #[test]
    fn prop_armor_round_trips(
        headers in prop::collection::btree_map("[a-z][a-z0-9-]{0,10}", "[A-Za-z0-9=,.:]{1,24}", 0..5),
        body in prop::collection::vec(any::<u8>(), 0..400),
        kind in prop_oneof![Just(ArmorKind::PrivKey), Just(ArmorKind::PubKey), Just(ArmorKind::Info)],
    ) {
        let envelope = ArmorEnvelope::new(kind, headers, body).expect("envelope should be valid");
        let text = encode_armor(&envelope);
        prop_assert_eq!(decode_armor(&text).expect("decode should succeed"), envelope);
    }

    #[test]
    fn prop_public_key_armor_round_trips(bytes in any::<[u8; 32]>(), algo in algo_strategy()) {
        prop_assume!(bytes.iter().any(|b| *b != 0));
        let key = match PrivateKey::from_bytes(algo, &bytes) {
            Ok(key) => key.public_key(),
            Err(_) => return Ok(()),
        };
        let text = encode_armor(&ArmorEnvelope::public_key(&key).expect("envelope should be valid"));
        let decoded = decode_armor(&text).expect("decode should succeed");
        prop_assert_eq!(decoded.to_public_key().expect("public key should parse"), key);
    }
}

#[test]
fn test_thousand_paths_give_distinct_keys() {
    let mnemonic = Mnemonic::from_phrase(PHRASE).expect("phrase should parse");
    let seed = mnemonic.to_seed("");

    for algo in [SigningAlgo::Secp256k1, SigningAlgo::Ed25519] {
        let mut seen = HashSet::new();
        for index in 0..1000 {
            let path = DerivationPath::bip44(118, index / 100, index % 100).expect("path should be valid");
            let (_, public) = derive_key_pair(&seed[..], &path, algo).expect("derive should succeed");
            assert!(seen.insert(public.to_bytes()), "duplicate key at {}", path);
        }
        assert_eq!(seen.len(), 1000);
    }
}

#[test]
fn test_armor_headers_are_sorted_on_encode() {
    let headers = BTreeMap::from([
        ("zeta".to_string(), "1".to_string()),
        ("alpha".to_string(), "2".to_string()),
    ]);
    let envelope = ArmorEnvelope::new(ArmorKind::PubKey, headers, vec![1, 2, 3])
        .expect("envelope should be valid");
    let text = encode_armor(&envelope);
    let alpha = text.find("alpha: 2").expect("alpha header should be present");
    let zeta = text.find("zeta: 1").expect("zeta header should be present");
    assert!(alpha < zeta);
}
