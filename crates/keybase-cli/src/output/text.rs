//! Text and table output for key records.

use keybase_core::{KeyRecord, PublicKey};

use crate::ui::{format::truncate, kv, print, UiContext};

pub const RECORD_COLUMNS: [&str; 4] = ["Name", "Type", "Algo", "Address"];

pub fn record_rows(records: &[KeyRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            vec![
                truncate(record.name(), 32),
                record.key_type().to_string(),
                record
                    .algo()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                record.address().to_string(),
            ]
        })
        .collect()
}

pub fn print_record(ctx: &UiContext, record: &KeyRecord) {
    print(ctx, &kv(ctx, "Name", record.name()));
    print(ctx, &kv(ctx, "Type", record.key_type().as_str()));
    if let Some(algo) = record.algo() {
        print(ctx, &kv(ctx, "Algo", algo.as_str()));
    }
    print(ctx, &kv(ctx, "Address", &record.address().to_string()));
    print(
        ctx,
        &kv(ctx, "Public Key", &hex::encode(record.public_key().to_bytes())),
    );
    if let Some(path) = record.path() {
        print(ctx, &kv(ctx, "Path", &path.to_string()));
    }
    if let PublicKey::Multisig(multi) = record.public_key() {
        print(
            ctx,
            &kv(
                ctx,
                "Threshold",
                &format!("{} of {}", multi.threshold(), multi.keys().len()),
            ),
        );
        for member in multi.keys() {
            print(ctx, &kv(ctx, "Member", &member.address().to_string()));
        }
    }
}
