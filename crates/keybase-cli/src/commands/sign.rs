use keybase_core::RecordKind;

use crate::app::{with_passphrase_retry, AppContext};
use crate::cli::SignArgs;
use crate::helpers::read_input;
use crate::ui::{kv, print};

pub fn handle_sign(ctx: &AppContext, args: &SignArgs) -> anyhow::Result<()> {
    let keybase = ctx.keybase()?;
    let message = if args.message == "-" {
        read_input("-")?.into_bytes()
    } else {
        args.message.clone().into_bytes()
    };

    let record = keybase.get(&args.name)?;
    let (signature, public_key) = match record.kind() {
        RecordKind::Local { .. } => with_passphrase_retry(ctx.interactive(), |passphrase| {
            keybase.sign(&args.name, passphrase, &message)
        })?,
        _ => keybase.sign(&args.name, "", &message)?,
    };

    let signature_hex = hex::encode(&signature);
    let ui = ctx.ui(args.json, None);
    if ui.mode.is_json() {
        let value = serde_json::json!({
            "name": record.name(),
            "address": public_key.address().to_string(),
            "public_key": hex::encode(public_key.to_bytes()),
            "signature": signature_hex,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if ctx.quiet() {
        println!("{}", signature_hex);
    } else {
        print(&ui, &kv(&ui, "Address", &public_key.address().to_string()));
        print(&ui, &kv(&ui, "Public Key", &hex::encode(public_key.to_bytes())));
        print(&ui, &kv(&ui, "Signature", &signature_hex));
    }
    Ok(())
}
