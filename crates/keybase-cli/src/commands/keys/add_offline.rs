use crate::app::AppContext;
use crate::cli::AddOfflineArgs;
use crate::helpers::{parse_public_key, read_input};

use super::report_record;

pub fn handle_add_offline(ctx: &AppContext, args: &AddOfflineArgs) -> anyhow::Result<()> {
    let public_key = parse_public_key(&read_input(&args.file)?)?;
    let record = ctx.keybase()?.create_offline(&args.name, public_key)?;
    report_record(&ctx.ui(false, None), "Offline key added", &record, ctx.quiet())
}
