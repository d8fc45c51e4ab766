use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `muster archive`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx
        .service
        .archive()
        .await
        .context("failed to archive the event snapshot")?;
    output(&report, flags.format)
}
