use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `muster health`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.service.sync().await;
    output(&ctx.service.health().await, flags.format)
}
