use crate::cli::GlobalFlags;
use crate::cli::root_commands::ScheduleArgs;
use crate::commands::shared::parse::parse_date;
use crate::context::AppContext;
use crate::output::output;

/// Handle `muster schedule`.
pub async fn handle(
    args: &ScheduleArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let date = parse_date(args.date.as_deref(), ctx.today())?;
    let rows = ctx.service.schedule_matrix(date).await;
    output(&rows, flags.format)
}
