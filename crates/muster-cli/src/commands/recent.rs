use crate::cli::GlobalFlags;
use crate::cli::root_commands::RecentArgs;
use crate::commands::shared::parse::parse_date;
use crate::context::AppContext;
use crate::output::output;

/// Handle `muster recent`.
pub async fn handle(
    args: &RecentArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let events = match &args.date {
        Some(raw) => {
            let date = parse_date(Some(raw), ctx.today())?;
            ctx.service.events_on(date).await
        }
        None => ctx.service.recent_events(args.limit).await,
    };
    output(&events, flags.format)
}
