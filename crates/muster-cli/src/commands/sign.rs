use anyhow::Context;
use muster_core::entities::NewSignEvent;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SignArgs;
use crate::commands::shared::parse::{parse_key, parse_timestamp};
use crate::context::AppContext;
use crate::output::output;

/// Handle `muster sign in|out`. Returns once the event is on disk.
pub async fn handle(args: &SignArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let key = parse_key(&args.person)?;
    let timestamp = match &args.at {
        Some(raw) => parse_timestamp(raw, ctx.offset)?,
        None => ctx.now(),
    };

    let appended = ctx
        .service
        .append(NewSignEvent {
            category: key.category,
            id: key.id,
            action: args.direction.into(),
            site: args.site.clone().unwrap_or_default(),
            timestamp,
            recorded_by: args.by.clone(),
        })
        .await?;
    let event = appended
        .durable()
        .await
        .context("event recorded in memory but not written to the snapshot")?;

    output(&event, flags.format)
}
