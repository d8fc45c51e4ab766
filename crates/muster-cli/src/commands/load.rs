use anyhow::Context;
use muster_ingest::{RosterFiles, load_roster};
use muster_store::RosterFile;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::LoadArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `muster load`.
///
/// The files are parsed, validated as a whole, swapped in, and only then
/// written to `roster.json`. Any failure leaves the previous roster active.
pub async fn handle(args: &LoadArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let loaded = load_roster(RosterFiles {
        staff: &args.staff,
        clients: &args.clients,
        schedule: &args.schedule,
    })
    .context("roster files rejected; the active roster is unchanged")?;

    let file = RosterFile {
        people: loaded.people,
        schedule: loaded.schedule,
    };
    let summary = ctx
        .service
        .replace_roster(file.people.clone(), file.schedule.clone())
        .await
        .context("roster rejected; the active roster is unchanged")?;
    file.save(&ctx.runtime.roster())
        .context("failed to save roster.json")?;

    let sites = ctx.service.sites().await;
    ctx.service
        .update_settings(|settings| settings.locations.extend(sites))
        .await
        .context("failed to record roster sites")?;

    output(&summary, flags.format)
}
