use muster_core::responses::Reconciliation;
use serde::Serialize;

use crate::cli::root_commands::DayArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::parse::parse_date;
use crate::context::AppContext;
use crate::output::output;

/// One row of the table view.
#[derive(Debug, Serialize)]
struct StatusLine {
    status: &'static str,
    person: String,
    name: String,
    site: String,
    detail: String,
}

/// Handle `muster status`.
pub async fn handle(args: &DayArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let date = parse_date(args.date.as_deref(), ctx.today())?;
    let recon = ctx.service.reconcile(date, args.site.as_deref()).await;

    if flags.format == OutputFormat::Table {
        output(&status_lines(&recon), flags.format)
    } else {
        output(&recon, flags.format)
    }
}

fn status_lines(recon: &Reconciliation) -> Vec<StatusLine> {
    let present = recon.present.iter().map(|entry| StatusLine {
        status: "present",
        person: entry.person.key().to_string(),
        name: entry.person.name.clone(),
        site: entry.signed_in_site.clone(),
        detail: format!("since {}", entry.signed_in_at.format("%H:%M")),
    });
    let missing = recon.missing.iter().map(|entry| StatusLine {
        status: "missing",
        person: entry.person.key().to_string(),
        name: entry.person.name.clone(),
        site: entry.scheduled_sites.join(", "),
        detail: format!("last: {}", entry.last_status),
    });
    present.chain(missing).collect()
}
