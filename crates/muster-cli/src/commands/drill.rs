use anyhow::{Context, bail};
use muster_core::entities::{DrillExportRecord, DrillMeta};
use muster_ingest::save_report;
use serde::Serialize;

use crate::cli::root_commands::DrillArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::parse::{parse_absence, parse_date, parse_key, parse_local};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct DrillOutcome {
    report: String,
    accounted_for: usize,
    not_accounted_for: usize,
    unexplained: Vec<String>,
    records: Vec<DrillExportRecord>,
}

/// Handle `muster drill`: seed from the live reconciliation, apply the
/// overrides, export the CSV report. The event log is never touched.
pub async fn handle(args: &DrillArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let location = args.location.trim();
    if location.is_empty() {
        bail!("drill location is required");
    }
    let date = parse_date(args.day.date.as_deref(), ctx.today())?;
    let drill_at = match &args.at {
        Some(raw) => parse_local(raw)?,
        None => ctx.now().naive_local(),
    };

    let mut session = ctx
        .service
        .start_drill(
            date,
            args.day.site.as_deref(),
            DrillMeta {
                drill_at,
                location: location.to_string(),
            },
        )
        .await;

    for raw in &args.present {
        let key = parse_key(raw)?;
        ctx.service
            .set_drill_status(&mut session, &key, true, None)
            .await?;
    }
    for raw in &args.absent {
        let (key, reason) = parse_absence(raw)?;
        ctx.service
            .set_drill_status(&mut session, &key, false, reason)
            .await?;
    }

    let unexplained: Vec<String> = session
        .unexplained_absences()
        .iter()
        .map(ToString::to_string)
        .collect();
    if args.require_reasons && !unexplained.is_empty() {
        bail!(
            "no absence reason given for: {} (use --absent KEY=REASON)",
            unexplained.join(", ")
        );
    }

    let records = session.export();
    let dir = args
        .out
        .clone()
        .unwrap_or_else(|| ctx.runtime.root().join("reports"));
    let path = save_report(&dir, session.meta(), ctx.now().naive_local(), &records)
        .context("failed to write the drill report")?;

    if flags.format == OutputFormat::Table {
        return output(&records, flags.format);
    }
    let accounted_for = records.iter().filter(|record| record.present).count();
    output(
        &DrillOutcome {
            report: path.display().to_string(),
            accounted_for,
            not_accounted_for: records.len() - accounted_for,
            unexplained,
            records,
        },
        flags.format,
    )
}
