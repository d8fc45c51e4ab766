use std::time::Duration;

use anyhow::{Context, bail};
use muster_notify::{Delivered, Notifier};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::NotifyArgs;
use crate::commands::shared::parse::parse_date;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct NotifyReport {
    #[serde(flatten)]
    delivered: Delivered,
    present: usize,
    missing: usize,
}

/// Handle `muster notify`. A failed delivery changes nothing in the store.
pub async fn handle(
    args: &NotifyArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let date = parse_date(args.day.date.as_deref(), ctx.today())?;
    let settings = ctx.service.settings().await;
    let seconds = args.timeout.unwrap_or(settings.timeout_seconds);
    if seconds == 0 {
        bail!("timeout must be at least 1 second");
    }

    let recon = ctx.service.reconcile(date, args.day.site.as_deref()).await;
    let notifier = Notifier::new(&ctx.config.notify.user_agent)?;
    let delivered = notifier
        .notify(&recon, &settings.webhook_url, Duration::from_secs(seconds))
        .await
        .context("roll call was not delivered")?;

    output(
        &NotifyReport {
            delivered,
            present: recon.present.len(),
            missing: recon.missing.len(),
        },
        flags.format,
    )
}
