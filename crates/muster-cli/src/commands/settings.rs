use anyhow::Context;
use muster_core::entities::Settings;
use muster_notify::validate_webhook_url;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SettingsCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `muster settings`. Each change is saved before it takes effect.
pub async fn handle(
    action: &SettingsCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let settings = match action {
        SettingsCommands::Show => ctx.service.settings().await,
        SettingsCommands::SetWebhook { url } => {
            let url = validate_webhook_url(url)?.to_string();
            update(ctx, |settings| settings.webhook_url = url).await?
        }
        SettingsCommands::ClearWebhook => {
            update(ctx, |settings| settings.webhook_url.clear()).await?
        }
        SettingsCommands::SetTimeout { seconds } => {
            let seconds = *seconds;
            update(ctx, |settings| settings.timeout_seconds = seconds).await?
        }
        SettingsCommands::SetRetention { days } => {
            let days = *days;
            update(ctx, |settings| settings.retention_days = days).await?
        }
        SettingsCommands::AddLocation { name } => {
            let name = name.clone();
            update(ctx, |settings| settings.locations.push(name)).await?
        }
    };
    output(&settings, flags.format)
}

async fn update(
    ctx: &AppContext,
    change: impl FnOnce(&mut Settings),
) -> anyhow::Result<Settings> {
    ctx.service
        .update_settings(change)
        .await
        .context("settings not changed")
}
