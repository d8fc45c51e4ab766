use clap::Subcommand;

#[derive(Clone, Debug, Subcommand)]
pub enum SettingsCommands {
    /// Print the active settings.
    Show,
    /// Save the incoming-webhook URL (https, or http on loopback).
    SetWebhook {
        /// Webhook URL
        url: String,
    },
    /// Remove the saved webhook URL.
    ClearWebhook,
    /// Notification timeout in seconds.
    SetTimeout { seconds: u64 },
    /// Days to keep archived snapshots (0 keeps them forever).
    SetRetention { days: u32 },
    /// Add a known site name.
    AddLocation { name: String },
}
