//! Roll-call message rendering.

use muster_core::responses::Reconciliation;
use serde::{Deserialize, Serialize};

const ALL_ACCOUNTED_FOR: &str = "All scheduled individuals are accounted for.";
const CLOSING_LINE: &str =
    "Please respond in Teams with your status and confirm the safety of your staff and clients.";

/// Incoming-webhook body: `{"text": "<markdown>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelPayload {
    pub text: String,
}

impl ChannelPayload {
    #[must_use]
    pub fn from_reconciliation(recon: &Reconciliation) -> Self {
        Self {
            text: render_markdown(recon),
        }
    }
}

/// Render a reconciliation as the markdown roll-call message.
#[must_use]
pub fn render_markdown(recon: &Reconciliation) -> String {
    let mut lines = vec![
        format!("**Emergency Roll Call - {}**", recon.date),
        format!("Present: {}", recon.present.len()),
        format!("Missing: {}", recon.missing.len()),
        String::new(),
    ];

    if !recon.present.is_empty() {
        lines.push("**Present**".into());
        for entry in &recon.present {
            lines.push(format!(
                "- {}: {} @ {} (since {})",
                entry.person.category.label(),
                entry.person.name,
                entry.signed_in_site,
                entry.signed_in_at.format("%H:%M")
            ));
        }
        lines.push(String::new());
    }

    if recon.missing.is_empty() {
        lines.push(ALL_ACCOUNTED_FOR.into());
    } else {
        lines.push("**Missing Individuals**".into());
        for entry in &recon.missing {
            let site = if entry.scheduled_sites.is_empty() {
                entry.person.site.clone()
            } else {
                entry.scheduled_sites.join(", ")
            };
            let line = match entry.person.contact_details() {
                Some(contact) => format!(
                    "- {}: {} (Site: {site}; Contact: {contact})",
                    entry.person.category.label(),
                    entry.person.name
                ),
                None => format!(
                    "- {}: {} (Site: {site})",
                    entry.person.category.label(),
                    entry.person.name
                ),
            };
            lines.push(line);
        }
    }
    lines.push(String::new());
    lines.push(CLOSING_LINE.into());
    lines.join("\n")
}
