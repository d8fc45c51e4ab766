//! # muster-notify
//!
//! Emergency roll-call dispatch for Muster.
//!
//! Formats a [`Reconciliation`] as a markdown message and POSTs it to an
//! incoming-webhook channel as `{"text": ...}`. One attempt per call, strictly
//! bounded by the caller's timeout. Outcomes are values: the dispatcher never
//! panics and never holds any store lock.

mod error;
mod http;
pub mod payload;

pub use error::DeliveryError;
pub use http::validate_webhook_url;
pub use payload::{ChannelPayload, render_markdown};

use std::time::{Duration, Instant};

use muster_core::responses::Reconciliation;
use serde::{Deserialize, Serialize};

/// User agent sent with every webhook request unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = "muster/0.1";

/// A message the channel accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivered {
    pub status: u16,
    pub elapsed_ms: u64,
}

/// HTTP dispatcher for roll-call messages.
#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
}

impl Notifier {
    /// Build a notifier with the given user agent.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::Client` if the HTTP client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { http })
    }

    /// Wrap a preconfigured client (proxy settings, TLS roots).
    #[must_use]
    pub const fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Send `recon` to `webhook_url`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` / `InvalidUrl` before any I/O
    /// - `RejectedByChannel` for a non-2xx response
    /// - `Unreachable` for connect failures and timeouts
    pub async fn notify(
        &self,
        recon: &Reconciliation,
        webhook_url: &str,
        timeout: Duration,
    ) -> Result<Delivered, DeliveryError> {
        let url = validate_webhook_url(webhook_url)?;
        let payload = ChannelPayload::from_reconciliation(recon);
        let started = Instant::now();

        let attempt = async {
            let resp = self
                .http
                .post(url.clone())
                .timeout(timeout)
                .json(&payload)
                .send()
                .await
                .map_err(|e| http::transport_error(&e))?;
            http::check_response(resp).await
        };

        // The outer deadline covers the body read as well; on expiry the
        // in-flight request is dropped.
        let outcome = match tokio::time::timeout(timeout, attempt).await {
            Ok(outcome) => outcome,
            Err(_) => Err(DeliveryError::Unreachable {
                reason: format!("no response within {}s", timeout.as_secs_f64()),
            }),
        };
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(status) => {
                tracing::info!(
                    host = url.host_str().unwrap_or_default(),
                    status,
                    elapsed_ms,
                    present = recon.present.len(),
                    missing = recon.missing.len(),
                    "roll call delivered"
                );
                Ok(Delivered { status, elapsed_ms })
            }
            Err(e) => {
                tracing::warn!(
                    host = url.host_str().unwrap_or_default(),
                    elapsed_ms,
                    error = %e,
                    "roll call not delivered"
                );
                Err(e)
            }
        }
    }
}
