//! Delivery error types.

use thiserror::Error;

/// Why a roll-call message was not delivered.
///
/// Every variant is an ordinary value; the dispatcher never panics and never
/// retries on its own.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The channel answered with a non-success status.
    #[error("channel rejected the message ({status}): {body}")]
    RejectedByChannel {
        /// HTTP status code returned by the channel.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// No response within the timeout, or the connection failed.
    #[error("channel unreachable: {reason}")]
    Unreachable { reason: String },

    /// No webhook URL has been saved.
    #[error("no webhook URL is configured")]
    NotConfigured,

    /// The webhook URL is not an acceptable `https://` endpoint.
    #[error("invalid webhook URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
