//! Shared HTTP helpers for the webhook dispatcher.
//!
//! Centralizes URL validation and status-code checks so the dispatcher stays
//! focused on building the request and enforcing the deadline.

use std::net::IpAddr;

use crate::error::DeliveryError;

/// Longest response body kept in a [`DeliveryError::RejectedByChannel`].
const MAX_BODY_CHARS: usize = 512;

/// Accept `https://` URLs, and `http://` only for loopback hosts.
///
/// # Errors
///
/// `NotConfigured` for a blank URL, `InvalidUrl` otherwise.
pub fn validate_webhook_url(raw: &str) -> Result<reqwest::Url, DeliveryError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DeliveryError::NotConfigured);
    }
    let url =
        reqwest::Url::parse(raw).map_err(|e| DeliveryError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "https" => Ok(url),
        "http" if url.host_str().is_some_and(is_loopback) => Ok(url),
        "http" => Err(DeliveryError::InvalidUrl(format!(
            "{raw}: plain http is only allowed for loopback hosts"
        ))),
        other => Err(DeliveryError::InvalidUrl(format!(
            "{raw}: unsupported scheme '{other}'"
        ))),
    }
}

fn is_loopback(host: &str) -> bool {
    host.trim_matches(['[', ']'])
        .parse::<IpAddr>()
        .map_or_else(|_| host.eq_ignore_ascii_case("localhost"), |ip| ip.is_loopback())
}

/// Check a webhook response.
///
/// Returns the status code for 2xx; anything else becomes
/// [`DeliveryError::RejectedByChannel`] with the (truncated) body.
pub async fn check_response(resp: reqwest::Response) -> Result<u16, DeliveryError> {
    let status = resp.status().as_u16();
    if resp.status().is_success() {
        return Ok(status);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(DeliveryError::RejectedByChannel {
        status,
        body: truncate(body.trim()),
    })
}

/// Map a transport failure to `Unreachable`.
pub fn transport_error(err: &reqwest::Error) -> DeliveryError {
    let reason = if err.is_timeout() {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    DeliveryError::Unreachable { reason }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[test]
    fn accepts_https() {
        let url = validate_webhook_url(" https://example.webhook.office.com/hook ").unwrap();
        assert_eq!(url.host_str(), Some("example.webhook.office.com"));
    }

    #[test]
    fn blank_url_is_not_configured() {
        assert!(matches!(
            validate_webhook_url("   "),
            Err(DeliveryError::NotConfigured)
        ));
    }

    #[test]
    fn plain_http_only_for_loopback() {
        assert!(validate_webhook_url("http://127.0.0.1:9000/hook").is_ok());
        assert!(validate_webhook_url("http://localhost/hook").is_ok());
        assert!(validate_webhook_url("http://[::1]:8080/hook").is_ok());
        assert!(matches!(
            validate_webhook_url("http://example.com/hook"),
            Err(DeliveryError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(matches!(
            validate_webhook_url("ftp://example.com/hook"),
            Err(DeliveryError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_webhook_url("not a url"),
            Err(DeliveryError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn check_response_success() {
        assert_eq!(check_response(mock_response(202, "")).await.unwrap(), 202);
    }

    #[tokio::test]
    async fn check_response_rejected_keeps_body() {
        let err = check_response(mock_response(400, " bad card \n")).await.unwrap_err();
        match err {
            DeliveryError::RejectedByChannel { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad card");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truncates_long_bodies() {
        let long = "x".repeat(MAX_BODY_CHARS + 10);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), MAX_BODY_CHARS + 1);
        assert_eq!(truncate("short"), "short");
    }
}
