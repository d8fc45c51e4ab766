//! Webhook delivery against a local `tiny_http` endpoint.

use std::io::Read;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use pretty_assertions::assert_eq;

use muster_core::entities::Person;
use muster_core::enums::{Category, PresenceStatus};
use muster_core::responses::{MissingPerson, PresentPerson, Reconciliation};
use muster_notify::{ChannelPayload, DEFAULT_USER_AGENT, DeliveryError, Notifier};

fn jane() -> Person {
    Person {
        id: "STF001".into(),
        name: "Jane Smith".into(),
        category: Category::Staff,
        site: "Main".into(),
        contact_name: "John Smith".into(),
        contact_phone: "555-0100".into(),
        email: String::new(),
        phone: String::new(),
    }
}

fn recon(present: bool) -> Reconciliation {
    let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
    if present {
        Reconciliation {
            date,
            site: Some("Main".into()),
            present: vec![PresentPerson {
                person: jane(),
                signed_in_at: DateTime::parse_from_rfc3339("2025-11-01T08:05:00Z").unwrap(),
                signed_in_site: "Main".into(),
            }],
            missing: Vec::new(),
        }
    } else {
        Reconciliation {
            date,
            site: Some("Main".into()),
            present: Vec::new(),
            missing: vec![MissingPerson {
                person: jane(),
                scheduled_sites: vec!["Main".into()],
                last_status: PresenceStatus::SignOut,
            }],
        }
    }
}

struct Captured {
    content_type: Option<String>,
    body: String,
}

/// Serve exactly one request with `status`, handing back what was received.
fn one_shot(status: u16, reply: &'static str) -> (String, JoinHandle<Captured>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let handle = std::thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut body = String::new();
        request.as_reader().read_to_string(&mut body).unwrap();
        let content_type = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Content-Type"))
            .map(|h| h.value.to_string());
        request
            .respond(tiny_http::Response::from_string(reply).with_status_code(status))
            .unwrap();
        Captured { content_type, body }
    });
    (format!("http://127.0.0.1:{port}/hook"), handle)
}

/// Loopback requests must not be routed through an ambient proxy.
fn notifier() -> Notifier {
    Notifier::with_client(
        reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .no_proxy()
            .build()
            .unwrap(),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn delivers_json_text_payload() {
    let (url, server) = one_shot(200, "1");
    let delivered = notifier()
        .notify(&recon(true), &url, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(delivered.status, 200);

    let captured = server.join().unwrap();
    assert_eq!(captured.content_type.as_deref(), Some("application/json"));
    let payload: ChannelPayload = serde_json::from_str(&captured.body).unwrap();
    assert!(payload.text.starts_with("**Emergency Roll Call - 2025-11-01**"));
    assert!(payload.text.contains("- Staff: Jane Smith @ Main (since 08:05)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_is_rejected_by_channel() {
    let (url, server) = one_shot(500, "webhook disabled");
    let err = notifier()
        .notify(&recon(false), &url, Duration::from_secs(5))
        .await
        .unwrap_err();
    match err {
        DeliveryError::RejectedByChannel { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "webhook disabled");
        }
        other => panic!("unexpected error: {other}"),
    }
    let captured = server.join().unwrap();
    assert!(captured.body.contains("Contact: John Smith, 555-0100"));
}

#[tokio::test(flavor = "multi_thread")]
async fn silent_endpoint_times_out_as_unreachable() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (release, hold) = mpsc::channel::<()>();
    let worker = std::thread::spawn(move || {
        // Accept, then never answer until the test is done.
        let request = server.recv().unwrap();
        let _ = hold.recv_timeout(Duration::from_secs(10));
        drop(request);
    });

    let started = std::time::Instant::now();
    let err = notifier()
        .notify(
            &recon(false),
            &format!("http://127.0.0.1:{port}/hook"),
            Duration::from_millis(300),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Unreachable { .. }), "got {err}");
    assert!(started.elapsed() < Duration::from_secs(5));

    release.send(()).unwrap();
    worker.join().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn closed_port_is_unreachable() {
    let port = {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        server.server_addr().to_ip().unwrap().port()
    };
    let err = notifier()
        .notify(
            &recon(false),
            &format!("http://127.0.0.1:{port}/hook"),
            Duration::from_secs(2),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Unreachable { .. }), "got {err}");
}

#[tokio::test]
async fn refuses_before_any_io() {
    let notifier = Notifier::new(DEFAULT_USER_AGENT).unwrap();
    let err = notifier
        .notify(&recon(false), "", Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::NotConfigured));

    let err = notifier
        .notify(&recon(false), "http://example.com/hook", Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::InvalidUrl(_)));
}
