//! Tests for the Loki sink against an in-process HTTP server.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rstest::{fixture, rstest};
use serde_json::Value;

use crate::sink::{PushEntry, PushError, RemoteSink, stream_labels};
use crate::test_utils::{MockLokiServer, unreachable_url};

use super::{LokiConfig, LokiSink};

const WAIT: Duration = Duration::from_secs(5);

#[fixture]
fn entry() -> PushEntry {
    let timestamp: DateTime<Utc> =
        DateTime::from_timestamp(1_714_566_600, 42).expect("valid timestamp");
    PushEntry {
        labels: stream_labels("action-logger", "ACTION"),
        timestamp,
        line: r#"{"message":"event received","type":"ACTION","level":"info"}"#.to_owned(),
    }
}

fn sink_for(server: &MockLokiServer) -> LokiSink {
    LokiSink::new(
        LokiConfig::new(server.push_url(), "action-logger")
            .with_timeouts(Duration::from_secs(5), Duration::from_secs(5)),
    )
}

#[rstest]
fn posts_json_payload(entry: PushEntry) {
    let server = MockLokiServer::start(vec![204]);
    let sink = sink_for(&server);

    sink.push(&entry).expect("push succeeds");

    let captured = server.next_request(WAIT).expect("request");
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/loki/api/v1/push");
    assert_eq!(captured.header("Content-Type"), Some("application/json"));
    assert_eq!(captured.header("Authorization"), None);

    let body: Value = serde_json::from_str(&captured.body).expect("json body");
    let stream = &body["streams"][0];
    assert_eq!(stream["stream"]["job"], "action-logger");
    assert_eq!(stream["stream"]["type"], "ACTION");
    assert_eq!(stream["values"][0][0], "1714566600000000042");
    assert_eq!(stream["values"][0][1], entry.line.as_str());
    assert_eq!(body["streams"].as_array().map(Vec::len), Some(1));
}

#[rstest]
fn accepts_200(entry: PushEntry) {
    let server = MockLokiServer::start(vec![200]);
    assert!(sink_for(&server).push(&entry).is_ok());
}

#[rstest]
#[case(201)]
#[case(400)]
#[case(500)]
fn reports_unexpected_status(entry: PushEntry, #[case] status: u16) {
    let server = MockLokiServer::start(vec![status]);
    let err = sink_for(&server).push(&entry).expect_err("push fails");
    match err {
        PushError::UnexpectedStatus { status: got, .. } => assert_eq!(got, status),
        other => panic!("unexpected error: {other}"),
    }
    // Exactly one attempt: no retries.
    assert!(server.next_request(WAIT).is_some());
    assert!(server.next_request(Duration::from_millis(200)).is_none());
}

#[rstest]
fn sends_basic_auth_when_configured(entry: PushEntry) {
    let server = MockLokiServer::start(vec![204]);
    let sink = LokiSink::new(
        LokiConfig::new(server.push_url(), "job").with_basic_auth("user", "pass"),
    );
    sink.push(&entry).expect("push succeeds");

    let captured = server.next_request(WAIT).expect("request");
    // "user:pass" base64 encoded is "dXNlcjpwYXNz"
    assert_eq!(captured.header("authorization"), Some("Basic dXNlcjpwYXNz"));
}

#[rstest]
fn omits_auth_with_partial_credentials(entry: PushEntry) {
    let server = MockLokiServer::start(vec![204]);
    let sink = LokiSink::new(LokiConfig::new(server.push_url(), "job").with_basic_auth("user", ""));
    sink.push(&entry).expect("push succeeds");

    let captured = server.next_request(WAIT).expect("request");
    assert_eq!(captured.header("authorization"), None);
}

#[rstest]
fn unreachable_endpoint_is_transport_error(entry: PushEntry) {
    let sink = LokiSink::new(
        LokiConfig::new(unreachable_url(), "job")
            .with_timeouts(Duration::from_secs(2), Duration::from_secs(2)),
    );
    let err = sink.push(&entry).expect_err("push fails");
    assert!(matches!(err, PushError::Transport { .. }), "{err}");
    assert!(err.to_string().contains("failed to send request"));
}

#[rstest]
#[case::disabled(false, true)]
#[case::empty_url(true, false)]
fn inactive_sink_makes_no_requests(
    entry: PushEntry,
    #[case] enabled: bool,
    #[case] with_url: bool,
) {
    let server = MockLokiServer::start(vec![204]);
    let config = LokiConfig {
        enabled,
        push_url: if with_url { server.push_url() } else { String::new() },
        job: "job".into(),
        ..LokiConfig::default()
    };
    let sink = LokiSink::new(config);

    for _ in 0..3 {
        assert!(sink.push(&entry).is_ok());
    }
    assert!(server.next_request(Duration::from_millis(200)).is_none());
}

#[test]
fn sink_reports_job_and_enabled_flag() {
    let sink = LokiSink::new(LokiConfig::new("http://loki", "events"));
    assert_eq!(sink.job(), "events");
    assert!(sink.is_enabled());
    assert!(!LokiSink::new(LokiConfig::default()).is_enabled());
}
