//! End-to-end dispatch through `LogManager`.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lokilog::test_utils::{CollectingSink, MockLokiServer, SharedBuf, unreachable_url};
use lokilog::{
    ConsoleConfig, DispatchError, Fields, LogLevel, LogManager, LogManagerBuilder, LokiConfig,
};
use rstest::rstest;
use serde_json::{Value, json};

fn manager_with_sink(sink: &CollectingSink) -> (SharedBuf, LogManager) {
    let buf = SharedBuf::default();
    let manager = LogManagerBuilder::new()
        .with_console_writer(buf.clone(), ConsoleConfig::default())
        .with_remote_sink(Arc::new(sink.clone()))
        .build()
        .expect("build");
    (buf, manager)
}

#[rstest]
#[case(4)]
#[case(32)]
fn concurrent_producers_are_all_delivered_once(#[case] producers: usize) {
    let sink = CollectingSink::new("action-logger");
    let (buf, manager) = manager_with_sink(&sink);
    let manager = Arc::new(manager);

    let handles: Vec<_> = (0..producers)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let mut fields = Fields::new();
                fields.insert("producer".into(), json!(i));
                manager.log("action", "event {}", LogLevel::Info, fields, &[&i])
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer joins").expect("log");
    }

    let summary = manager.shutdown();
    assert_eq!(summary.processed, producers as u64);
    assert_eq!(summary.failed, 0);

    let producers_seen: HashSet<u64> = sink
        .collected()
        .iter()
        .map(|entry| {
            let record: Value = serde_json::from_str(&entry.line).expect("record json");
            record["additional_data"]["producer"]
                .as_u64()
                .expect("producer field")
        })
        .collect();
    assert_eq!(producers_seen.len(), producers);
    assert_eq!(sink.collected().len(), producers);
    assert_eq!(buf.contents_string().lines().count(), producers);
}

#[test]
fn unreachable_loki_does_not_stop_delivery_of_later_records() {
    let sink_config = LokiConfig::new(unreachable_url(), "action-logger")
        .with_timeouts(Duration::from_secs(2), Duration::from_secs(2));
    let manager = LogManagerBuilder::new()
        .with_console_disabled()
        .with_loki(sink_config)
        .build()
        .expect("build");

    for i in 0..3 {
        manager
            .log("action", "attempt {}", LogLevel::Warn, Fields::new(), &[&i])
            .expect("producer never sees push failures");
    }
    let summary = manager.shutdown();
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.failed, 3);
}

#[test]
fn records_reach_mock_loki_with_labels_and_record_json() {
    let server = MockLokiServer::start(vec![500, 204]);
    let manager = LogManagerBuilder::new()
        .with_console_disabled()
        .with_loki(LokiConfig::new(server.push_url(), "action-logger"))
        .build()
        .expect("build");

    manager
        .log("action", "GenericError", LogLevel::Error, Fields::new(), &[&"first"])
        .expect("log");
    manager
        .log("http", "UnexpectedError", LogLevel::Error, Fields::new(), &[&"second"])
        .expect("log");
    let summary = manager.shutdown();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.pushed, 1);

    let wait = Duration::from_secs(5);
    let first = server.next_request(wait).expect("first request");
    let second = server.next_request(wait).expect("second request");
    assert!(first.body.contains("An error occurred: first"));

    let body: Value = serde_json::from_str(&second.body).expect("json body");
    let stream = &body["streams"][0];
    assert_eq!(stream["stream"], json!({"job": "action-logger", "type": "HTTP"}));
    let line: Value =
        serde_json::from_str(stream["values"][0][1].as_str().expect("line")).expect("record");
    assert_eq!(line["message"], "Unexpected error: second");
    assert_eq!(line["level"], "error");
    assert_eq!(line["type"], "HTTP");
}

#[test]
fn disabled_loki_config_sends_nothing() {
    let server = MockLokiServer::start(vec![204]);
    let config = LokiConfig {
        enabled: false,
        ..LokiConfig::new(server.push_url(), "job")
    };
    let manager = LogManagerBuilder::new()
        .with_console_disabled()
        .with_loki(config)
        .build()
        .expect("build");
    manager
        .log("action", "quiet", LogLevel::Info, Fields::new(), &[])
        .expect("log");
    let summary = manager.shutdown();

    assert_eq!(summary.pushed, 1);
    assert!(server.next_request(Duration::from_millis(200)).is_none());
}

#[test]
fn logging_after_shutdown_is_rejected_not_fatal() {
    let sink = CollectingSink::new("job");
    let (buf, manager) = manager_with_sink(&sink);
    manager.shutdown();

    let result = manager.log("action", "late", LogLevel::Info, Fields::new(), &[]);
    assert_eq!(result, Err(DispatchError::Closed));
    assert!(buf.contents_string().contains("msg=late"));
    assert!(sink.collected().is_empty());
}

#[test]
fn debug_records_skip_console_but_reach_remote() {
    let sink = CollectingSink::new("job");
    let (buf, manager) = manager_with_sink(&sink);
    manager
        .log("action", "verbose detail", LogLevel::Debug, Fields::new(), &[])
        .expect("log");
    manager.shutdown();

    assert!(buf.contents_string().is_empty());
    assert_eq!(sink.collected().len(), 1);
}
