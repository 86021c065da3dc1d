//! HttpActuator against a mock motor controller.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;

use petfeeder::adapters::http_actuator::{HttpActuator, HttpActuatorSettings};
use petfeeder::adapters::sqlite::SqliteStore;
use petfeeder::app::decision::{Outcome, Reason};
use petfeeder::app::ports::{Actuator, ConfigStore};
use petfeeder::app::service::GatingService;
use petfeeder::config::FeederConfig;
use petfeeder::error::ActuatorError;

use super::mock_ports::RecordingSink;

fn settings(base_url: String) -> HttpActuatorSettings {
    HttpActuatorSettings {
        base_url,
        timeout: Duration::from_millis(500),
        retry_unreachable: false,
        retry_backoff: Duration::from_millis(10),
    }
}

/// A local port with nothing listening on it.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[test]
fn posts_amount_json_to_feed() {
    let server = MockServer::start();
    let feed = server.mock(|when, then| {
        when.method(POST)
            .path("/feed")
            .json_body(json!({ "amount": 3000 }));
        then.status(200).body("ok");
    });

    let mut actuator = HttpActuator::new(settings(server.base_url())).unwrap();
    let ack = actuator.dispense(3000).unwrap();

    feed.assert();
    assert_eq!(ack.status, 200);
    assert_eq!(ack.attempts, 1);
}

#[test]
fn server_error_is_rejected_and_not_retried() {
    let server = MockServer::start();
    let feed = server.mock(|when, then| {
        when.method(POST).path("/feed");
        then.status(500);
    });

    let mut actuator = HttpActuator::new(HttpActuatorSettings {
        retry_unreachable: true,
        ..settings(server.base_url())
    })
    .unwrap();

    assert_eq!(
        actuator.dispense(1000),
        Err(ActuatorError::Rejected { status: 500 })
    );
    feed.assert_hits(1);
}

#[test]
fn slow_controller_times_out() {
    let server = MockServer::start();
    let feed = server.mock(|when, then| {
        when.method(POST).path("/feed");
        then.status(200).delay(Duration::from_secs(2));
    });

    let mut actuator = HttpActuator::new(HttpActuatorSettings {
        retry_unreachable: true,
        ..settings(server.base_url())
    })
    .unwrap();

    assert_eq!(actuator.dispense(1000), Err(ActuatorError::Timeout));
    feed.assert_hits(1);
}

#[test]
fn closed_port_is_unreachable() {
    let mut actuator = HttpActuator::new(settings(closed_port_url())).unwrap();
    assert!(matches!(
        actuator.dispense(1000),
        Err(ActuatorError::Unreachable(_))
    ));
}

#[test]
fn unreachable_with_retry_waits_one_backoff_then_gives_up() {
    let backoff = Duration::from_millis(300);
    let mut actuator = HttpActuator::new(HttpActuatorSettings {
        retry_unreachable: true,
        retry_backoff: backoff,
        ..settings(closed_port_url())
    })
    .unwrap();

    let started = Instant::now();
    assert!(matches!(
        actuator.dispense(1000),
        Err(ActuatorError::Unreachable(_))
    ));
    let elapsed = started.elapsed();
    // One retry: a single backoff, never two.
    assert!(elapsed >= backoff, "no retry happened ({elapsed:?})");
    assert!(elapsed < backoff * 2, "retried more than once ({elapsed:?})");
}

#[test]
fn unreachable_without_retry_fails_immediately() {
    let backoff = Duration::from_millis(300);
    let mut actuator = HttpActuator::new(HttpActuatorSettings {
        retry_backoff: backoff,
        ..settings(closed_port_url())
    })
    .unwrap();

    let started = Instant::now();
    assert!(actuator.dispense(1000).is_err());
    assert!(started.elapsed() < backoff);
}

/// Refuses connections until `delay` has passed, then answers one
/// request with 200.
fn late_listener(delay: Duration) -> (String, thread::JoinHandle<usize>) {
    let url = closed_port_url();
    let addr = url.trim_start_matches("http://").to_string();
    let handle = thread::spawn(move || {
        thread::sleep(delay);
        let listener = TcpListener::bind(&addr).unwrap();
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.ends_with(b"}") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .unwrap();
        request.len()
    });
    (url, handle)
}

#[test]
fn connection_retry_that_succeeds_reports_two_attempts() {
    let (url, controller) = late_listener(Duration::from_millis(100));
    let mut actuator = HttpActuator::new(HttpActuatorSettings {
        retry_unreachable: true,
        retry_backoff: Duration::from_millis(600),
        ..settings(url)
    })
    .unwrap();

    let ack = actuator.dispense(1000).unwrap();

    assert_eq!(ack.status, 200);
    assert_eq!(ack.attempts, 2);
    assert!(controller.join().unwrap() > 0);
}

#[test]
fn end_to_end_beagle_is_fed_and_logged() {
    let server = MockServer::start();
    let feed = server.mock(|when, then| {
        when.method(POST)
            .path("/feed")
            .json_body(json!({ "amount": 3000 }));
        then.status(200);
    });

    let now = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.set_breed_dose("beagle", 3000).unwrap();
    let mut actuator = HttpActuator::new(settings(server.base_url())).unwrap();
    let mut sink = RecordingSink::new();
    let mut svc = GatingService::new(&FeederConfig::default(), now);

    let decision = svc
        .process_line("Detected breed: beagle 0.92", now, &mut store, &mut actuator, &mut sink)
        .unwrap();

    assert_eq!(decision.outcome(), Outcome::Fed);
    assert_eq!(decision.amount, Some(3000));
    feed.assert_hits(1);
    let log = store.detection_history(&[]).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].breed, "beagle");
    assert_eq!(log[0].time, now);
    assert_eq!(svc.last_feeding_time(), now);
}

#[test]
fn end_to_end_http_500_leaves_no_trace() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/feed");
        then.status(500);
    });

    let now = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.set_breed_dose("beagle", 3000).unwrap();
    let mut actuator = HttpActuator::new(settings(server.base_url())).unwrap();
    let mut sink = RecordingSink::new();
    let mut svc = GatingService::new(&FeederConfig::default(), now);
    let seeded = svc.last_feeding_time();

    let decision = svc
        .process_line("Detected breed: beagle 0.92", now, &mut store, &mut actuator, &mut sink)
        .unwrap();

    assert_eq!(decision.outcome(), Outcome::Error(Reason::ActuationFailed));
    assert!(store.detection_history(&[]).unwrap().is_empty());
    assert_eq!(svc.last_feeding_time(), seeded);
}
