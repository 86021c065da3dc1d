//! Detection-log behaviour around a confirmed dispense.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use petfeeder::adapters::memory::MemoryStore;
use petfeeder::app::decision::{Outcome, Reason};
use petfeeder::app::events::FeedEvent;
use petfeeder::app::ports::ConfigStore;
use petfeeder::app::service::GatingService;
use petfeeder::config::FeederConfig;
use petfeeder::error::ActuatorError;

use super::mock_ports::{FlakyStore, MockMotor, RecordingSink};

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn store_with_beagle() -> FlakyStore {
    let mut inner = MemoryStore::new();
    inner.set_breed_dose("beagle", 3000).unwrap();
    FlakyStore::new(inner)
}

#[test]
fn log_failure_after_dispense_still_counts_as_fed() {
    let mut store = store_with_beagle();
    store.fail_record = true;
    let mut motor = MockMotor::new();
    let mut sink = RecordingSink::new();
    let mut svc = GatingService::new(&FeederConfig::default(), noon());

    let decision = svc
        .process_line("Detected breed: beagle 0.92", noon(), &mut store, &mut motor, &mut sink)
        .unwrap();

    assert_eq!(decision.outcome(), Outcome::Fed);
    assert_eq!(motor.dispensed, vec![3000]);
    assert_eq!(svc.last_feeding_time(), noon());
    assert_eq!(svc.unlogged_feeds(), 1);
    assert_eq!(sink.count(|e| matches!(e, FeedEvent::LogFailed { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, FeedEvent::Fed { .. })), 1);
    assert!(store.inner.detection_history(&[]).unwrap().is_empty());
}

#[test]
fn loop_continues_after_log_failure() {
    let mut store = store_with_beagle();
    store.fail_record = true;
    let mut motor = MockMotor::new();
    let mut sink = RecordingSink::new();
    let mut svc = GatingService::new(&FeederConfig::default(), noon());

    svc.process_line("Detected breed: beagle 0.92", noon(), &mut store, &mut motor, &mut sink);
    store.fail_record = false;
    let later = noon() + TimeDelta::minutes(2);
    let decision = svc
        .process_line("Detected breed: beagle 0.95", later, &mut store, &mut motor, &mut sink)
        .unwrap();

    assert_eq!(decision.outcome(), Outcome::Fed);
    let log = store.inner.detection_history(&[]).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].time, later);
}

#[test]
fn failed_dispense_writes_nothing() {
    let mut store = store_with_beagle();
    let mut motor = MockMotor::new().then_fail(ActuatorError::Timeout);
    let mut sink = RecordingSink::new();
    let mut svc = GatingService::new(&FeederConfig::default(), noon());
    let seeded = svc.last_feeding_time();

    let decision = svc
        .process_line("Detected breed: beagle 0.92", noon(), &mut store, &mut motor, &mut sink)
        .unwrap();

    assert_eq!(decision.outcome(), Outcome::Error(Reason::ActuationFailed));
    assert!(store.inner.detection_history(&[]).unwrap().is_empty());
    assert_eq!(svc.last_feeding_time(), seeded);
    assert_eq!(svc.unlogged_feeds(), 0);
}

#[test]
fn confirmed_feed_refreshes_last_detection() {
    let mut store = store_with_beagle();
    let mut motor = MockMotor::new();
    let mut sink = RecordingSink::new();
    let mut svc = GatingService::new(&FeederConfig::default(), noon());

    svc.process_line("Detected breed: beagle 0.92", noon(), &mut store, &mut motor, &mut sink);

    assert_eq!(store.last_detection("beagle").unwrap(), Some(noon()));
    assert_eq!(store.inner.detection_history(&[]).unwrap().len(), 1);
}
