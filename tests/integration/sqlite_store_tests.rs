//! SqliteStore on a real database file shared with a second writer.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use tempfile::TempDir;

use petfeeder::adapters::sqlite::SqliteStore;
use petfeeder::app::ports::{ConfigStore, StoreError};
use petfeeder::model::{BreedDose, RestrictionWindow};

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

#[test]
fn settings_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feeder.db");

    {
        let mut store = SqliteStore::open(&path).unwrap();
        store.set_feed_interval(1, 5).unwrap();
        store
            .set_time_restriction(1, RestrictionWindow::from_hours(22, 3).unwrap())
            .unwrap();
        store.set_breed_dose("beagle", 3000).unwrap();
        store.record_detection("beagle", at(7, 30)).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.feed_interval(1).unwrap(), Some(5));
    assert_eq!(
        store.time_restriction(1).unwrap(),
        RestrictionWindow::from_hours(22, 3)
    );
    assert_eq!(store.breed_dose("beagle").unwrap(), Some(3000));
    assert_eq!(store.last_detection("beagle").unwrap(), Some(at(7, 30)));
    assert_eq!(store.detection_history(&[]).unwrap().len(), 1);
}

#[test]
fn dashboard_writes_are_seen_on_next_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feeder.db");
    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.breed_dose("pug").unwrap(), None);

    let dashboard = Connection::open(&path).unwrap();
    dashboard
        .execute(
            "INSERT INTO petbreed (breed_name, default_feed_amount) VALUES (?1, ?2)",
            params!["pug", 1500],
        )
        .unwrap();
    dashboard
        .execute(
            "INSERT INTO time_restriction (user_id, start_time, end_time) VALUES (?1, ?2, ?3)",
            params![1, "22:00", "03:00"],
        )
        .unwrap();

    assert_eq!(store.breed_dose("pug").unwrap(), Some(1500));
    assert_eq!(
        store.time_restriction(1).unwrap(),
        RestrictionWindow::from_hours(22, 3)
    );
}

#[test]
fn upserts_keep_one_row_per_key() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.set_breed_dose("beagle", 3000).unwrap();
    store.set_breed_dose("beagle", 2500).unwrap();
    store.set_feed_interval(1, 5).unwrap();
    store.set_feed_interval(1, 30).unwrap();
    store.set_last_detection("beagle", at(8, 0)).unwrap();
    store.set_last_detection("beagle", at(9, 0)).unwrap();

    assert_eq!(
        store.breeds().unwrap(),
        vec![BreedDose {
            breed: "beagle".into(),
            default_amount: 2500
        }]
    );
    assert_eq!(store.feed_interval(1).unwrap(), Some(30));
    assert_eq!(store.last_detection("beagle").unwrap(), Some(at(9, 0)));
}

#[test]
fn history_filters_by_breed_in_time_order() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.record_detection("pug", at(9, 0)).unwrap();
    store.record_detection("beagle", at(7, 0)).unwrap();
    store.record_detection("husky", at(8, 0)).unwrap();
    store.record_detection("beagle", at(10, 0)).unwrap();

    let all = store.detection_history(&[]).unwrap();
    let order: Vec<_> = all.iter().map(|e| e.breed.as_str()).collect();
    assert_eq!(order, ["beagle", "husky", "pug", "beagle"]);

    let some = store
        .detection_history(&["beagle".to_string(), "pug".to_string()])
        .unwrap();
    assert_eq!(some.len(), 3);
    assert!(some.iter().all(|e| e.breed != "husky"));
    assert!(some.windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn invalid_settings_are_refused() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    assert!(matches!(
        store.set_feed_interval(1, 0),
        Err(StoreError::ValidationFailed(_))
    ));
    assert!(matches!(
        store.set_feed_interval(1, 1441),
        Err(StoreError::ValidationFailed(_))
    ));
    assert!(matches!(
        store.set_breed_dose("", 100),
        Err(StoreError::ValidationFailed(_))
    ));
    assert_eq!(store.feed_interval(1).unwrap(), None);
}

#[test]
fn garbage_timestamp_reads_as_corrupted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feeder.db");
    let store = SqliteStore::open(&path).unwrap();

    let dashboard = Connection::open(&path).unwrap();
    dashboard
        .execute(
            "INSERT INTO last_detection (breed, last_detected_at) VALUES (?1, ?2)",
            params!["beagle", "yesterday-ish"],
        )
        .unwrap();

    assert!(matches!(
        store.last_detection("beagle"),
        Err(StoreError::Corrupted(_))
    ));
    // Other breeds are unaffected.
    assert_eq!(store.last_detection("pug").unwrap(), None);
}
