//! SQLite configuration store.
//!
//! Implements [`ConfigStore`] over the five feeder tables. The dashboard
//! writes to the same file from another process, so the connection runs
//! in WAL mode with a busy timeout instead of holding locks across gates.
//!
//! # Tables
//!
//! | table            | key          | written by                    |
//! |------------------|--------------|-------------------------------|
//! | `feed_interval`  | `user_id`    | admin (upsert)                |
//! | `time_restriction` | `user_id`  | admin (upsert)                |
//! | `petbreed`       | `breed_name` | admin (upsert)                |
//! | `last_detection` | `breed`      | debounce guard, recorder      |
//! | `detection_log`  | rowid        | recorder (append only)        |

use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

use crate::app::ports::{validate_dose, validate_interval_minutes, ConfigStore, StoreError};
use crate::model::{BreedDose, DetectionLogEntry, DoseAmount, RestrictionWindow, UserId};

/// Default busy timeout while another writer holds the database.
const BUSY_TIMEOUT_MS: u64 = 5000;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS feed_interval (
  user_id INTEGER PRIMARY KEY,
  interval_minutes INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS time_restriction (
  user_id INTEGER PRIMARY KEY,
  start_time TEXT NOT NULL,
  end_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS petbreed (
  breed_name TEXT PRIMARY KEY,
  default_feed_amount INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS last_detection (
  breed TEXT PRIMARY KEY,
  last_detected_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS detection_log (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  breed TEXT NOT NULL,
  time TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_detection_log_breed ON detection_log(breed);
CREATE INDEX IF NOT EXISTS idx_detection_log_time ON detection_log(time);
"#;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and bootstrap the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(unavailable)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(unavailable)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(unavailable)?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))
            .map_err(unavailable)?;
        Self::init_schema(&conn)?;
        info!("SqliteStore: opened {}", path.display());
        Ok(Self { conn })
    }

    /// Private in-memory database, for dry runs and tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(SCHEMA).map_err(unavailable)
    }
}

fn unavailable(e: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Decode failures are corruption, everything else is the backend.
fn read_error(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::IntegralValueOutOfRange(..) => {
            StoreError::Corrupted(e.to_string())
        }
        other => unavailable(other),
    }
}

impl ConfigStore for SqliteStore {
    fn feed_interval(&self, user: UserId) -> Result<Option<u32>, StoreError> {
        self.conn
            .query_row(
                "SELECT interval_minutes FROM feed_interval WHERE user_id = ?1",
                [user],
                |row| row.get::<_, u32>(0),
            )
            .optional()
            .map_err(read_error)
    }

    fn set_feed_interval(&mut self, user: UserId, minutes: u32) -> Result<(), StoreError> {
        validate_interval_minutes(minutes)?;
        self.conn
            .execute(
                "INSERT INTO feed_interval (user_id, interval_minutes) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET interval_minutes = excluded.interval_minutes",
                params![user, minutes],
            )
            .map_err(unavailable)?;
        Ok(())
    }

    fn time_restriction(&self, user: UserId) -> Result<Option<RestrictionWindow>, StoreError> {
        self.conn
            .query_row(
                "SELECT start_time, end_time FROM time_restriction WHERE user_id = ?1",
                [user],
                |row| {
                    Ok(RestrictionWindow::new(
                        row.get::<_, NaiveTime>(0)?,
                        row.get::<_, NaiveTime>(1)?,
                    ))
                },
            )
            .optional()
            .map_err(read_error)
    }

    fn set_time_restriction(
        &mut self,
        user: UserId,
        window: RestrictionWindow,
    ) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO time_restriction (user_id, start_time, end_time) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                   start_time = excluded.start_time,
                   end_time = excluded.end_time",
                params![user, window.start, window.end],
            )
            .map_err(unavailable)?;
        Ok(())
    }

    fn breed_dose(&self, breed: &str) -> Result<Option<DoseAmount>, StoreError> {
        self.conn
            .query_row(
                "SELECT default_feed_amount FROM petbreed WHERE breed_name = ?1",
                [breed],
                |row| row.get::<_, DoseAmount>(0),
            )
            .optional()
            .map_err(read_error)
    }

    fn set_breed_dose(&mut self, breed: &str, amount: DoseAmount) -> Result<(), StoreError> {
        validate_dose(breed, amount)?;
        self.conn
            .execute(
                "INSERT INTO petbreed (breed_name, default_feed_amount) VALUES (?1, ?2)
                 ON CONFLICT(breed_name) DO UPDATE SET
                   default_feed_amount = excluded.default_feed_amount",
                params![breed, amount],
            )
            .map_err(unavailable)?;
        Ok(())
    }

    fn breeds(&self) -> Result<Vec<BreedDose>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT breed_name, default_feed_amount FROM petbreed ORDER BY breed_name")
            .map_err(unavailable)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(BreedDose {
                    breed: row.get(0)?,
                    default_amount: row.get(1)?,
                })
            })
            .map_err(unavailable)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(read_error)
    }

    fn last_detection(&self, breed: &str) -> Result<Option<NaiveDateTime>, StoreError> {
        self.conn
            .query_row(
                "SELECT last_detected_at FROM last_detection WHERE breed = ?1",
                [breed],
                |row| row.get::<_, NaiveDateTime>(0),
            )
            .optional()
            .map_err(read_error)
    }

    fn set_last_detection(&mut self, breed: &str, at: NaiveDateTime) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO last_detection (breed, last_detected_at) VALUES (?1, ?2)
                 ON CONFLICT(breed) DO UPDATE SET last_detected_at = excluded.last_detected_at",
                params![breed, at],
            )
            .map_err(unavailable)?;
        Ok(())
    }

    fn record_detection(&mut self, breed: &str, at: NaiveDateTime) -> Result<(), StoreError> {
        let tx = self.conn.transaction().map_err(unavailable)?;
        tx.execute(
            "INSERT INTO detection_log (breed, time) VALUES (?1, ?2)",
            params![breed, at],
        )
        .map_err(unavailable)?;
        tx.execute(
            "INSERT INTO last_detection (breed, last_detected_at) VALUES (?1, ?2)
             ON CONFLICT(breed) DO UPDATE SET last_detected_at = excluded.last_detected_at",
            params![breed, at],
        )
        .map_err(unavailable)?;
        tx.commit().map_err(unavailable)
    }

    fn detection_history(&self, breeds: &[String]) -> Result<Vec<DetectionLogEntry>, StoreError> {
        let mut sql = String::from("SELECT breed, time FROM detection_log");
        if !breeds.is_empty() {
            let placeholders = vec!["?"; breeds.len()].join(", ");
            sql.push_str(&format!(" WHERE breed IN ({placeholders})"));
        }
        sql.push_str(" ORDER BY time, id");

        let mut stmt = self.conn.prepare(&sql).map_err(unavailable)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(breeds.iter()), |row| {
                Ok(DetectionLogEntry {
                    breed: row.get(0)?,
                    time: row.get(1)?,
                })
            })
            .map_err(unavailable)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(read_error)
    }
}
