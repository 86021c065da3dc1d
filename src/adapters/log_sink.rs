//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per [`FeedEvent`] to the
//! `log` facade (routed to stdout by the daemon's subscriber). Every
//! suppressed or failed detection lands here with its reason.

use log::{debug, error, info, warn};

use crate::app::events::FeedEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`FeedEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &FeedEvent) {
        match event {
            FeedEvent::Started {
                user_id,
                last_feeding_time,
            } => {
                info!(
                    "START | user={} | last_feeding_time={}",
                    user_id, last_feeding_time
                );
            }
            FeedEvent::Fed {
                breed,
                amount,
                at,
                attempts,
            } => {
                info!(
                    "FED   | breed={} | amount={} | at={} | attempts={}",
                    breed, amount, at, attempts
                );
            }
            FeedEvent::Suppressed {
                breed,
                reason,
                detail,
            } => {
                info!("SKIP  | breed={} | reason={} | {}", breed, reason, detail);
            }
            FeedEvent::Failed {
                breed,
                reason,
                detail,
            } => {
                error!(
                    "ERROR | breed={} | reason={} | {}",
                    breed.as_deref().unwrap_or("-"),
                    reason,
                    detail
                );
            }
            FeedEvent::BelowThreshold { breed, confidence } => {
                debug!("LOW   | breed={} | confidence={:.2}", breed, confidence);
            }
            FeedEvent::LogFailed { breed, detail } => {
                warn!("UNLOGGED | breed={} | feed happened, log write failed: {}", breed, detail);
            }
            FeedEvent::ManualFeed { amount, forced } => {
                info!("MANUAL | amount={} | forced={}", amount, forced);
            }
            FeedEvent::Finished(stats) => {
                info!(
                    "DONE  | lines={} | fed={} | suppressed={} | errors={} | ignored={}",
                    stats.lines, stats.fed, stats.suppressed, stats.errors, stats.ignored
                );
            }
        }
    }
}
