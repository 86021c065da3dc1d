//! Gating service — the hexagonal core.
//!
//! [`GatingService`] owns the four gates, the detection recorder, and the
//! process-local `last_feeding_time`. It turns each detection line into a
//! [`FeedDecision`]. All I/O flows through port traits injected at call
//! sites, so the whole pipeline runs against mocks in tests.
//!
//! ```text
//!  detection line ──▶ ┌──────────────────────────────────────┐ ──▶ EventSink
//!                     │            GatingService             │
//!     ConfigStore ◀──▶│ Debounce · Interval · Restriction ·  │
//!                     │ Dose ──▶ Actuator ──▶ Recorder       │
//!                     └──────────────────────────────────────┘
//! ```
//!
//! Events are handled strictly one at a time: the motor is a single shared
//! resource, so event N's dispense round trip completes before event N+1
//! reaches the first gate.

use std::io::BufRead;

use chrono::{NaiveDateTime, TimeDelta};
use log::{info, trace, warn};

use crate::config::{FeederConfig, LAST_FEEDING_SEED_HOURS};
use crate::detection::{parse_line, DetectionEvent, Line};
use crate::error::Error;
use crate::gates::{
    DebounceGuard, DoseResolver, GateOutcome, IntervalThrottle, TimeRestrictionChecker,
};
use crate::model::{BreedDose, DetectionLogEntry, DoseAmount, UserId};
use crate::recorder::DetectionRecorder;

use super::commands::AppCommand;
use super::decision::{FeedDecision, Reason};
use super::events::FeedEvent;
use super::ports::{Actuator, Clock, ConfigStore, EventSink, MAX_DOSE_AMOUNT};

// ───────────────────────────────────────────────────────────────
// Run statistics
// ───────────────────────────────────────────────────────────────

/// Counters since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Lines read from the detection stream.
    pub lines: u64,
    pub fed: u64,
    pub suppressed: u64,
    /// Parse failures and unconfirmed dispenses.
    pub errors: u64,
    /// Detections under the confidence threshold.
    pub ignored: u64,
}

/// Result of an [`AppCommand`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    Done,
    History(Vec<DetectionLogEntry>),
    Breeds(Vec<BreedDose>),
    Feed(FeedDecision),
}

/// A gate refusal on its way to the event log.
struct Rejection {
    reason: Reason,
    detail: String,
}

fn settle<T>(outcome: GateOutcome<T>) -> Result<T, Rejection> {
    match outcome {
        GateOutcome::Pass(value) => Ok(value),
        GateOutcome::Deny(denial) => Err(Rejection {
            reason: denial.reason(),
            detail: denial.to_string(),
        }),
        GateOutcome::Fault(e) => Err(Rejection {
            reason: Reason::StoreUnavailable,
            detail: e.to_string(),
        }),
    }
}

// ───────────────────────────────────────────────────────────────
// GatingService
// ───────────────────────────────────────────────────────────────

/// The orchestrator: one instance, one worker, one event at a time.
pub struct GatingService {
    user_id: UserId,
    confidence_threshold: f32,
    debounce: DebounceGuard,
    interval: IntervalThrottle,
    restriction: TimeRestrictionChecker,
    dose: DoseResolver,
    recorder: DetectionRecorder,
    /// Last confirmed feed. Process-local; reseeded on every restart.
    last_feeding_time: NaiveDateTime,
    stats: RunStats,
}

impl GatingService {
    /// Construct the service. `last_feeding_time` is seeded a day before
    /// `started_at` so the interval gate never blocks the first detection.
    pub fn new(config: &FeederConfig, started_at: NaiveDateTime) -> Self {
        Self {
            user_id: config.user_id,
            confidence_threshold: config.confidence_threshold,
            debounce: DebounceGuard::new(config.debounce_secs),
            interval: IntervalThrottle::new(config.default_interval_minutes),
            restriction: TimeRestrictionChecker::new(config.default_restriction()),
            dose: DoseResolver::new(),
            recorder: DetectionRecorder::new(),
            last_feeding_time: started_at - TimeDelta::hours(LAST_FEEDING_SEED_HOURS),
            stats: RunStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&self, sink: &mut impl EventSink) {
        sink.emit(&FeedEvent::Started {
            user_id: self.user_id,
            last_feeding_time: self.last_feeding_time,
        });
        info!("GatingService started for user {}", self.user_id);
    }

    /// Consume the detection stream until it closes.
    ///
    /// Lines are decoded lossily so a stray byte cannot stop the loop; only
    /// a read failure on the stream itself is returned as an error.
    pub fn run<R: BufRead>(
        &mut self,
        reader: R,
        clock: &impl Clock,
        store: &mut impl ConfigStore,
        actuator: &mut impl Actuator,
        sink: &mut impl EventSink,
    ) -> Result<RunStats, Error> {
        for chunk in reader.split(b'\n') {
            let bytes = chunk.map_err(|e| Error::Detector(format!("read detection stream: {e}")))?;
            let line = String::from_utf8_lossy(&bytes);
            self.process_line(&line, clock.now(), store, actuator, sink);
        }
        sink.emit(&FeedEvent::Finished(self.stats));
        Ok(self.stats)
    }

    // ── Per-line orchestration ────────────────────────────────

    /// Handle one raw stream line observed at `now`.
    ///
    /// Returns `None` for lines that are not detections (chatter, or under
    /// the confidence threshold).
    pub fn process_line(
        &mut self,
        line: &str,
        now: NaiveDateTime,
        store: &mut impl ConfigStore,
        actuator: &mut impl Actuator,
        sink: &mut impl EventSink,
    ) -> Option<FeedDecision> {
        self.stats.lines += 1;
        match parse_line(line, self.confidence_threshold, now) {
            Ok(Line::Noise) => {
                trace!("detector: {}", line.trim_end());
                None
            }
            Ok(Line::BelowThreshold { breed, confidence }) => {
                self.stats.ignored += 1;
                sink.emit(&FeedEvent::BelowThreshold {
                    breed: breed.to_string(),
                    confidence,
                });
                None
            }
            Ok(Line::Detection(event)) => Some(self.handle_event(&event, store, actuator, sink)),
            Err(e) => {
                self.stats.errors += 1;
                sink.emit(&FeedEvent::Failed {
                    breed: None,
                    reason: Reason::Parse,
                    detail: e.to_string(),
                });
                Some(FeedDecision::denied(Reason::Parse))
            }
        }
    }

    /// Run one detection through the gates and, if all pass, the motor.
    pub fn handle_event(
        &mut self,
        event: &DetectionEvent,
        store: &mut impl ConfigStore,
        actuator: &mut impl Actuator,
        sink: &mut impl EventSink,
    ) -> FeedDecision {
        let breed = event.breed.as_str();
        let now = event.observed_at;

        let amount = match self.run_gates(store, breed, now) {
            Ok(amount) => amount,
            Err(rejection) => {
                self.stats.suppressed += 1;
                sink.emit(&FeedEvent::Suppressed {
                    breed: breed.to_owned(),
                    reason: rejection.reason,
                    detail: rejection.detail,
                });
                return FeedDecision::denied(rejection.reason);
            }
        };

        let ack = match actuator.dispense(amount) {
            Ok(ack) => ack,
            Err(e) => {
                // Motor not confirmed: nothing is logged, last_feeding_time stays.
                self.stats.errors += 1;
                sink.emit(&FeedEvent::Failed {
                    breed: Some(breed.to_owned()),
                    reason: Reason::ActuationFailed,
                    detail: e.to_string(),
                });
                return FeedDecision::failed(Reason::ActuationFailed, Some(amount));
            }
        };

        if let Err(e) = self.recorder.record(store, breed, now) {
            sink.emit(&FeedEvent::LogFailed {
                breed: breed.to_owned(),
                detail: e.to_string(),
            });
        }
        self.last_feeding_time = now;
        self.stats.fed += 1;
        sink.emit(&FeedEvent::Fed {
            breed: breed.to_owned(),
            amount,
            at: now,
            attempts: ack.attempts,
        });
        FeedDecision::fed(amount)
    }

    /// Gates in fixed order, cheapest first. The first refusal wins.
    fn run_gates(
        &self,
        store: &mut impl ConfigStore,
        breed: &str,
        now: NaiveDateTime,
    ) -> Result<DoseAmount, Rejection> {
        settle(self.debounce.check(store, breed, now))?;
        settle(
            self.interval
                .check(&*store, self.user_id, now, self.last_feeding_time),
        )?;
        settle(self.restriction.check(&*store, self.user_id, now))?;
        settle(self.dose.resolve_dose(&*store, breed))
    }

    // ── Command handling ──────────────────────────────────────

    /// Execute an administrative command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: NaiveDateTime,
        store: &mut impl ConfigStore,
        actuator: &mut impl Actuator,
        sink: &mut impl EventSink,
    ) -> Result<CommandReply, Error> {
        match cmd {
            AppCommand::SetInterval { user_id, minutes } => {
                store.set_feed_interval(user_id, minutes)?;
                info!("feed interval for user {} set to {} min", user_id, minutes);
                Ok(CommandReply::Done)
            }
            AppCommand::SetRestriction { user_id, window } => {
                store.set_time_restriction(user_id, window)?;
                info!("time restriction for user {} set to {}", user_id, window);
                Ok(CommandReply::Done)
            }
            AppCommand::SetDose { breed, amount } => {
                store.set_breed_dose(&breed, amount)?;
                info!("dose for '{}' set to {}", breed, amount);
                Ok(CommandReply::Done)
            }
            AppCommand::History { breeds } => {
                Ok(CommandReply::History(store.detection_history(&breeds)?))
            }
            AppCommand::Breeds => Ok(CommandReply::Breeds(store.breeds()?)),
            AppCommand::Feed { amount, force } => Ok(CommandReply::Feed(
                self.manual_feed(amount, force, now, store, actuator, sink)?,
            )),
        }
    }

    /// Operator-requested dispense. The amount must be within the same
    /// 1..=`MAX_DOSE_AMOUNT` range a breed dose may hold, even with `force`.
    /// Only the restriction window applies, and `force` lifts it. Does not
    /// write the detection log or move `last_feeding_time`.
    pub fn manual_feed(
        &mut self,
        amount: DoseAmount,
        force: bool,
        now: NaiveDateTime,
        store: &mut impl ConfigStore,
        actuator: &mut impl Actuator,
        sink: &mut impl EventSink,
    ) -> Result<FeedDecision, Error> {
        if !(1..=MAX_DOSE_AMOUNT).contains(&amount) {
            warn!("manual feed of {} refused: outside 1-{}", amount, MAX_DOSE_AMOUNT);
            return Err(Error::InvalidCommand("amount must be 1-60000"));
        }
        if !force {
            if let Err(rejection) = settle(self.restriction.check(&*store, self.user_id, now)) {
                sink.emit(&FeedEvent::Suppressed {
                    breed: "(manual)".into(),
                    reason: rejection.reason,
                    detail: rejection.detail,
                });
                return Ok(FeedDecision::denied(rejection.reason));
            }
        }

        Ok(match actuator.dispense(amount) {
            Ok(_) => {
                sink.emit(&FeedEvent::ManualFeed {
                    amount,
                    forced: force,
                });
                FeedDecision::fed(amount)
            }
            Err(e) => {
                sink.emit(&FeedEvent::Failed {
                    breed: None,
                    reason: Reason::ActuationFailed,
                    detail: e.to_string(),
                });
                FeedDecision::failed(Reason::ActuationFailed, Some(amount))
            }
        })
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn last_feeding_time(&self) -> NaiveDateTime {
        self.last_feeding_time
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Confirmed feeds whose detection-log write failed.
    pub fn unlogged_feeds(&self) -> u64 {
        self.recorder.failed()
    }
}
