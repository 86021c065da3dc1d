//! HTTP motor-controller adapter.
//!
//! Implements [`Actuator`] by posting `{"amount": <n>}` to `<base>/feed` on
//! the feeder's microcontroller. Each call is bounded by the request
//! timeout and classified as unreachable, timed out, or rejected.
//!
//! ## Retry contract
//!
//! - A refused/failed **connection** may be retried once (if enabled),
//!   after a short backoff. The request never reached the motor.
//! - Timeouts are not retried: the controller may already be running the
//!   motor.
//! - Non-2xx answers are never retried: the command was delivered.

use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use reqwest::blocking::Client;
use serde::Serialize;

use crate::app::ports::{Actuator, DispenseAck};
use crate::error::ActuatorError;
use crate::model::DoseAmount;

/// Hard per-request timeout.
pub const ACTUATOR_TIMEOUT_MS: u64 = 5000;

#[derive(Serialize)]
struct FeedCommand {
    amount: DoseAmount,
}

/// Connection settings for [`HttpActuator`].
#[derive(Debug, Clone)]
pub struct HttpActuatorSettings {
    pub base_url: String,
    pub timeout: Duration,
    /// Retry once when the connection itself fails.
    pub retry_unreachable: bool,
    pub retry_backoff: Duration,
}

impl Default for HttpActuatorSettings {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.0.13:80".into(),
            timeout: Duration::from_millis(ACTUATOR_TIMEOUT_MS),
            retry_unreachable: true,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

pub struct HttpActuator {
    client: Client,
    feed_url: String,
    settings: HttpActuatorSettings,
}

impl HttpActuator {
    pub fn new(settings: HttpActuatorSettings) -> Result<Self, ActuatorError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ActuatorError::Unreachable(format!("http client: {e}")))?;
        let feed_url = format!("{}/feed", settings.base_url.trim_end_matches('/'));
        info!(
            "HttpActuator: {} (timeout {}ms, connection retry {})",
            feed_url,
            settings.timeout.as_millis(),
            if settings.retry_unreachable { "on" } else { "off" }
        );
        Ok(Self {
            client,
            feed_url,
            settings,
        })
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// One POST. The flag says whether the failure happened before the
    /// request could reach the controller.
    fn post_once(&self, amount: DoseAmount) -> Result<u16, (ActuatorError, bool)> {
        let response = self
            .client
            .post(&self.feed_url)
            .json(&FeedCommand { amount })
            .send()
            .map_err(|e| classify(&e))?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err((
                ActuatorError::Rejected {
                    status: status.as_u16(),
                },
                false,
            ))
        }
    }
}

fn classify(e: &reqwest::Error) -> (ActuatorError, bool) {
    if e.is_timeout() {
        (ActuatorError::Timeout, false)
    } else if e.is_connect() {
        (ActuatorError::Unreachable(e.to_string()), true)
    } else {
        (ActuatorError::Unreachable(e.to_string()), false)
    }
}

impl Actuator for HttpActuator {
    fn dispense(&mut self, amount: DoseAmount) -> Result<DispenseAck, ActuatorError> {
        let started = Instant::now();
        let mut attempts = 1;
        let mut result = self.post_once(amount);

        let retry = match &result {
            Err((e, true)) if self.settings.retry_unreachable => {
                warn!("actuator: {}, retrying once in {:?}", e, self.settings.retry_backoff);
                true
            }
            _ => false,
        };
        if retry {
            thread::sleep(self.settings.retry_backoff);
            attempts += 1;
            result = self.post_once(amount);
        }

        match result {
            Ok(status) => {
                info!(
                    "actuator: dispensed {} (HTTP {}, {} attempt(s), {}ms)",
                    amount,
                    status,
                    attempts,
                    started.elapsed().as_millis()
                );
                Ok(DispenseAck { status, attempts })
            }
            Err((e, _)) => Err(e),
        }
    }
}
