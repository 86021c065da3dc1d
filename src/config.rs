//! Controller configuration
//!
//! All tunable parameters for the feeder controller. Values come from an
//! optional TOML file and can be overridden from the command line or
//! `FEEDER_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::adapters::http_actuator::{HttpActuatorSettings, ACTUATOR_TIMEOUT_MS};
use crate::gates::debounce::DEBOUNCE_COOLDOWN_SECS;
use crate::gates::interval::DEFAULT_INTERVAL_MINUTES;
use crate::gates::restriction::default_restriction;
use crate::model::{RestrictionWindow, UserId};

/// Minimum detector confidence for a line to count as a detection.
pub const CONFIDENCE_THRESHOLD: f32 = 0.85;

/// How far back `last_feeding_time` is seeded at startup, so the first
/// detection after a restart is never held back by the interval gate.
pub const LAST_FEEDING_SEED_HOURS: i64 = 24;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederConfig {
    // --- Gating ---
    /// Dashboard user whose interval/restriction settings apply
    pub user_id: UserId,
    /// Detections below this confidence are ignored
    pub confidence_threshold: f32,
    /// Per-breed cooldown (seconds)
    pub debounce_secs: i64,
    /// Interval used when the user has none configured (minutes)
    pub default_interval_minutes: u32,
    /// Forbidden window used when the user has none configured
    pub default_restriction_start: NaiveTime,
    pub default_restriction_end: NaiveTime,

    // --- Actuator ---
    /// Motor controller base URL (`/feed` is appended)
    pub actuator_url: String,
    /// Request timeout (milliseconds)
    pub actuator_timeout_ms: u64,
    /// Retry once when the motor controller refuses the connection
    pub retry_unreachable: bool,
    /// Pause before that retry (milliseconds)
    pub retry_backoff_ms: u64,

    // --- Collaborators ---
    /// SQLite database shared with the dashboard
    pub database_path: PathBuf,
    /// Vision process command line
    pub detector_program: String,
    pub detector_args: Vec<String>,
}

impl Default for FeederConfig {
    fn default() -> Self {
        let night = default_restriction();
        Self {
            // Gating
            user_id: 1,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            debounce_secs: DEBOUNCE_COOLDOWN_SECS,
            default_interval_minutes: DEFAULT_INTERVAL_MINUTES,
            default_restriction_start: night.start,
            default_restriction_end: night.end,

            // Actuator
            actuator_url: "http://192.168.0.13:80".into(),
            actuator_timeout_ms: ACTUATOR_TIMEOUT_MS,
            retry_unreachable: true,
            retry_backoff_ms: 500,

            // Collaborators
            database_path: PathBuf::from("feeder.sqlite"),
            detector_program: "python".into(),
            detector_args: [
                "detect.py",
                "--weights",
                "best.pt",
                "--img",
                "608",
                "--conf",
                "0.85",
                "--source",
                "http://192.168.0.13:81/stream",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl FeederConfig {
    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        validate_config(&cfg)?;
        Ok(cfg)
    }

    pub fn default_restriction(&self) -> RestrictionWindow {
        RestrictionWindow::new(self.default_restriction_start, self.default_restriction_end)
    }

    pub fn actuator_settings(&self) -> HttpActuatorSettings {
        HttpActuatorSettings {
            base_url: self.actuator_url.clone(),
            timeout: Duration::from_millis(self.actuator_timeout_ms),
            retry_unreachable: self.retry_unreachable,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Errors from loading or validating [`FeederConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The file could not be read.
    Io(String),
    /// The file is not valid TOML for this schema.
    Corrupted(String),
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "cannot read config: {}", msg),
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Reject values that would disable a gate or make the actuator unusable.
pub fn validate_config(cfg: &FeederConfig) -> Result<(), ConfigError> {
    if !(cfg.confidence_threshold > 0.0 && cfg.confidence_threshold <= 1.0) {
        return Err(ConfigError::ValidationFailed(
            "confidence_threshold must be in (0, 1]",
        ));
    }
    if !(1..=3600).contains(&cfg.debounce_secs) {
        return Err(ConfigError::ValidationFailed(
            "debounce_secs must be 1-3600",
        ));
    }
    if !(1..=crate::app::ports::MAX_INTERVAL_MINUTES).contains(&cfg.default_interval_minutes) {
        return Err(ConfigError::ValidationFailed(
            "default_interval_minutes must be 1-1440",
        ));
    }
    if !(100..=60_000).contains(&cfg.actuator_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "actuator_timeout_ms must be 100-60000",
        ));
    }
    if cfg.retry_backoff_ms > 10_000 {
        return Err(ConfigError::ValidationFailed(
            "retry_backoff_ms must be 0-10000",
        ));
    }
    if cfg.actuator_url.trim().is_empty() {
        return Err(ConfigError::ValidationFailed("actuator_url must be set"));
    }
    if cfg.detector_program.trim().is_empty() {
        return Err(ConfigError::ValidationFailed("detector_program must be set"));
    }
    Ok(())
}
