//! Detection stream parsing.
//!
//! The vision process writes one line per frame of interest. Two shapes
//! are recognised:
//!
//! ```text
//! Detected breed: beagle              # marker line, score already filtered by --conf
//! Detected breed: golden retriever 0.91
//! Detected breed: beagle (0.92)
//! {"breed": "beagle", "confidence": 0.92}
//! ```
//!
//! Anything else is detector chatter (model loading, per-frame timings)
//! and classified as [`Line::Noise`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Marker the detector prints before the breed label.
pub const DETECTION_MARKER: &str = "Detected breed:";

/// Maximum breed label length in bytes.
pub const BREED_NAME_CAPACITY: usize = 48;

/// Bounded breed label.
pub type BreedName = heapless::String<BREED_NAME_CAPACITY>;

/// One detection reported by the vision process. Transient: only persisted
/// if it results in a feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionEvent {
    pub breed: BreedName,
    pub confidence: f32,
    pub observed_at: NaiveDateTime,
}

/// Classification of a single stream line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Not a detection.
    Noise,
    /// A scored detection under the confidence threshold.
    BelowThreshold { breed: BreedName, confidence: f32 },
    Detection(DetectionEvent),
}

#[derive(Deserialize)]
struct StructuredLine {
    breed: String,
    confidence: f32,
}

/// Classify `raw`, stamping detections with `observed_at`.
///
/// Detections at or above `threshold` are accepted. Marker lines without a
/// score are recorded at `threshold`.
pub fn parse_line(raw: &str, threshold: f32, observed_at: NaiveDateTime) -> Result<Line, ParseError> {
    let line = raw.trim();

    let (label, confidence) = if line.starts_with('{') {
        let parsed: StructuredLine =
            serde_json::from_str(line).map_err(|e| ParseError::Malformed(e.to_string()))?;
        (parsed.breed, Some(parsed.confidence))
    } else if let Some((_, rest)) = line.split_once(DETECTION_MARKER) {
        let (label, score) = split_score(rest.trim());
        (label.to_owned(), score)
    } else {
        return Ok(Line::Noise);
    };

    let breed = breed_name(&label)?;
    let confidence = match confidence {
        Some(c) if c.is_nan() || !(0.0..=1.0).contains(&c) => {
            return Err(ParseError::InvalidConfidence(c));
        }
        Some(c) => c,
        None => threshold,
    };

    if confidence < threshold {
        return Ok(Line::BelowThreshold { breed, confidence });
    }

    Ok(Line::Detection(DetectionEvent {
        breed,
        confidence,
        observed_at,
    }))
}

/// Peel a trailing numeric score off a marker line's payload.
fn split_score(payload: &str) -> (&str, Option<f32>) {
    let Some((head, last)) = payload.rsplit_once(char::is_whitespace) else {
        return (payload, None);
    };
    let token = last.trim_start_matches('(').trim_end_matches(')');
    if !is_decimal(token) {
        return (payload, None);
    }
    match token.parse::<f32>() {
        Ok(score) => (head.trim_end(), Some(score)),
        Err(_) => (payload, None),
    }
}

/// Plain decimal like `0.92` or `1`. Rejects `nan`, `inf` and exponents,
/// which `f32::from_str` would otherwise accept as scores.
fn is_decimal(token: &str) -> bool {
    token.bytes().any(|b| b.is_ascii_digit())
        && token.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && token.bytes().filter(|&b| b == b'.').count() <= 1
}

fn breed_name(label: &str) -> Result<BreedName, ParseError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(ParseError::EmptyBreed);
    }
    BreedName::try_from(label).map_err(|_| ParseError::BreedTooLong(label.len()))
}
