//! The `Timecode` value type: hours, minutes, seconds, frames.
//!
//! A timecode advances one frame per tick. The frame-rollover threshold is
//! supplied by the caller (see [`crate::framerate::FrameRate::max_frames`]),
//! so this type stays independent of any particular framerate.
//!
//! Parsing is deliberately permissive: `from_str` checks only that the input
//! is four colon-separated nonnegative integers. Out-of-range components
//! (e.g. `"99:00:00:00"`) are accepted verbatim and normalize on the next
//! increment. Rendering is always zero-padded `HH:MM:SS:FF`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a timecode string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimecodeError {
    /// The string did not contain exactly four colon-separated fields.
    #[error("expected four colon-separated fields (HH:MM:SS:FF), got {0}")]
    FieldCount(usize),

    /// A field was not a nonnegative integer.
    #[error("{field} component '{value}' is not a nonnegative integer")]
    NonNumeric {
        field: &'static str,
        value: String,
    },
}

/// A broadcast-video timecode `HH:MM:SS:FF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timecode {
    hours: u32,
    minutes: u32,
    seconds: u32,
    frames: u32,
}

impl Timecode {
    /// Creates a timecode from raw components.
    ///
    /// Components are not range-checked, matching the parse semantics:
    /// out-of-range values normalize on the next [`increment`](Self::increment).
    pub fn new(hours: u32, minutes: u32, seconds: u32, frames: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
        }
    }

    /// The all-zero timecode `00:00:00:00`.
    pub fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Advances the timecode by one frame.
    ///
    /// When `frames` reaches `max_frames` it resets to zero and the carry
    /// cascades through seconds, minutes, and hours; hours wrap at 24.
    pub fn increment(&mut self, max_frames: u32) {
        self.frames += 1;

        if self.frames >= max_frames {
            self.frames = 0;
            self.seconds += 1;

            if self.seconds >= 60 {
                self.seconds = 0;
                self.minutes += 1;

                if self.minutes >= 60 {
                    self.minutes = 0;
                    self.hours += 1;

                    if self.hours >= 24 {
                        self.hours = 0;
                    }
                }
            }
        }
    }
}

impl Default for Timecode {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 4 {
            return Err(TimecodeError::FieldCount(parts.len()));
        }

        let field = |index: usize, name: &'static str| -> Result<u32, TimecodeError> {
            parts[index].parse().map_err(|_| TimecodeError::NonNumeric {
                field: name,
                value: parts[index].to_string(),
            })
        };

        Ok(Self {
            hours: field(0, "hours")?,
            minutes: field(1, "minutes")?,
            seconds: field(2, "seconds")?,
            frames: field(3, "frames")?,
        })
    }
}

// String conversions used by the serde `try_from`/`into` attributes.

impl TryFrom<String> for Timecode {
    type Error = TimecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timecode> for String {
    fn from(tc: Timecode) -> Self {
        tc.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Parsing ──────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_canonical_timecode() {
        let tc: Timecode = "01:02:03:04".parse().unwrap();
        assert_eq!(tc, Timecode::new(1, 2, 3, 4));
    }

    #[test]
    fn test_parse_accepts_unpadded_fields() {
        let tc: Timecode = "1:2:3:4".parse().unwrap();
        assert_eq!(tc, Timecode::new(1, 2, 3, 4));
    }

    #[test]
    fn test_parse_accepts_out_of_range_components_verbatim() {
        // Range validation happens on increment, not at parse time.
        let tc: Timecode = "99:77:88:66".parse().unwrap();
        assert_eq!(tc, Timecode::new(99, 77, 88, 66));
    }

    #[test]
    fn test_parse_rejects_three_fields() {
        let result: Result<Timecode, _> = "01:02:03".parse();
        assert_eq!(result, Err(TimecodeError::FieldCount(3)));
    }

    #[test]
    fn test_parse_rejects_five_fields() {
        let result: Result<Timecode, _> = "01:02:03:04:05".parse();
        assert_eq!(result, Err(TimecodeError::FieldCount(5)));
    }

    #[test]
    fn test_parse_rejects_empty_string() {
        let result: Result<Timecode, _> = "".parse();
        assert_eq!(result, Err(TimecodeError::FieldCount(1)));
    }

    #[test]
    fn test_parse_rejects_non_numeric_field() {
        let result: Result<Timecode, _> = "01:xx:03:04".parse();
        assert!(matches!(
            result,
            Err(TimecodeError::NonNumeric { field: "minutes", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_negative_field() {
        let result: Result<Timecode, _> = "01:-2:03:04".parse();
        assert!(matches!(result, Err(TimecodeError::NonNumeric { .. })));
    }

    // ── Formatting ───────────────────────────────────────────────────────────

    #[test]
    fn test_display_zero_pads_all_fields() {
        assert_eq!(Timecode::new(1, 2, 3, 4).to_string(), "01:02:03:04");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let tc = Timecode::new(23, 59, 59, 29);
        let parsed: Timecode = tc.to_string().parse().unwrap();
        assert_eq!(parsed, tc);
    }

    // ── Increment ────────────────────────────────────────────────────────────

    #[test]
    fn test_increment_advances_one_frame() {
        let mut tc = Timecode::zero();
        tc.increment(30);
        assert_eq!(tc, Timecode::new(0, 0, 0, 1));
    }

    #[test]
    fn test_increment_rolls_frames_into_seconds() {
        let mut tc = Timecode::new(0, 0, 0, 29);
        tc.increment(30);
        assert_eq!(tc, Timecode::new(0, 0, 1, 0));
    }

    #[test]
    fn test_increment_full_second_of_frames() {
        // Exactly max_frames increments from frames=0 advance one second.
        let mut tc = Timecode::zero();
        for _ in 0..30 {
            tc.increment(30);
        }
        assert_eq!(tc, Timecode::new(0, 0, 1, 0));
    }

    #[test]
    fn test_increment_cascades_to_minutes() {
        let mut tc = Timecode::new(0, 0, 59, 23);
        tc.increment(24);
        assert_eq!(tc, Timecode::new(0, 1, 0, 0));
    }

    #[test]
    fn test_increment_cascades_to_hours() {
        let mut tc = Timecode::new(0, 59, 59, 59);
        tc.increment(60);
        assert_eq!(tc, Timecode::new(1, 0, 0, 0));
    }

    #[test]
    fn test_increment_wraps_at_twenty_four_hours() {
        let mut tc = Timecode::new(23, 59, 59, 29);
        tc.increment(30);
        assert_eq!(tc, Timecode::zero());
    }

    #[test]
    fn test_increment_normalizes_out_of_range_frames() {
        // A parsed-but-out-of-range frame count folds over on the next tick.
        let mut tc = Timecode::new(0, 0, 0, 45);
        tc.increment(30);
        assert_eq!(tc, Timecode::new(0, 0, 1, 0));
    }

    // ── Serde ────────────────────────────────────────────────────────────────

    #[test]
    fn test_serializes_as_canonical_string() {
        let tc = Timecode::new(1, 0, 0, 15);
        let json = serde_json::to_string(&tc).unwrap();
        assert_eq!(json, "\"01:00:00:15\"");
    }

    #[test]
    fn test_deserializes_from_string() {
        let tc: Timecode = serde_json::from_str("\"10:20:30:12\"").unwrap();
        assert_eq!(tc, Timecode::new(10, 20, 30, 12));
    }

    #[test]
    fn test_deserialize_rejects_malformed_string() {
        let result: Result<Timecode, _> = serde_json::from_str("\"10:20:30\"");
        assert!(result.is_err());
    }
}
