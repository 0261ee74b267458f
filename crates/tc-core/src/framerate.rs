//! The closed set of supported professional video framerates.
//!
//! The set is fixed at compile time and not configurable at runtime. Modeling
//! it as an enum (rather than accepting arbitrary floats) makes an unhandled
//! rate a compile-time-checkable gap and keeps the wire form — the canonical
//! label string such as `"29.97"` — in one place.
//!
//! Fractional rates use a truncated frame-rollover threshold (`29.97` rolls
//! at frame 29). True SMPTE drop-frame compensation is out of scope.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a framerate string is not in the supported set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported framerate '{0}'")]
pub struct UnsupportedFramerate(pub String);

/// A supported framerate, identified by its canonical label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FrameRate {
    Fps23_976,
    Fps24,
    Fps29_97,
    Fps30,
    Fps50,
    Fps59_94,
    Fps60,
}

impl FrameRate {
    /// Every supported framerate, in ascending order.
    pub const ALL: [FrameRate; 7] = [
        FrameRate::Fps23_976,
        FrameRate::Fps24,
        FrameRate::Fps29_97,
        FrameRate::Fps30,
        FrameRate::Fps50,
        FrameRate::Fps59_94,
        FrameRate::Fps60,
    ];

    /// The canonical label used on the wire and in log output.
    pub fn label(&self) -> &'static str {
        match self {
            FrameRate::Fps23_976 => "23.976",
            FrameRate::Fps24 => "24",
            FrameRate::Fps29_97 => "29.97",
            FrameRate::Fps30 => "30",
            FrameRate::Fps50 => "50",
            FrameRate::Fps59_94 => "59.94",
            FrameRate::Fps60 => "60",
        }
    }

    /// Frames per second as a float.
    pub fn fps(&self) -> f64 {
        match self {
            FrameRate::Fps23_976 => 23.976,
            FrameRate::Fps24 => 24.0,
            FrameRate::Fps29_97 => 29.97,
            FrameRate::Fps30 => 30.0,
            FrameRate::Fps50 => 50.0,
            FrameRate::Fps59_94 => 59.94,
            FrameRate::Fps60 => 60.0,
        }
    }

    /// The frame-rollover threshold: `floor(fps)`.
    ///
    /// A timecode's frame component counts `0..max_frames`, so fractional
    /// rates truncate (29.97 → 29) rather than applying drop-frame rules.
    pub fn max_frames(&self) -> u32 {
        self.fps() as u32
    }

    /// Wall-clock interval between consecutive frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps())
    }

    /// Labels of every supported framerate, for the welcome handshake.
    pub fn supported_labels() -> Vec<String> {
        Self::ALL.iter().map(|fr| fr.label().to_string()).collect()
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FrameRate {
    type Err = UnsupportedFramerate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|fr| fr.label() == s)
            .ok_or_else(|| UnsupportedFramerate(s.to_string()))
    }
}

impl TryFrom<String> for FrameRate {
    type Error = UnsupportedFramerate;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameRate> for String {
    fn from(fr: FrameRate) -> Self {
        fr.label().to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
