//! Operating modes and the rules for switching between them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CaptureReplayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Switched off at deploy time. Interception is never installed.
    Off,
    /// Installed but calling straight through.
    Disabled,
    /// Run the real call and persist its result.
    Capture,
    /// Return the persisted result without running the real call.
    Replay,
}

impl Mode {
    /// The modes that can be switched between at runtime.
    pub const RUNTIME: [Mode; 3] = [Mode::Disabled, Mode::Capture, Mode::Replay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Off => "off",
            Mode::Disabled => "disabled",
            Mode::Capture => "capture",
            Mode::Replay => "replay",
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, Mode::Off)
    }

    /// Check whether `self -> next` is a legal runtime transition.
    ///
    /// OFF is sticky in both directions: it can neither be left nor entered.
    pub fn check_transition(self, next: Mode) -> Result<(), CaptureReplayError> {
        match (self.is_off(), next.is_off()) {
            (true, false) => Err(CaptureReplayError::IllegalUsage(
                "Capturing/replaying is switched off. It is not allowed to enable it at runtime."
                    .to_string(),
            )),
            (false, true) => Err(CaptureReplayError::IllegalUsage(
                "Capturing/replaying is switched on. It is not allowed to switch it off at runtime."
                    .to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown mode '{0}' (expected off, disabled, capture or replay)")]
pub struct ModeParseError(String);

impl FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Mode::Off),
            "disabled" => Ok(Mode::Disabled),
            "capture" => Ok(Mode::Capture),
            "replay" => Ok(Mode::Replay),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
