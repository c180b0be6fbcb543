//! Error types for the non-simulation edges (storage, audio, tuning).
//!
//! The simulation itself never fails. These errors are logged at the call
//! site and swallowed, or used to fall back to defaults.

use std::fmt;

/// Key/value store errors
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No storage backend available (e.g. LocalStorage disabled)
    Unavailable,
    /// Backend rejected the write (quota, private mode, ...)
    WriteFailed(String),
    /// Stored value could not be parsed
    Corrupt { key: String, value: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "storage unavailable"),
            StoreError::WriteFailed(msg) => write!(f, "storage write failed: {}", msg),
            StoreError::Corrupt { key, value } => {
                write!(f, "corrupt value for '{}': {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Audio playback errors
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// No audio context could be created
    NoContext,
    /// Sink is muted or volume is zero
    Silenced,
    /// Backend call failed
    Backend(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoContext => write!(f, "no audio context"),
            AudioError::Silenced => write!(f, "audio silenced"),
            AudioError::Backend(msg) => write!(f, "audio backend error: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {}

/// Tuning override errors
#[derive(Debug)]
pub enum TuningError {
    Parse(serde_json::Error),
    /// A value that would break a simulation invariant
    Invalid(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(err) => write!(f, "tuning parse error: {err}"),
            TuningError::Invalid(msg) => write!(f, "invalid tuning: {msg}"),
        }
    }
}

impl std::error::Error for TuningError {}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        TuningError::Parse(err)
    }
}
