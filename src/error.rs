// Error types for the metronome engine
//
// The scheduling core itself is infallible by design: configuration inputs
// are sanitized by clamping, never rejected. Errors only exist at the I/O
// edges (preset persistence), with numeric codes for structured reporting.

use log::error;
use std::fmt;

/// Error codes for structured error reporting
///
/// Standard way to get a numeric code and human-readable message from the
/// crate's error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Log a preset error with structured context
pub fn log_preset_error(err: &PresetError, context: &str) {
    error!(
        "Preset error in {}: code={}, component=PresetLibrary, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Preset persistence errors
///
/// Error code ranges: 1001-1003
#[derive(Debug, Clone, PartialEq)]
pub enum PresetError {
    /// Reading or writing the preset file failed
    Io { reason: String },

    /// The preset file holds invalid JSON
    Parse { reason: String },

    /// Index does not name a stored preset
    IndexOutOfRange { index: usize, len: usize },
}

impl ErrorCode for PresetError {
    fn code(&self) -> i32 {
        match self {
            PresetError::Io { .. } => 1001,
            PresetError::Parse { .. } => 1002,
            PresetError::IndexOutOfRange { .. } => 1003,
        }
    }

    fn message(&self) -> String {
        match self {
            PresetError::Io { reason } => {
                format!("Preset file I/O failed: {}", reason)
            }
            PresetError::Parse { reason } => {
                format!("Preset file is not valid JSON: {}", reason)
            }
            PresetError::IndexOutOfRange { index, len } => {
                format!("No preset at index {} (library holds {})", index, len)
            }
        }
    }
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PresetError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PresetError {}

impl From<std::io::Error> for PresetError {
    fn from(err: std::io::Error) -> Self {
        PresetError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PresetError {
    fn from(err: serde_json::Error) -> Self {
        PresetError::Parse {
            reason: err.to_string(),
        }
    }
}
