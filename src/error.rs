//! Error types
//!
//! Running out of lives is not an error: it surfaces as the `Dead` run state.
//! Intents that cannot apply (wrong state, lane already at the edge) are
//! dropped silently. What remains is a fault inside a single step, and bad
//! tuning data supplied by the host.

use thiserror::Error;

/// A fault raised while advancing one step.
///
/// The simulation never propagates these as a crash: the run is forced to
/// `Paused` and stepping continues on later frames.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepFault {
    #[error("non-finite {what} at tick {tick}")]
    NonFinite { what: &'static str, tick: u64 },

    #[error("lane index {0} is out of range")]
    LaneOutOfRange(u8),

    #[error("{what} value {value} exceeds its cap of {cap}")]
    OutOfBounds {
        what: &'static str,
        value: u32,
        cap: u32,
    },

    #[error("step panicked: {0}")]
    Panicked(String),
}

/// Errors from loading or validating [`crate::Tuning`].
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value: {0}")]
    Invalid(&'static str),
}
