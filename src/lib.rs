//! Velocity Runner - deterministic lane-runner simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, scoring, run state)
//! - `scheduler`: Fixed-step frame driver with fault isolation
//! - `settings`: Host preferences and adaptive quality
//! - `tuning`: Data-driven game balance
//! - `highscores`: Session best and local leaderboard

pub mod error;
pub mod highscores;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use error::{StepFault, TuningError};
pub use highscores::HighScores;
pub use scheduler::Scheduler;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (display refresh rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Nominal steps per second, used to convert ticks to seconds
    pub const TICKS_PER_SECOND: f32 = 60.0;

    /// Lateral offsets of the three lanes
    pub const LANE_OFFSETS: [f32; 3] = [-1.2, 0.0, 1.2];
    /// Index of the middle lane (spawn lane)
    pub const CENTER_LANE: u8 = 1;
    /// Oscillating obstacles never leave the track
    pub const TRACK_HALF_WIDTH: f32 = 1.8;

    /// Player geometry
    pub const PLAYER_RADIUS: f32 = 0.36;
    pub const GROUND_Y: f32 = 0.0;
    pub const PLAYER_GROUND_Y: f32 = GROUND_Y + PLAYER_RADIUS;
    /// Tolerance for the grounded test
    pub const GROUND_EPSILON: f32 = 0.0001;
    /// Collision box depth (shorter than the sphere to allow dodging between close obstacles)
    pub const PLAYER_HIT_DEPTH: f32 = 0.55;
    /// Height the player eases toward while flying
    pub const FLIGHT_Y: f32 = 2.5;

    /// Obstacle geometry
    pub const OBSTACLE_WIDTH: f32 = 0.9;
    pub const GROUND_OBSTACLE_HEIGHT: f32 = 0.9;
    pub const AIR_OBSTACLE_HEIGHT: f32 = 1.5;
    pub const AIR_OBSTACLE_Y: f32 = GROUND_Y + 1.3;

    /// Pickup resting heights (radius above the floor)
    pub const ORB_RADIUS: f32 = 0.22;
    pub const POWER_Y: f32 = GROUND_Y + 0.20;
    pub const CRYSTAL_Y: f32 = GROUND_Y + 0.18;

    /// Entities past this longitudinal plane are evicted
    pub const EVICTION_Z: f32 = 6.0;

    /// Run bounds
    pub const MAX_LIVES: u8 = 3;
    pub const COMBO_MAX: u8 = 5;
    pub const MAX_UPGRADE_LEVEL: u8 = 5;
}

/// Move `current` toward `target` by at most `max_step`
#[inline]
pub fn approach(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + delta.signum() * max_step
    }
}

/// Lateral offset for a lane index (out-of-range lanes clamp to the edge)
#[inline]
pub fn lane_offset(lane: u8) -> f32 {
    consts::LANE_OFFSETS[usize::from(lane.min(2))]
}
