//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod difficulty;
pub mod events;
pub mod patterns;
pub mod physics;
pub mod rng;
pub mod score;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timers;

pub use difficulty::{BossSignal, DifficultyState, diff_factor};
pub use events::{GameEvent, Stats};
pub use rng::{RunRng, combine_seed, daily_seed};
pub use score::{ComboState, ScoreState, orb_award};
pub use state::{
    Aabb, AirDecoration, Crystal, Motion, Obstacle, ObstacleKind, Orb, Player, Power, PowerKind,
    RunConfig, RunState, Session, Upgrades, WorldTheme,
};
pub use tick::{Control, HUD_INTERVAL, Intent, Simulation};
pub use timers::{PowerTimers, TimerKind};
