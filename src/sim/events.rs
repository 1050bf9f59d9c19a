//! Notifications from the core to its host
//!
//! The host drains these after each frame to drive HUD, audio and effects.

use serde::{Deserialize, Serialize};

use super::state::{ObstacleKind, PowerKind, RunState, WorldTheme};

/// Observable stats for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub score: u64,
    pub best: u64,
    /// Current scroll speed, rounded to two decimals for display
    pub speed: f32,
    pub lives: u8,
    pub world: WorldTheme,
    pub state: RunState,
    /// Remaining countdown seconds (0 outside Countdown)
    pub countdown: u32,
    pub combo: u8,
    pub combo_multiplier: f32,
    /// Fades from 1 to 0 over the combo window since the last orb
    pub combo_hint: f32,
    pub magnet: f32,
    pub shield: f32,
    pub double: f32,
    pub risk: f32,
    pub flying: bool,
    pub invincible: bool,
    pub hit_flash: bool,
    pub boss_warning: bool,
    pub dash_ready: bool,
    pub jump_level: u8,
    pub perfect_chain: u32,
}

/// Discrete happenings within a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Throttled stats snapshot
    Tick(Stats),
    StateChanged(RunState),
    CountdownTick(u32),
    LaneChanged { lane: u8 },
    Jumped { mid_air: bool },
    Landed,
    PerfectChain(u32),
    SlideStarted,
    SlideEnded,
    Dashed,
    OrbCollected { points: u64, combo: u8 },
    /// Combo crossed 3 or 5
    ComboMilestone(u8),
    PowerCollected(PowerKind),
    CrystalCollected { jump_level: u8 },
    ShieldAbsorbed { kind: ObstacleKind },
    Hit { lives: u8 },
    BossWarning { threshold: u64 },
    BossBurst { threshold: u64 },
    Died { score: u64 },
    /// A step fault forced the run into Paused
    Fault(String),
}
