//! Run state and core simulation types
//!
//! Everything one run mutates lives in [`Session`]. A fresh session is built
//! on every Start/Restart and passed by reference to each subsystem.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyState;
use super::events::GameEvent;
use super::rng::RunRng;
use super::score::{ComboState, ScoreState};
use super::timers::PowerTimers;
use crate::consts::*;
use crate::lane_offset;
use crate::tuning::Tuning;

/// Top-level run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Configured, waiting for Start
    Ready,
    /// Counting down before the run begins
    Countdown,
    /// Active gameplay
    Running,
    /// Simulation frozen
    Paused,
    /// Out of lives
    Dead,
}

/// Visual biome; carried through for presentation only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorldTheme {
    #[default]
    NeonCity,
    InkVoid,
    FrostCavern,
    DesertDusk,
}

impl WorldTheme {
    pub const ALL: [WorldTheme; 4] = [
        WorldTheme::NeonCity,
        WorldTheme::InkVoid,
        WorldTheme::FrostCavern,
        WorldTheme::DesertDusk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorldTheme::NeonCity => "neonCity",
            WorldTheme::InkVoid => "inkVoid",
            WorldTheme::FrostCavern => "frostCavern",
            WorldTheme::DesertDusk => "desertDusk",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }

    /// Pick a theme different from `exclude` for the next run
    pub fn next_random(exclude: Option<WorldTheme>, rng: &mut RunRng) -> Self {
        let pool: Vec<WorldTheme> = Self::ALL
            .iter()
            .copied()
            .filter(|t| Some(*t) != exclude)
            .collect();
        pool[rng.index(pool.len())]
    }
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Sits on the floor, jump over it
    Ground,
    /// Hangs above the floor, slide under it
    Air,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerKind {
    Magnet,
    Boost,
    Shield,
    Double,
    Risk,
    Wings,
    Heart,
}

impl PowerKind {
    /// Weighted draw: magnet 34%, shield 34%, double 22%, heart 7%, risk 3%
    pub fn from_roll(r: f32) -> Self {
        if r < 0.34 {
            PowerKind::Magnet
        } else if r < 0.68 {
            PowerKind::Shield
        } else if r < 0.90 {
            PowerKind::Double
        } else if r < 0.97 {
            PowerKind::Heart
        } else {
            PowerKind::Risk
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Grow by `pad` on each side
    pub fn expanded(&self, pad: Vec3) -> Self {
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Permanent upgrades (survive restarts within one simulation)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    /// Raised by collecting crystals, capped at 5
    pub jump: u8,
    pub magnet: u8,
    pub slide: u8,
}

/// Per-run parameters supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Shared seed for the day
    pub seed: u32,
    /// Unique per run
    pub salt: u32,
    pub theme: WorldTheme,
    /// Longer coyote window and slightly slower scroll
    pub assist: bool,
    pub countdown_seconds: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            salt: 0,
            theme: WorldTheme::default(),
            assist: false,
            countdown_seconds: 2,
        }
    }
}

/// The player avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Target lane (0..=2)
    pub lane: u8,
    /// x: lateral, y: vertical (sphere center), z: always 0
    pub pos: Vec3,
    /// Vertical velocity (units per step)
    pub vy: f32,
    /// Vertical squash (1.0 standing, eases to the slide scale)
    pub scale_y: f32,
    pub lives: u8,
    pub grounded: bool,
    pub was_grounded: bool,
    /// Last step the player stood on the floor (coyote reference)
    pub last_grounded_at: f64,
    /// Last landing event (perfect-chain reference)
    pub landed_at: f64,
    /// Pending jump request expiry
    pub jump_buffer_until: Option<f64>,
    /// Mid-air jumps spent this airborne phase
    pub air_jumps: u8,
    /// A ground/coyote jump was spent since the last landing
    pub jumped_since_grounded: bool,
    pub sliding: bool,
    pub slide_started_at: f64,
    pub slide_ended_at: f64,
    pub perfect_chain: u32,
    /// Dash is available once the clock passes this
    pub dash_ready_at: f64,
}

impl Player {
    pub fn new() -> Self {
        Self {
            lane: CENTER_LANE,
            pos: Vec3::new(lane_offset(CENTER_LANE), PLAYER_GROUND_Y, 0.0),
            vy: 0.0,
            scale_y: 1.0,
            lives: MAX_LIVES,
            grounded: true,
            was_grounded: true,
            last_grounded_at: 0.0,
            landed_at: f64::NEG_INFINITY,
            jump_buffer_until: None,
            air_jumps: 0,
            jumped_since_grounded: false,
            sliding: false,
            slide_started_at: 0.0,
            slide_ended_at: f64::NEG_INFINITY,
            perfect_chain: 0,
            dash_ready_at: 0.0,
        }
    }

    /// Collision volume: narrower and shorter while sliding
    pub fn hit_box(&self) -> Aabb {
        let (width_factor, height_factor, min_height) = if self.sliding {
            (0.75, 0.7, 0.16)
        } else {
            (0.82, 0.9, 0.22)
        };
        let diameter = PLAYER_RADIUS * 2.0;
        let height = (diameter * self.scale_y * height_factor).max(min_height);
        Aabb::from_center_size(
            self.pos,
            Vec3::new(diameter * width_factor, height, PLAYER_HIT_DEPTH),
        )
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Optional per-obstacle movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Sways laterally
    pub oscillate: bool,
    /// Spins (cosmetic)
    pub rotate: bool,
    pub speed: f32,
    pub rotation: f32,
}

/// An obstacle entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec3,
    pub active: bool,
    pub motion: Option<Motion>,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, x: f32, z: f32) -> Self {
        let y = match kind {
            ObstacleKind::Ground => GROUND_Y + GROUND_OBSTACLE_HEIGHT / 2.0,
            ObstacleKind::Air => AIR_OBSTACLE_Y,
        };
        Self {
            id,
            kind,
            pos: Vec3::new(x, y, z),
            active: true,
            motion: None,
        }
    }

    pub fn size(&self) -> Vec3 {
        match self.kind {
            ObstacleKind::Ground => Vec3::new(OBSTACLE_WIDTH, GROUND_OBSTACLE_HEIGHT, OBSTACLE_WIDTH),
            ObstacleKind::Air => Vec3::new(OBSTACLE_WIDTH, AIR_OBSTACLE_HEIGHT, OBSTACLE_WIDTH),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.pos, self.size())
    }
}

/// Visual aids for an air obstacle, keyed by obstacle id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirDecoration {
    /// Pole from the floor to the obstacle's underside
    pub pole_height: f32,
    /// Outline glow phase
    pub pulse: f32,
}

/// A score orb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    pub id: u32,
    pub pos: Vec3,
    pub active: bool,
}

/// A power-up pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Power {
    pub id: u32,
    pub kind: PowerKind,
    pub pos: Vec3,
    pub active: bool,
}

/// An upgrade crystal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crystal {
    pub id: u32,
    pub pos: Vec3,
    pub active: bool,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct Session {
    pub theme: WorldTheme,
    pub assist: bool,
    /// Simulation clock (ms), advances only while Running
    pub clock_ms: f64,
    /// Running steps taken
    pub ticks: u64,
    pub rng: RunRng,
    pub player: Player,
    pub upgrades: Upgrades,
    pub timers: PowerTimers,
    pub combo: ComboState,
    pub score: ScoreState,
    pub difficulty: DifficultyState,
    /// Active obstacles (sorted by id for determinism)
    pub obstacles: Vec<Obstacle>,
    /// Side-table of air obstacle visuals
    pub decorations: BTreeMap<u32, AirDecoration>,
    pub orbs: Vec<Orb>,
    pub powers: Vec<Power>,
    pub crystals: Vec<Crystal>,
    /// Out of lives this step
    pub dead: bool,
    /// Emitted during the step, drained by the simulation
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl Session {
    /// Fresh session for a run; content is not spawned yet
    pub fn new(config: &RunConfig, upgrades: Upgrades, tuning: &Tuning) -> Self {
        Self {
            theme: config.theme,
            assist: config.assist,
            clock_ms: 0.0,
            ticks: 0,
            rng: RunRng::from_parts(config.seed, config.salt),
            player: Player::new(),
            upgrades,
            timers: PowerTimers::new(),
            combo: ComboState::default(),
            score: ScoreState::default(),
            difficulty: DifficultyState::new(tuning),
            obstacles: Vec::new(),
            decorations: BTreeMap::new(),
            orbs: Vec::new(),
            powers: Vec::new(),
            crystals: Vec::new(),
            dead: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
        self.orbs.sort_by_key(|o| o.id);
        self.powers.sort_by_key(|p| p.id);
        self.crystals.sort_by_key(|c| c.id);
    }

    /// Drop inactive entities (and their side-table rows)
    pub fn evict_inactive(&mut self) {
        let decorations = &mut self.decorations;
        self.obstacles.retain(|o| {
            if !o.active {
                decorations.remove(&o.id);
            }
            o.active
        });
        self.orbs.retain(|o| o.active);
        self.powers.retain(|p| p.active);
        self.crystals.retain(|c| c.active);
    }
}
