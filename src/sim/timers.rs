//! Power-up and grace timers
//!
//! Each timer is a single expiry timestamp on the simulation clock (ms).
//! A timer is active iff `now < expiry`.

use serde::{Deserialize, Serialize};

use super::state::PowerKind;
use crate::tuning::Tuning;

/// Independent timed effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    Magnet,
    Shield,
    /// Grants one mid-air jump per airborne phase
    Double,
    Risk,
    Boost,
    Flight,
    /// Post-hit grace, obstacles are ignored
    Invincible,
    /// Presentation only
    HitFlash,
}

impl TimerKind {
    pub const COUNT: usize = 8;

    pub const ALL: [TimerKind; Self::COUNT] = [
        TimerKind::Magnet,
        TimerKind::Shield,
        TimerKind::Double,
        TimerKind::Risk,
        TimerKind::Boost,
        TimerKind::Flight,
        TimerKind::Invincible,
        TimerKind::HitFlash,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Timer a collected power-up drives (hearts have none)
    pub fn for_power(kind: PowerKind) -> Option<TimerKind> {
        match kind {
            PowerKind::Magnet => Some(TimerKind::Magnet),
            PowerKind::Shield => Some(TimerKind::Shield),
            PowerKind::Double => Some(TimerKind::Double),
            PowerKind::Risk => Some(TimerKind::Risk),
            PowerKind::Boost => Some(TimerKind::Boost),
            PowerKind::Wings => Some(TimerKind::Flight),
            PowerKind::Heart => None,
        }
    }

    /// Full duration of a timer when granted
    pub fn duration(self, tuning: &Tuning) -> f64 {
        match self {
            TimerKind::Magnet => tuning.magnet_ms,
            TimerKind::Shield => tuning.shield_ms,
            TimerKind::Double => tuning.double_ms,
            TimerKind::Risk => tuning.risk_ms,
            TimerKind::Boost => tuning.boost_ms,
            TimerKind::Flight => tuning.wings_ms,
            TimerKind::Invincible => tuning.invincibility_ms,
            TimerKind::HitFlash => tuning.hit_flash_ms,
        }
    }
}

/// One expiry timestamp per timer kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerTimers {
    expiry: [f64; TimerKind::COUNT],
}

impl PowerTimers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self, kind: TimerKind, now: f64) -> bool {
        now < self.expiry[kind.index()]
    }

    pub fn expiry(&self, kind: TimerKind) -> f64 {
        self.expiry[kind.index()]
    }

    /// Set expiry to `now + duration_ms`
    pub fn set(&mut self, kind: TimerKind, now: f64, duration_ms: f64) {
        self.expiry[kind.index()] = now + duration_ms;
    }

    /// Grant the timer's full tuned duration from `now`
    pub fn grant(&mut self, kind: TimerKind, now: f64, tuning: &Tuning) {
        self.set(kind, now, kind.duration(tuning));
    }

    pub fn clear(&mut self, kind: TimerKind) {
        self.expiry[kind.index()] = 0.0;
    }

    pub fn reset(&mut self) {
        self.expiry = [0.0; TimerKind::COUNT];
    }

    /// Remaining fraction of the full duration, in [0, 1]
    pub fn remaining_fraction(&self, kind: TimerKind, now: f64, tuning: &Tuning) -> f32 {
        let full = kind.duration(tuning);
        if full <= 0.0 {
            return 0.0;
        }
        ((self.expiry[kind.index()] - now) / full).clamp(0.0, 1.0) as f32
    }
}
