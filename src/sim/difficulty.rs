//! Difficulty ramp and boss-burst scheduling

use serde::{Deserialize, Serialize};

use super::timers::{PowerTimers, TimerKind};
use crate::consts::TICKS_PER_SECOND;
use crate::tuning::Tuning;

/// Normalized difficulty in [0, 1] from elapsed time and player performance
pub fn diff_factor(ticks: u64, score: u64, tuning: &Tuning) -> f32 {
    let seconds = ticks as f32 / TICKS_PER_SECOND;
    let adaptive = if seconds > tuning.adaptive_after_seconds {
        (score as f32 / (seconds * 12.0 + 1.0)).min(1.0) * tuning.adaptive_weight
    } else {
        0.0
    };
    (seconds / tuning.ramp_seconds + adaptive).clamp(0.0, 1.0)
}

/// Steps between base-speed increments; shrinks as difficulty rises
pub fn ramp_interval(diff: f32) -> u64 {
    600u64.saturating_sub((300.0 * diff).floor() as u64).max(300)
}

/// What the boss scheduler decided this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossSignal {
    None,
    /// Score is closing in on the threshold
    Warning { threshold: u64 },
    /// Threshold crossed; stamp a burst. `unannounced` when the score
    /// jumped past the warning lead in one step, so the warning is due now too.
    Burst { threshold: u64, unannounced: bool },
}

/// Speed ramp and milestone state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Base speed before time acceleration and multipliers
    pub base_speed: f32,
    /// Effective per-step scroll speed
    pub scroll_speed: f32,
    /// Last computed difficulty factor
    pub factor: f32,
    pub next_boss_at: u64,
    /// Threshold the warning was already raised for
    pub warned_for: Option<u64>,
    pub warning_until: f64,
    pub bursts: u32,
}

impl DifficultyState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            base_speed: tuning.base_speed,
            scroll_speed: tuning.base_speed,
            factor: 0.0,
            next_boss_at: tuning.boss_first_threshold,
            warned_for: None,
            warning_until: 0.0,
            bursts: 0,
        }
    }

    pub fn warning_active(&self, now: f64) -> bool {
        now < self.warning_until
    }

    /// Advance the ramp and recompute scroll speed for the next step
    pub fn update_speed(
        &mut self,
        ticks: u64,
        score: u64,
        timers: &PowerTimers,
        now: f64,
        assist: bool,
        tuning: &Tuning,
    ) {
        self.factor = diff_factor(ticks, score, tuning);

        if ticks > 0 && ticks.is_multiple_of(ramp_interval(self.factor)) {
            self.base_speed += tuning.speed_step;
            log::debug!("Speed ramp at tick {}: base {:.2}", ticks, self.base_speed);
        }

        let extra = tuning.adaptive_accel * self.factor;
        let mut speed = self.base_speed + ticks as f32 * (tuning.accel + extra);
        if timers.is_active(TimerKind::Risk, now) {
            speed *= tuning.risk_speed_mult;
        }
        if timers.is_active(TimerKind::Boost, now) {
            speed *= tuning.boost_speed_mult;
        }
        if assist {
            speed *= tuning.assist_speed_mult;
        }
        self.scroll_speed = speed;
    }

    /// Warning and burst decisions for the current score
    ///
    /// At most one burst per call; each threshold fires exactly once.
    pub fn check_boss(&mut self, score: u64, now: f64, tuning: &Tuning) -> BossSignal {
        let threshold = self.next_boss_at;

        if score >= threshold {
            let unannounced = self.warned_for != Some(threshold);
            self.warned_for = Some(threshold);
            self.warning_until = 0.0;
            self.next_boss_at += tuning.boss_threshold_step;
            self.bursts += 1;
            return BossSignal::Burst {
                threshold,
                unannounced,
            };
        }

        let lead = threshold.saturating_sub(tuning.boss_warning_lead);
        if self.warned_for != Some(threshold) && score >= lead {
            self.warned_for = Some(threshold);
            self.warning_until = now + tuning.boss_warning_ms;
            return BossSignal::Warning { threshold };
        }

        BossSignal::None
    }
}
