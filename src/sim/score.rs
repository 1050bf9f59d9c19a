//! Distance score, combo and risk multipliers
//!
//! The distance baseline only ever raises the score; orb awards add on top
//! until the baseline catches up.

use serde::{Deserialize, Serialize};

use crate::consts::COMBO_MAX;
use crate::tuning::Tuning;

/// Consecutive orb pickups
///
/// The counter never decays on its own; only the display hint fades over the
/// combo window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub count: u8,
    pub last_pickup_at: f64,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            last_pickup_at: f64::NEG_INFINITY,
        }
    }
}

impl ComboState {
    /// Count a pickup, returning the new counter
    pub fn register_pickup(&mut self, now: f64) -> u8 {
        self.count = (self.count + 1).min(COMBO_MAX);
        self.last_pickup_at = now;
        self.count
    }

    pub fn multiplier(&self, tuning: &Tuning) -> f64 {
        combo_multiplier(self.count, tuning)
    }

    /// 1.0 right after a pickup, fading to 0.0 across the combo window
    pub fn hint(&self, now: f64, tuning: &Tuning) -> f32 {
        let since = now - self.last_pickup_at;
        (1.0 - (since / tuning.combo_window_ms).min(1.0)).max(0.0) as f32
    }
}

/// `1 + min(5, combo) * 0.2`
pub fn combo_multiplier(combo: u8, tuning: &Tuning) -> f64 {
    1.0 + f64::from(combo.min(COMBO_MAX)) * tuning.combo_step
}

/// Points for one orb given the combo *after* the pickup counted
pub fn orb_award(combo: u8, risk_active: bool, tuning: &Tuning) -> u64 {
    let risk = if risk_active { tuning.risk_score_mult } else { 1.0 };
    (tuning.orb_points * combo_multiplier(combo, tuning) * risk).round() as u64
}

/// Distance score for a number of running steps
pub fn distance_baseline(ticks: u64, tuning: &Tuning) -> u64 {
    (ticks as f64 * tuning.distance_score_rate).floor() as u64
}

/// Run score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
}

impl ScoreState {
    pub fn add(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Raise to the distance baseline (never lowers)
    pub fn apply_baseline(&mut self, ticks: u64, tuning: &Tuning) {
        self.score = self.score.max(distance_baseline(ticks, tuning));
    }
}
