//! Data-driven game balance
//!
//! Every gameplay constant that a designer might want to tweak lives here.
//! Defaults reproduce the shipped balance; hosts can override any subset
//! from JSON (missing fields keep their defaults).

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Gameplay balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Vertical movement (world units per step) ===
    pub gravity: f32,
    pub jump_base: f32,
    /// Extra jump per jump-upgrade level (multiplicative)
    pub jump_upgrade_step: f32,
    /// Jump scales with scroll speed, capped at this bonus
    pub jump_speed_bonus_cap: f32,
    pub jump_speed_bonus_rate: f32,

    // === Forgiveness windows (ms) ===
    pub coyote_ms: f64,
    pub assist_coyote_bonus_ms: f64,
    pub jump_buffer_ms: f64,
    pub perfect_landing_ms: f64,

    // === Slide ===
    pub slide_duration_ms: f64,
    pub slide_cooldown_ms: f64,
    pub slide_scale: f32,
    /// Per-step easing rate of the slide squash
    pub slide_ease: f32,
    pub slide_upgrade_step: f64,
    pub slide_combo_bonus: f64,

    // === Lateral movement ===
    /// Maximum lateral speed in units per second
    pub lateral_max_speed: f32,
    pub dash_cooldown_ms: f64,

    // === Flight ===
    pub flight_ease: f32,

    // === Power-up durations (ms) ===
    pub magnet_ms: f64,
    pub shield_ms: f64,
    pub double_ms: f64,
    pub risk_ms: f64,
    pub boost_ms: f64,
    pub wings_ms: f64,

    // === Hits ===
    pub shield_grace_ms: f64,
    pub invincibility_ms: f64,
    pub hit_flash_ms: f64,

    // === Pickups ===
    pub orb_pickup_radius: f32,
    pub power_pickup_radius: f32,
    pub crystal_pickup_radius: f32,
    pub magnet_radius: f32,
    pub magnet_pull: f32,
    pub magnet_upgrade_step: f32,

    // === Scoring ===
    pub orb_points: f64,
    pub combo_step: f64,
    pub combo_window_ms: f64,
    pub risk_score_mult: f64,
    pub distance_score_rate: f64,

    // === Speed ramp ===
    pub base_speed: f32,
    pub accel: f32,
    pub adaptive_accel: f32,
    pub speed_step: f32,
    pub risk_speed_mult: f32,
    pub boost_speed_mult: f32,
    pub assist_speed_mult: f32,

    // === Difficulty ===
    /// Seconds until the time ramp alone reaches full difficulty
    pub ramp_seconds: f32,
    /// Adaptive bonus only kicks in after this many seconds
    pub adaptive_after_seconds: f32,
    pub adaptive_weight: f32,

    // === Spawning ===
    pub obstacle_floor: usize,
    pub orb_floor: usize,
    pub power_floor: usize,
    pub crystal_floor: usize,
    pub power_spawn_chance: f32,
    pub obstacle_preload: usize,
    pub crystal_preload: usize,
    pub pattern_chance_base: f32,
    pub pattern_chance_diff: f32,
    pub air_chance_base: f32,
    pub air_chance_diff: f32,

    // === Boss bursts ===
    pub boss_first_threshold: u64,
    pub boss_threshold_step: u64,
    pub boss_warning_lead: u64,
    pub boss_warning_ms: f64,
    pub boss_burst_count: usize,
    pub boss_burst_spacing: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.01,
            jump_base: 0.16,
            jump_upgrade_step: 0.05,
            jump_speed_bonus_cap: 0.3,
            jump_speed_bonus_rate: 0.02,

            coyote_ms: 120.0,
            assist_coyote_bonus_ms: 100.0,
            jump_buffer_ms: 120.0,
            perfect_landing_ms: 40.0,

            slide_duration_ms: 600.0,
            slide_cooldown_ms: 200.0,
            slide_scale: 0.4,
            slide_ease: 0.35,
            slide_upgrade_step: 0.06,
            slide_combo_bonus: 1.2,

            lateral_max_speed: 6.0,
            dash_cooldown_ms: 1200.0,

            flight_ease: 0.18,

            magnet_ms: 10_000.0,
            shield_ms: 12_000.0,
            double_ms: 8_000.0,
            risk_ms: 10_000.0,
            boost_ms: 6_000.0,
            wings_ms: 6_000.0,

            shield_grace_ms: 400.0,
            invincibility_ms: 1000.0,
            hit_flash_ms: 300.0,

            orb_pickup_radius: 0.45,
            power_pickup_radius: 0.5,
            crystal_pickup_radius: 0.46,
            magnet_radius: 2.2,
            magnet_pull: 0.06,
            magnet_upgrade_step: 0.06,

            orb_points: 10.0,
            combo_step: 0.2,
            combo_window_ms: 2500.0,
            risk_score_mult: 2.0,
            distance_score_rate: 0.05,

            base_speed: 0.28,
            accel: 0.000_08,
            adaptive_accel: 0.000_04,
            speed_step: 0.05,
            risk_speed_mult: 1.25,
            boost_speed_mult: 1.55,
            assist_speed_mult: 0.92,

            ramp_seconds: 90.0,
            adaptive_after_seconds: 10.0,
            adaptive_weight: 0.15,

            obstacle_floor: 10,
            orb_floor: 12,
            power_floor: 4,
            crystal_floor: 2,
            power_spawn_chance: 0.02,
            obstacle_preload: 10,
            crystal_preload: 6,
            pattern_chance_base: 0.6,
            pattern_chance_diff: 0.2,
            air_chance_base: 0.45,
            air_chance_diff: 0.3,

            boss_first_threshold: 250,
            boss_threshold_step: 350,
            boss_warning_lead: 60,
            boss_warning_ms: 1500.0,
            boss_burst_count: 28,
            boss_burst_spacing: 6.0,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON and validate the result
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON (for tooling / inspection)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse overrides, falling back to defaults on any error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning overrides: {e}");
                Self::default()
            }
        }
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.gravity > 0.0) {
            return Err(TuningError::Invalid("gravity must be positive"));
        }
        if !(self.jump_base > 0.0) {
            return Err(TuningError::Invalid("jump_base must be positive"));
        }
        if !(self.base_speed > 0.0) {
            return Err(TuningError::Invalid("base_speed must be positive"));
        }
        if !(self.lateral_max_speed > 0.0) {
            return Err(TuningError::Invalid("lateral_max_speed must be positive"));
        }
        // Starvation: no category may be configured to stay empty
        if self.obstacle_floor == 0 || self.orb_floor == 0 || self.power_floor == 0 {
            return Err(TuningError::Invalid("spawn floors must be at least 1"));
        }
        if self.crystal_floor == 0 {
            return Err(TuningError::Invalid("crystal_floor must be at least 1"));
        }
        if !(self.power_spawn_chance > 0.0 && self.power_spawn_chance <= 1.0) {
            return Err(TuningError::Invalid("power_spawn_chance must be in (0, 1]"));
        }
        if self.boss_threshold_step == 0 {
            return Err(TuningError::Invalid("boss_threshold_step must be at least 1"));
        }
        if !(self.ramp_seconds > 0.0) {
            return Err(TuningError::Invalid("ramp_seconds must be positive"));
        }
        Ok(())
    }

    /// Duration of a slide for the given upgrade level and combo count
    pub fn slide_duration(&self, slide_level: u8, combo: u8) -> f64 {
        let combo_boost = if combo >= 2 { self.slide_combo_bonus } else { 1.0 };
        self.slide_duration_ms * (1.0 + f64::from(slide_level) * self.slide_upgrade_step) * combo_boost
    }

    /// Coyote window, extended under assist mode
    pub fn coyote_window(&self, assist: bool) -> f64 {
        if assist {
            self.coyote_ms + self.assist_coyote_bonus_ms
        } else {
            self.coyote_ms
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.02, "orb_floor": 20 }"#).unwrap();
        assert_eq!(tuning.gravity, 0.02);
        assert_eq!(tuning.orb_floor, 20);
        assert_eq!(tuning.jump_base, 0.16);
        assert_eq!(tuning.boss_first_threshold, 250);
    }

    #[test]
    fn test_rejects_starving_floor() {
        let err = Tuning::from_json(r#"{ "obstacle_floor": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_bad_json_falls_back() {
        let tuning = Tuning::from_json_or_default("{ not json");
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_slide_duration_scaling() {
        let tuning = Tuning::default();
        assert_eq!(tuning.slide_duration(0, 0), 600.0);
        assert!((tuning.slide_duration(0, 2) - 720.0).abs() < 1e-9);
        assert!((tuning.slide_duration(5, 0) - 780.0).abs() < 1e-9);
    }

    #[test]
    fn test_coyote_window_assist() {
        let tuning = Tuning::default();
        assert_eq!(tuning.coyote_window(false), 120.0);
        assert_eq!(tuning.coyote_window(true), 220.0);
    }
}
