//! Host preferences and adaptive quality
//!
//! Stored by the host as JSON next to the high score table. None of these
//! knobs change simulation results except `assist`, which is part of the
//! run configuration.

use serde::{Deserialize, Serialize};

use crate::sim::Simulation;

/// Smoothed FPS below which quality steps down
pub const QUALITY_FPS_FLOOR: f32 = 45.0;

/// Rendering budget tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// One step cheaper, or `None` at the bottom
    pub fn downgrade(&self) -> Option<Self> {
        match self {
            QualityPreset::High => Some(QualityPreset::Medium),
            QualityPreset::Medium => Some(QualityPreset::Low),
            QualityPreset::Low => None,
        }
    }
}

/// Host preferences, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Presentation fidelity hint for the host
    pub quality: QualityPreset,
    /// Let the scheduler lower `quality` when frames run slow
    pub adaptive_quality: bool,

    // === Gameplay ===
    /// Longer coyote window, slightly slower scroll
    pub assist: bool,
    pub countdown_seconds: u32,

    // === HUD ===
    /// Steps between stats snapshots
    pub hud_interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            adaptive_quality: true,

            assist: false,
            countdown_seconds: 2,

            hud_interval: crate::sim::HUD_INTERVAL,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse stored settings, falling back to defaults
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    /// Push the gameplay-relevant preferences into a simulation
    pub fn apply_to(&self, sim: &mut Simulation) {
        sim.set_assist(self.assist);
        sim.set_countdown_seconds(self.countdown_seconds);
        sim.set_hud_interval(self.hud_interval);
    }

    /// Lower quality one step if adaptive quality allows it.
    /// Returns the new preset when it changed.
    pub fn degrade_quality(&mut self) -> Option<QualityPreset> {
        if !self.adaptive_quality {
            return None;
        }
        let lower = self.quality.downgrade()?;
        log::warn!(
            "Frame rate low, quality {} -> {}",
            self.quality.as_str(),
            lower.as_str()
        );
        self.quality = lower;
        Some(lower)
    }
}
