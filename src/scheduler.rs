//! Fixed-step frame driver
//!
//! One controlling loop: the host hands over real frame time, the scheduler
//! runs as many fixed steps as fit (bounded per frame), isolates step
//! faults and watches frame rate for the adaptive quality knob.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::settings::{QUALITY_FPS_FLOOR, QualityPreset, Settings};
use crate::sim::Simulation;

/// Frames under the FPS floor before quality steps down
const LOW_FPS_FRAMES: u32 = 60;

/// Longest frame accepted (s); longer gaps are treated as a hitch
const MAX_FRAME_DT: f32 = 0.1;

/// What one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub steps: u32,
    pub faults: u32,
    /// New preset if adaptive quality kicked in
    pub quality: Option<QualityPreset>,
}

/// Drives a [`Simulation`] from variable frame times
#[derive(Debug, Clone)]
pub struct Scheduler {
    accumulator: f32,
    stop_requested: bool,
    fps_smoothed: f32,
    low_fps_frames: u32,
    total_steps: u64,
    total_faults: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            stop_requested: false,
            fps_smoothed: 60.0,
            low_fps_frames: 0,
            total_steps: 0,
            total_faults: 0,
        }
    }

    /// Ask the loop to stop after the current frame
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    pub fn fps(&self) -> f32 {
        self.fps_smoothed
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn total_faults(&self) -> u64 {
        self.total_faults
    }

    /// Drop leftover time (after pause, focus loss or restart)
    pub fn reset_accumulator(&mut self) {
        self.accumulator = 0.0;
    }

    /// Run the fixed steps owed for a frame of `dt` seconds
    pub fn frame(&mut self, sim: &mut Simulation, settings: &mut Settings, dt: f32) -> FrameReport {
        let mut report = FrameReport::default();
        if self.stop_requested {
            return report;
        }

        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { SIM_DT };
        self.track_fps(dt);
        self.accumulator += dt;

        while self.accumulator >= SIM_DT && report.steps < MAX_SUBSTEPS {
            if sim.step(SIM_DT).is_err() {
                // Already logged and paused by the simulation
                report.faults += 1;
            }
            self.accumulator -= SIM_DT;
            report.steps += 1;
        }
        // Spiral of death guard
        if report.steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        self.total_steps += u64::from(report.steps);
        self.total_faults += u64::from(report.faults);

        if self.low_fps_frames >= LOW_FPS_FRAMES {
            self.low_fps_frames = 0;
            report.quality = settings.degrade_quality();
        }
        report
    }

    fn track_fps(&mut self, dt: f32) {
        let instant = 1.0 / dt.max(0.001);
        self.fps_smoothed = self.fps_smoothed * 0.9 + instant * 0.1;
        if self.fps_smoothed < QUALITY_FPS_FLOOR {
            self.low_fps_frames += 1;
        } else {
            self.low_fps_frames = 0;
        }
    }
}
