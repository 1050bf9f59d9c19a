//! Browser host binding
//!
//! A JS host owns rendering, audio and input devices. It drives a
//! [`WasmRunner`] from `requestAnimationFrame`, forwards intents as short
//! strings and reads snapshots and events back as JSON.

use wasm_bindgen::prelude::*;

use crate::highscores::HighScores;
use crate::scheduler::Scheduler;
use crate::settings::Settings;
use crate::sim::{Control, GameEvent, Intent, RunConfig, RunState, Simulation, WorldTheme, autopilot, daily_seed};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier module instance
        return;
    }
    log::info!("Velocity Runner core loaded");
}

fn parse_control(kind: &str) -> Option<Control> {
    match kind {
        "start" => Some(Control::Start),
        "pause" => Some(Control::Pause),
        "resume" => Some(Control::Resume),
        "restart" => Some(Control::Restart),
        _ => None,
    }
}

fn parse_intent(kind: &str) -> Option<Intent> {
    match kind {
        "left" => Some(Intent::LaneLeft),
        "right" => Some(Intent::LaneRight),
        "jump" => Some(Intent::Jump),
        "slide" => Some(Intent::SlideBegin),
        "dash" => Some(Intent::Dash),
        _ => None,
    }
}

/// Game instance handed to JS
#[wasm_bindgen]
pub struct WasmRunner {
    sim: Simulation,
    scheduler: Scheduler,
    settings: Settings,
    highscores: HighScores,
    autopilot: bool,
    last_time: f64,
}

#[wasm_bindgen]
impl WasmRunner {
    /// Build from optional stored tuning and settings JSON
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>, settings_json: Option<String>) -> WasmRunner {
        let tuning = tuning_json
            .as_deref()
            .map(Tuning::from_json_or_default)
            .unwrap_or_default();
        let settings = settings_json
            .as_deref()
            .map(Settings::from_json_or_default)
            .unwrap_or_default();

        let mut sim = Simulation::new(tuning, RunConfig::default());
        settings.apply_to(&mut sim);
        let mut runner = WasmRunner {
            sim,
            scheduler: Scheduler::new(),
            settings,
            highscores: HighScores::new(),
            autopilot: false,
            last_time: 0.0,
        };
        runner.configure_today();
        runner
    }

    /// Today's shared seed with a fresh per-run salt
    pub fn configure_today(&mut self) {
        let date = js_sys::Date::new_0();
        let seed = daily_seed(date.get_full_year(), date.get_month() + 1, date.get_date());
        let theme = self.sim.config().theme;
        self.sim.configure(seed, theme);
        self.sim.set_salt(js_sys::Date::now() as u64 as u32);
    }

    /// Explicit seed and theme (e.g. for a shared challenge link)
    pub fn configure(&mut self, seed: u32, theme: &str) -> bool {
        let Some(theme) = WorldTheme::parse(theme) else {
            log::warn!("Unknown theme {theme}");
            return false;
        };
        self.sim.configure(seed, theme);
        true
    }

    /// Returns false for unknown control names
    pub fn control(&mut self, kind: &str) -> bool {
        let Some(control) = parse_control(kind) else {
            return false;
        };
        if matches!(control, Control::Start | Control::Restart) {
            self.scheduler.reset_accumulator();
        }
        self.sim.control(control);
        true
    }

    pub fn intent(&mut self, kind: &str) -> bool {
        match parse_intent(kind) {
            Some(intent) => {
                self.sim.apply_intent(intent);
                true
            }
            None => false,
        }
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
        log::info!("Autopilot: {on}");
    }

    /// Advance by real time; returns the fixed steps taken
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let dt = if self.last_time > 0.0 {
            ((time_ms - self.last_time) / 1000.0) as f32
        } else {
            crate::consts::SIM_DT
        };
        self.last_time = time_ms;

        if self.autopilot && self.sim.state() == RunState::Running {
            for intent in autopilot::decide(self.sim.session()) {
                self.sim.apply_intent(intent);
            }
        }
        let report = self.scheduler.frame(&mut self.sim, &mut self.settings, dt);
        report.steps
    }

    pub fn state(&self) -> String {
        format!("{:?}", self.sim.state())
    }

    pub fn fps(&self) -> f32 {
        self.scheduler.fps()
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.sim.snapshot()).unwrap_or_default()
    }

    /// Events since the last call; finished runs are recorded in the table
    pub fn drain_events_json(&mut self) -> String {
        let events = self.sim.drain_events();
        for event in &events {
            if let GameEvent::Died { score } = event {
                let config = self.sim.config();
                self.highscores
                    .add_score(*score, config.theme, config.seed, js_sys::Date::now());
            }
        }
        serde_json::to_string(&events).unwrap_or_default()
    }

    pub fn settings_json(&self) -> String {
        self.settings.to_json().unwrap_or_default()
    }

    pub fn highscores_json(&self) -> String {
        self.highscores.to_json().unwrap_or_default()
    }

    pub fn load_highscores(&mut self, json: &str) {
        self.highscores = HighScores::from_json_or_default(json);
        if let Some(top) = self.highscores.top_score() {
            self.sim.set_best(top);
        }
    }
}
