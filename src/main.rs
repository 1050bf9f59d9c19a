//! Velocity Runner entry point
//!
//! Native builds run a headless demo: the autopilot plays a few runs on
//! today's seed and the resulting leaderboard is printed. The browser build
//! is driven from JS through `velocity_runner::wasm::WasmRunner`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::{Path, PathBuf};

    use chrono::{Datelike, Utc};
    use clap::Parser;
    use velocity_runner::consts::SIM_DT;
    use velocity_runner::highscores::format_age;
    use velocity_runner::sim::{
        Control, GameEvent, RunConfig, RunState, Simulation, WorldTheme, autopilot, daily_seed,
    };
    use velocity_runner::{HighScores, Scheduler, Settings, Tuning};

    /// Longest a demo run may last (simulated seconds)
    const RUN_CAP_SECONDS: f32 = 180.0;

    /// Let the autopilot play a few runs and print the leaderboard
    #[derive(Parser, Debug)]
    #[command(name = "velocity-runner", version, about)]
    struct Args {
        /// Run seed (defaults to today's daily seed)
        #[arg(long)]
        seed: Option<u32>,

        /// Number of runs to play
        #[arg(long, default_value_t = 3)]
        runs: u32,

        /// World theme
        #[arg(long, value_name = "THEME", value_parser = parse_theme, default_value = "neonCity")]
        theme: WorldTheme,

        /// Tuning overrides as JSON
        #[arg(long, value_name = "PATH")]
        tuning: Option<PathBuf>,
    }

    fn parse_theme(s: &str) -> Result<WorldTheme, String> {
        WorldTheme::parse(s).ok_or_else(|| {
            let names: Vec<&str> = WorldTheme::ALL.iter().map(|t| t.as_str()).collect();
            format!("unknown theme '{s}' (expected one of {})", names.join(", "))
        })
    }

    fn now_ms() -> f64 {
        Utc::now().timestamp_millis() as f64
    }

    fn todays_seed() -> u32 {
        let today = Utc::now().date_naive();
        daily_seed(today.year() as u32, today.month(), today.day())
    }

    fn load_tuning(path: Option<&Path>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        match std::fs::read_to_string(path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Cannot read tuning {}: {e}", path.display());
                Tuning::default()
            }
        }
    }

    pub fn run() {
        let args = Args::parse();
        let seed = args.seed.unwrap_or_else(todays_seed);

        // Headless frames always hit the step exactly
        let mut settings = Settings {
            countdown_seconds: 0,
            adaptive_quality: false,
            ..Settings::default()
        };

        let config = RunConfig {
            seed,
            theme: args.theme,
            ..RunConfig::default()
        };
        let mut sim = Simulation::new(load_tuning(args.tuning.as_deref()), config);
        settings.apply_to(&mut sim);

        let mut scheduler = Scheduler::new();
        let mut highscores = HighScores::new();
        let frame_cap = (RUN_CAP_SECONDS / SIM_DT) as u32;

        for run in 0..args.runs {
            sim.set_salt(run);
            sim.control(if run == 0 { Control::Start } else { Control::Restart });
            scheduler.reset_accumulator();

            let mut final_score = None;
            for _ in 0..frame_cap {
                if sim.state() == RunState::Running {
                    for intent in autopilot::decide(sim.session()) {
                        sim.apply_intent(intent);
                    }
                }
                scheduler.frame(&mut sim, &mut settings, SIM_DT);

                for event in sim.drain_events() {
                    match event {
                        GameEvent::Died { score } => final_score = Some(score),
                        GameEvent::BossBurst { threshold } => log::info!("Boss burst at {threshold}"),
                        GameEvent::Fault(msg) => {
                            log::error!("Fault: {msg}");
                            sim.control(Control::Resume);
                        }
                        _ => {}
                    }
                }
                if final_score.is_some() {
                    break;
                }
            }

            let stats = sim.snapshot();
            let score = final_score.unwrap_or(stats.score);
            println!(
                "Run {}: score {} speed {:.2} lives {} jump level {} ({} steps)",
                run + 1,
                score,
                stats.speed,
                stats.lives,
                stats.jump_level,
                sim.session().ticks
            );
            highscores.add_score(score, args.theme, seed, now_ms());
        }

        println!("\nHigh scores (seed {seed}):");
        let now = now_ms();
        for (rank, entry) in highscores.entries.iter().enumerate() {
            println!(
                "{:>2}. {:>8}  {:<12} {}",
                rank + 1,
                entry.score,
                entry.theme.as_str(),
                format_age(now, entry.timestamp)
            );
        }
        if let Ok(json) = highscores.to_json() {
            log::debug!("Leaderboard JSON: {json}");
        }
        log::info!("Best this session: {}", sim.best());
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Velocity Runner (headless) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm::wasm_start, this is just to satisfy the compiler
}
