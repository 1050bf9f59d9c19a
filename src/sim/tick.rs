//! Fixed timestep simulation step
//!
//! [`Simulation`] owns the run state machine and the current [`Session`]. The
//! host feeds it controls and intents, calls [`Simulation::step`] once per
//! fixed step, and drains [`GameEvent`]s afterwards.

use std::panic::{self, AssertUnwindSafe};

use super::collision;
use super::difficulty::BossSignal;
use super::events::{GameEvent, Stats};
use super::physics::{self, MoveContext};
use super::spawner;
use super::state::{RunConfig, RunState, Session, Upgrades, WorldTheme};
use super::timers::TimerKind;
use crate::consts::*;
use crate::error::StepFault;
use crate::tuning::Tuning;

/// Default HUD cadence (steps between `Tick` snapshots)
pub const HUD_INTERVAL: u64 = 6;

/// Run-level commands from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Pause,
    Resume,
    Restart,
}

/// Player input, applied at the start of the next running step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    LaneLeft,
    LaneRight,
    Jump,
    SlideBegin,
    Dash,
}

/// One game of the runner: state machine, session and event outbox
pub struct Simulation {
    tuning: Tuning,
    config: RunConfig,
    state: RunState,
    /// State to return to on Resume
    paused_from: RunState,
    session: Session,
    /// Carried from run to run
    upgrades: Upgrades,
    best: u64,
    countdown_ms: f64,
    countdown_shown: u32,
    pending: Vec<Intent>,
    events: Vec<GameEvent>,
    hud_interval: u64,
}

impl Simulation {
    pub fn new(tuning: Tuning, config: RunConfig) -> Self {
        let session = Session::new(&config, Upgrades::default(), &tuning);
        Self {
            tuning,
            config,
            state: RunState::Ready,
            paused_from: RunState::Running,
            session,
            upgrades: Upgrades::default(),
            best: 0,
            countdown_ms: 0.0,
            countdown_shown: 0,
            pending: Vec::new(),
            events: Vec::new(),
            hud_interval: HUD_INTERVAL,
        }
    }

    /// Set run-start parameters; takes effect on the next Start/Restart
    pub fn configure(&mut self, seed: u32, theme: WorldTheme) {
        self.config.seed = seed;
        self.config.theme = theme;
        if self.state == RunState::Ready {
            self.session.theme = theme;
        }
    }

    pub fn set_salt(&mut self, salt: u32) {
        self.config.salt = salt;
    }

    pub fn set_assist(&mut self, assist: bool) {
        self.config.assist = assist;
    }

    pub fn set_countdown_seconds(&mut self, seconds: u32) {
        self.config.countdown_seconds = seconds;
    }

    pub fn set_hud_interval(&mut self, steps: u64) {
        self.hud_interval = steps.max(1);
    }

    /// Seed the session best from host storage
    pub fn set_best(&mut self, best: u64) {
        self.best = self.best.max(best);
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Direct session access for hosts that inject content (tests, tools)
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn best(&self) -> u64 {
        self.best.max(self.session.score.score)
    }

    pub fn upgrades(&self) -> Upgrades {
        self.upgrades
    }

    /// Take everything emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn transition(&mut self, to: RunState) {
        if self.state == to {
            return;
        }
        log::debug!("Run state {:?} -> {:?}", self.state, to);
        self.state = to;
        self.events.push(GameEvent::StateChanged(to));
    }

    /// Fresh session from the stored seed and salt
    fn begin_run(&mut self) {
        self.upgrades = self.session.upgrades;
        self.best = self.best();
        self.session = Session::new(&self.config, self.upgrades, &self.tuning);
        spawner::preload(&mut self.session, &self.tuning);
        self.pending.clear();

        log::info!(
            "Run start: seed {} salt {} theme {} assist {}",
            self.config.seed,
            self.config.salt,
            self.config.theme.as_str(),
            self.config.assist
        );

        self.countdown_ms = f64::from(self.config.countdown_seconds) * 1000.0;
        self.countdown_shown = self.config.countdown_seconds;
        if self.state == RunState::Countdown {
            // Restarted mid-countdown: the run was still reset
            self.events.push(GameEvent::StateChanged(RunState::Countdown));
        } else {
            self.transition(RunState::Countdown);
        }
        if self.config.countdown_seconds == 0 {
            self.transition(RunState::Running);
        } else {
            self.events.push(GameEvent::CountdownTick(self.countdown_shown));
        }
    }

    pub fn control(&mut self, control: Control) {
        match (control, self.state) {
            (Control::Start, RunState::Ready | RunState::Dead) => self.begin_run(),
            (Control::Restart, _) => {
                log::info!("Restart requested");
                self.begin_run();
            }
            (Control::Pause, RunState::Running | RunState::Countdown) => {
                self.paused_from = self.state;
                self.pending.clear();
                self.transition(RunState::Paused);
            }
            (Control::Resume, RunState::Paused) => self.transition(self.paused_from),
            (control, state) => log::debug!("Ignoring {control:?} in {state:?}"),
        }
    }

    /// Queue an intent; dropped unless the run is active
    pub fn apply_intent(&mut self, intent: Intent) {
        if self.state != RunState::Running {
            log::debug!("Dropping {intent:?} in {:?}", self.state);
            return;
        }
        self.pending.push(intent);
    }

    /// Advance one fixed step of `dt` seconds
    ///
    /// Faults never escape as panics: the run is forced to `Paused`, a
    /// `Fault` event is queued and the fault is returned for logging.
    pub fn step(&mut self, dt: f32) -> Result<(), StepFault> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.step_inner(dt)));
        let fault = match result {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(fault)) => fault,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                StepFault::Panicked(message)
            }
        };

        log::error!("Step fault: {fault}");
        self.pending.clear();
        self.session.events.clear();
        if matches!(self.state, RunState::Running | RunState::Countdown) {
            self.paused_from = self.state;
            self.transition(RunState::Paused);
        }
        self.events.push(GameEvent::Fault(fault.to_string()));
        Err(fault)
    }

    fn step_inner(&mut self, dt: f32) -> Result<(), StepFault> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(StepFault::NonFinite {
                what: "dt",
                tick: self.session.ticks,
            });
        }
        match self.state {
            RunState::Countdown => {
                self.step_countdown(dt);
                Ok(())
            }
            RunState::Running => self.step_running(dt),
            RunState::Ready | RunState::Paused | RunState::Dead => Ok(()),
        }
    }

    fn step_countdown(&mut self, dt: f32) {
        self.countdown_ms -= f64::from(dt) * 1000.0;
        if self.countdown_ms <= 0.0 {
            self.countdown_ms = 0.0;
            self.countdown_shown = 0;
            self.transition(RunState::Running);
            return;
        }
        let shown = (self.countdown_ms / 1000.0).ceil() as u32;
        if shown != self.countdown_shown {
            self.countdown_shown = shown;
            self.events.push(GameEvent::CountdownTick(shown));
        }
    }

    fn step_running(&mut self, dt: f32) -> Result<(), StepFault> {
        let tuning = &self.tuning;
        let s = &mut self.session;
        s.clock_ms += f64::from(dt) * 1000.0;
        s.ticks += 1;
        let now = s.clock_ms;

        // Intents
        let ctx = MoveContext {
            now,
            dt,
            scroll_speed: s.difficulty.scroll_speed,
            upgrades: s.upgrades,
            combo: s.combo.count,
            assist: s.assist,
            double_jump: s.timers.is_active(TimerKind::Double, now),
            flying: s.timers.is_active(TimerKind::Flight, now),
        };
        for intent in self.pending.drain(..) {
            match intent {
                Intent::LaneLeft | Intent::LaneRight => {
                    let delta = if intent == Intent::LaneLeft { -1 } else { 1 };
                    if physics::change_lane(&mut s.player, delta) {
                        s.events.push(GameEvent::LaneChanged { lane: s.player.lane });
                    }
                }
                Intent::Jump => {
                    physics::request_jump(&mut s.player, &ctx, tuning, &mut s.events);
                }
                Intent::SlideBegin => {
                    if physics::begin_slide(&mut s.player, now, ctx.flying, tuning) {
                        s.events.push(GameEvent::SlideStarted);
                    }
                }
                Intent::Dash => {
                    if physics::dash(&mut s.player, now, tuning) {
                        s.events.push(GameEvent::Dashed);
                    }
                }
            }
        }

        // Player, then content
        physics::integrate(&mut s.player, &ctx, tuning, &mut s.events);
        spawner::advance(s);
        spawner::refill(s, tuning);

        let died = collision::resolve(s, tuning);
        if !died {
            s.score.apply_baseline(s.ticks, tuning);
            s.difficulty
                .update_speed(s.ticks, s.score.score, &s.timers, now, s.assist, tuning);
            match s.difficulty.check_boss(s.score.score, now, tuning) {
                BossSignal::None => {}
                BossSignal::Warning { threshold } => {
                    log::info!("Boss warning at score {} (threshold {threshold})", s.score.score);
                    s.events.push(GameEvent::BossWarning { threshold });
                }
                BossSignal::Burst {
                    threshold,
                    unannounced,
                } => {
                    if unannounced {
                        s.events.push(GameEvent::BossWarning { threshold });
                    }
                    log::info!("Boss burst at threshold {threshold}");
                    spawner::stamp_boss_burst(s, tuning);
                    s.events.push(GameEvent::BossBurst { threshold });
                }
            }
        }
        s.evict_inactive();
        s.normalize_order();
        check_invariants(s)?;

        self.events.append(&mut self.session.events);

        if died {
            let score = self.session.score.score;
            self.best = self.best.max(score);
            self.upgrades = self.session.upgrades;
            log::info!("Run over: score {score} best {}", self.best);
            self.events.push(GameEvent::Died { score });
            self.transition(RunState::Dead);
        }

        if self.session.ticks % self.hud_interval == 0 {
            let stats = self.snapshot();
            self.events.push(GameEvent::Tick(stats));
        }
        Ok(())
    }

    /// Observable stats right now
    pub fn snapshot(&self) -> Stats {
        let s = &self.session;
        let now = s.clock_ms;
        let timers = &s.timers;
        let fraction = |kind| timers.remaining_fraction(kind, now, &self.tuning);
        Stats {
            score: s.score.score,
            best: self.best(),
            speed: (s.difficulty.scroll_speed * 100.0).round() / 100.0,
            lives: s.player.lives,
            world: s.theme,
            state: self.state,
            countdown: if self.state == RunState::Countdown {
                self.countdown_shown
            } else {
                0
            },
            combo: s.combo.count,
            combo_multiplier: s.combo.multiplier(&self.tuning) as f32,
            combo_hint: s.combo.hint(now, &self.tuning),
            magnet: fraction(TimerKind::Magnet),
            shield: fraction(TimerKind::Shield),
            double: fraction(TimerKind::Double),
            risk: fraction(TimerKind::Risk),
            flying: timers.is_active(TimerKind::Flight, now),
            invincible: timers.is_active(TimerKind::Invincible, now),
            hit_flash: timers.is_active(TimerKind::HitFlash, now),
            boss_warning: s.difficulty.warning_active(now),
            dash_ready: now >= s.player.dash_ready_at,
            jump_level: s.upgrades.jump,
            perfect_chain: s.player.perfect_chain,
        }
    }
}

/// Catch corrupted state before it reaches the host
fn check_invariants(s: &Session) -> Result<(), StepFault> {
    let p = &s.player;
    if p.lane > 2 {
        return Err(StepFault::LaneOutOfRange(p.lane));
    }
    if !p.pos.is_finite() || !p.vy.is_finite() {
        return Err(StepFault::NonFinite {
            what: "player",
            tick: s.ticks,
        });
    }
    if !s.difficulty.scroll_speed.is_finite() {
        return Err(StepFault::NonFinite {
            what: "scroll speed",
            tick: s.ticks,
        });
    }
    if p.lives > MAX_LIVES {
        return Err(StepFault::OutOfBounds {
            what: "lives",
            value: u32::from(p.lives),
            cap: u32::from(MAX_LIVES),
        });
    }
    if s.combo.count > COMBO_MAX {
        return Err(StepFault::OutOfBounds {
            what: "combo",
            value: u32::from(s.combo.count),
            cap: u32::from(COMBO_MAX),
        });
    }
    Ok(())
}
