//! Player kinematics
//!
//! Vertical motion is frame-based (velocity and gravity in units per step),
//! lateral easing is time-based (units per second), and all forgiveness
//! windows are measured on the simulation clock in milliseconds.

use super::events::GameEvent;
use super::state::{Player, Upgrades};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{approach, lane_offset};

/// Everything a movement update needs besides the player
#[derive(Debug, Clone, Copy)]
pub struct MoveContext {
    /// Simulation clock (ms)
    pub now: f64,
    /// Step length (seconds)
    pub dt: f32,
    pub scroll_speed: f32,
    pub upgrades: Upgrades,
    pub combo: u8,
    pub assist: bool,
    /// Double power active: one mid-air jump allowed
    pub double_jump: bool,
    /// Wings power active
    pub flying: bool,
}

impl Default for MoveContext {
    fn default() -> Self {
        Self {
            now: 0.0,
            dt: SIM_DT,
            scroll_speed: 0.0,
            upgrades: Upgrades::default(),
            combo: 0,
            assist: false,
            double_jump: false,
            flying: false,
        }
    }
}

/// Result of a jump request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    Jumped { mid_air: bool },
    /// Not allowed now; honored on landing if it lands within the buffer
    Buffered,
    Ignored,
}

#[inline]
fn on_ground(player: &Player) -> bool {
    player.pos.y <= PLAYER_GROUND_Y + GROUND_EPSILON
}

/// `JUMP_BASE * speedScale * jumpUpgradeMultiplier`
pub fn jump_impulse(ctx: &MoveContext, tuning: &Tuning) -> f32 {
    let speed_scale = 1.0 + (ctx.scroll_speed * tuning.jump_speed_bonus_rate).min(tuning.jump_speed_bonus_cap);
    let upgrade = 1.0 + f32::from(ctx.upgrades.jump) * tuning.jump_upgrade_step;
    tuning.jump_base * speed_scale * upgrade
}

fn launch(player: &mut Player, ctx: &MoveContext, tuning: &Tuning) {
    player.vy = jump_impulse(ctx, tuning);
    player.jump_buffer_until = None;
}

/// Shift the target lane by -1/+1; returns false at the edge
pub fn change_lane(player: &mut Player, delta: i8) -> bool {
    let lane = (i16::from(player.lane) + i16::from(delta)).clamp(0, 2) as u8;
    if lane == player.lane {
        return false;
    }
    player.lane = lane;
    true
}

/// Snap to the target lane immediately, subject to cooldown
pub fn dash(player: &mut Player, now: f64, tuning: &Tuning) -> bool {
    if now < player.dash_ready_at {
        return false;
    }
    player.pos.x = lane_offset(player.lane);
    player.dash_ready_at = now + tuning.dash_cooldown_ms;
    true
}

/// Handle a jump press
pub fn request_jump(
    player: &mut Player,
    ctx: &MoveContext,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> JumpOutcome {
    if ctx.flying {
        return JumpOutcome::Ignored;
    }

    player.jump_buffer_until = Some(ctx.now + tuning.jump_buffer_ms);

    let grounded = on_ground(player);
    let within_coyote = !player.jumped_since_grounded
        && ctx.now - player.last_grounded_at <= tuning.coyote_window(ctx.assist);
    let can_double = ctx.double_jump && player.air_jumps < 1;

    if player.sliding {
        end_slide(player, ctx.now);
        events.push(GameEvent::SlideEnded);
    }

    if grounded || within_coyote {
        bump_perfect_chain(player, ctx.now, tuning, events);
        launch(player, ctx, tuning);
        player.jumped_since_grounded = true;
        events.push(GameEvent::Jumped { mid_air: false });
        JumpOutcome::Jumped { mid_air: false }
    } else if can_double {
        player.air_jumps += 1;
        launch(player, ctx, tuning);
        events.push(GameEvent::Jumped { mid_air: true });
        JumpOutcome::Jumped { mid_air: true }
    } else {
        JumpOutcome::Buffered
    }
}

/// Jumping right after a landing extends the chain; anything slower breaks it
fn bump_perfect_chain(player: &mut Player, now: f64, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    if now - player.landed_at < tuning.perfect_landing_ms {
        player.perfect_chain += 1;
        events.push(GameEvent::PerfectChain(player.perfect_chain));
    } else {
        player.perfect_chain = 0;
    }
}

/// Start a slide (also a fast-fall when airborne)
pub fn begin_slide(player: &mut Player, now: f64, flying: bool, tuning: &Tuning) -> bool {
    if flying {
        return false;
    }
    if !player.sliding && now - player.slide_ended_at < tuning.slide_cooldown_ms {
        return false;
    }
    player.vy = player.vy.min(0.0);
    player.sliding = true;
    player.slide_started_at = now;
    true
}

/// Cut a slide short and pop most of the way back up
pub fn end_slide(player: &mut Player, now: f64) {
    player.sliding = false;
    player.slide_ended_at = now;
    player.scale_y = player.scale_y.max(0.9);
}

fn update_slide(player: &mut Player, ctx: &MoveContext, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    if !player.sliding {
        player.scale_y += (1.0 - player.scale_y) * tuning.slide_ease;
        return;
    }
    player.scale_y += (tuning.slide_scale - player.scale_y) * tuning.slide_ease;

    let duration = tuning.slide_duration(ctx.upgrades.slide, ctx.combo);
    if ctx.now - player.slide_started_at >= duration {
        player.sliding = false;
        player.slide_ended_at = ctx.now;
        events.push(GameEvent::SlideEnded);
    }
}

fn land(player: &mut Player, ctx: &MoveContext, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    player.air_jumps = 0;
    player.jumped_since_grounded = false;
    player.landed_at = ctx.now;
    player.last_grounded_at = ctx.now;
    events.push(GameEvent::Landed);

    match player.jump_buffer_until {
        Some(until) if ctx.now <= until => {
            bump_perfect_chain(player, ctx.now, tuning, events);
            launch(player, ctx, tuning);
            player.jumped_since_grounded = true;
            events.push(GameEvent::Jumped { mid_air: false });
        }
        Some(_) => player.jump_buffer_until = None,
        None => {}
    }
}

/// Advance the player by one step
pub fn integrate(player: &mut Player, ctx: &MoveContext, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    // Lateral: ease toward the lane at a bounded speed
    let max_step = tuning.lateral_max_speed * ctx.dt.max(0.001);
    player.pos.x = approach(player.pos.x, lane_offset(player.lane), max_step);

    let grounded = on_ground(player);

    if ctx.flying {
        if player.sliding {
            end_slide(player, ctx.now);
            events.push(GameEvent::SlideEnded);
        }
        player.vy = 0.0;
        player.pos.y += (FLIGHT_Y - player.pos.y) * tuning.flight_ease;
        player.scale_y += (1.0 - player.scale_y) * tuning.slide_ease;
        player.was_grounded = true;
    } else {
        if grounded && !player.was_grounded {
            land(player, ctx, tuning, events);
        }

        if player.sliding {
            player.pos.y = PLAYER_GROUND_Y;
            player.vy = 0.0;
        } else {
            player.vy -= tuning.gravity;
            player.pos.y += player.vy;
            if player.pos.y < PLAYER_GROUND_Y {
                player.pos.y = PLAYER_GROUND_Y;
                player.vy = 0.0;
            }
        }
        update_slide(player, ctx, tuning, events);

        if grounded {
            player.last_grounded_at = ctx.now;
        }
        player.was_grounded = grounded;
    }

    player.grounded = on_ground(player);
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_MS: f64 = 20.0;

    fn ctx(now: f64) -> MoveContext {
        MoveContext {
            now,
            scroll_speed: 0.28,
            ..Default::default()
        }
    }

    /// Clock of the step on which a jump launched at `start` lands
    fn landing_time(player: &Player, start: f64, tuning: &Tuning) -> f64 {
        let mut trial = player.clone();
        let mut events = Vec::new();
        let mut now = start;
        for _ in 0..1000 {
            now += STEP_MS;
            integrate(&mut trial, &ctx(now), tuning, &mut events);
            if trial.landed_at == now {
                return now;
            }
        }
        panic!("player never landed");
    }

    #[test]
    fn test_jump_from_ground_and_land() {
        let tuning = Tuning::default();
        let mut player = Player::new();
        let mut events = Vec::new();
        let outcome = request_jump(&mut player, &ctx(0.0), &tuning, &mut events);
        assert_eq!(outcome, JumpOutcome::Jumped { mid_air: false });
        assert!(player.vy > tuning.jump_base);

        let mut now = 0.0;
        let mut peak = player.pos.y;
        for _ in 0..60 {
            now += STEP_MS;
            integrate(&mut player, &ctx(now), &tuning, &mut events);
            peak = peak.max(player.pos.y);
        }
        assert!(peak > 1.4, "peak {peak}");
        assert!(player.grounded);
        assert_eq!(player.pos.y, PLAYER_GROUND_Y);
        assert!(events.contains(&GameEvent::Landed));
    }

    #[test]
    fn test_buffered_jump_fires_on_landing_step() {
        let tuning = Tuning::default();
        let mut player = Player::new();
        let mut events = Vec::new();
        request_jump(&mut player, &ctx(0.0), &tuning, &mut events);
        let land_at = landing_time(&player, 0.0, &tuning);

        let mut now = 0.0;
        while now < land_at {
            now += STEP_MS;
            events.clear();
            if now == land_at - 80.0 {
                let outcome = request_jump(&mut player, &ctx(now), &tuning, &mut events);
                assert_eq!(outcome, JumpOutcome::Buffered);
            }
            integrate(&mut player, &ctx(now), &tuning, &mut events);
        }

        // The landing step itself relaunched the player
        assert_eq!(player.landed_at, land_at);
        assert_eq!(
            events,
            vec![GameEvent::Landed, GameEvent::PerfectChain(1), GameEvent::Jumped { mid_air: false }]
        );
        assert!(player.vy > 0.0);
        assert!(!player.grounded);
    }

    #[test]
    fn test_expired_buffer_is_discarded() {
        let tuning = Tuning::default();
        let mut player = Player::new();
        let mut events = Vec::new();
        request_jump(&mut player, &ctx(0.0), &tuning, &mut events);
        let land_at = landing_time(&player, 0.0, &tuning);

        let mut now = 0.0;
        while now < land_at {
            now += STEP_MS;
            events.clear();
            if now == land_at - 200.0 {
                request_jump(&mut player, &ctx(now), &tuning, &mut events);
            }
            integrate(&mut player, &ctx(now), &tuning, &mut events);
        }
        assert_eq!(events, vec![GameEvent::Landed]);
        assert!(player.grounded);
        assert_eq!(player.jump_buffer_until, None);
    }

    #[test]
    fn test_coyote_window() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut player = Player::new();
        player.pos.y = 1.0;
        player.was_grounded = false;
        player.last_grounded_at = 1000.0;

        let mut late = player.clone();
        assert_eq!(
            request_jump(&mut player, &ctx(1100.0), &tuning, &mut events),
            JumpOutcome::Jumped { mid_air: false }
        );
        assert_eq!(
            request_jump(&mut late, &ctx(1200.0), &tuning, &mut events),
            JumpOutcome::Buffered
        );

        // Assist extends the window by 100ms
        let mut assisted = Player::new();
        assisted.pos.y = 1.0;
        assisted.last_grounded_at = 1000.0;
        let assist_ctx = MoveContext {
            assist: true,
            ..ctx(1200.0)
        };
        assert_eq!(
            request_jump(&mut assisted, &assist_ctx, &tuning, &mut events),
            JumpOutcome::Jumped { mid_air: false }
        );
    }

    #[test]
    fn test_no_coyote_after_a_jump() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut player = Player::new();
        request_jump(&mut player, &ctx(0.0), &tuning, &mut events);
        integrate(&mut player, &ctx(STEP_MS), &tuning, &mut events);
        integrate(&mut player, &ctx(2.0 * STEP_MS), &tuning, &mut events);
        assert_eq!(
            request_jump(&mut player, &ctx(3.0 * STEP_MS), &tuning, &mut events),
            JumpOutcome::Buffered
        );
    }

    #[test]
    fn test_double_jump_once_per_airborne_phase() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut player = Player::new();
        let double = |now| MoveContext {
            double_jump: true,
            ..ctx(now)
        };
        request_jump(&mut player, &double(0.0), &tuning, &mut events);
        for i in 1..=10 {
            integrate(&mut player, &double(i as f64 * STEP_MS), &tuning, &mut events);
        }
        assert_eq!(
            request_jump(&mut player, &double(220.0), &tuning, &mut events),
            JumpOutcome::Jumped { mid_air: true }
        );
        assert_eq!(
            request_jump(&mut player, &double(240.0), &tuning, &mut events),
            JumpOutcome::Buffered
        );
    }

    #[test]
    fn test_jump_impulse_scaling() {
        let tuning = Tuning::default();
        let base = MoveContext::default();
        assert!((jump_impulse(&base, &tuning) - 0.16).abs() < 1e-6);
        let fast = MoveContext {
            scroll_speed: 100.0,
            ..base
        };
        assert!((jump_impulse(&fast, &tuning) - 0.16 * 1.3).abs() < 1e-6);
        let upgraded = MoveContext {
            upgrades: Upgrades {
                jump: 5,
                ..Upgrades::default()
            },
            ..base
        };
        assert!((jump_impulse(&upgraded, &tuning) - 0.16 * 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_slide_ends_after_duration() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut player = Player::new();
        assert!(begin_slide(&mut player, 0.0, false, &tuning));
        let mut now = 0.0;
        while now < 580.0 {
            now += STEP_MS;
            integrate(&mut player, &ctx(now), &tuning, &mut events);
            assert!(player.sliding);
        }
        assert!(player.scale_y < 0.5);
        integrate(&mut player, &ctx(600.0), &tuning, &mut events);
        assert!(!player.sliding);
        assert_eq!(events, vec![GameEvent::SlideEnded]);
    }

    #[test]
    fn test_slide_lasts_longer_on_combo() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut player = Player::new();
        begin_slide(&mut player, 0.0, false, &tuning);
        let combo = MoveContext {
            combo: 2,
            ..ctx(700.0)
        };
        integrate(&mut player, &combo, &tuning, &mut events);
        assert!(player.sliding);
    }

    #[test]
    fn test_slide_snaps_to_ground_and_cools_down() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut player = Player::new();
        player.pos.y = 1.2;
        player.vy = 0.1;
        player.was_grounded = false;
        assert!(begin_slide(&mut player, 0.0, false, &tuning));
        assert_eq!(player.vy, 0.0);
        integrate(&mut player, &ctx(STEP_MS), &tuning, &mut events);
        assert_eq!(player.pos.y, PLAYER_GROUND_Y);

        end_slide(&mut player, 100.0);
        assert!(!begin_slide(&mut player, 250.0, false, &tuning));
        assert!(begin_slide(&mut player, 300.0, false, &tuning));
        assert!(!begin_slide(&mut Player::new(), 1000.0, true, &tuning));
    }

    #[test]
    fn test_jump_cancels_slide() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut player = Player::new();
        begin_slide(&mut player, 0.0, false, &tuning);
        let outcome = request_jump(&mut player, &ctx(100.0), &tuning, &mut events);
        assert_eq!(outcome, JumpOutcome::Jumped { mid_air: false });
        assert!(!player.sliding);
        assert!(player.scale_y >= 0.9);
    }

    #[test]
    fn test_lane_change_eases() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut player = Player::new();
        assert!(change_lane(&mut player, 1));
        integrate(&mut player, &ctx(STEP_MS), &tuning, &mut events);
        // 6 units/s at 60Hz: one tenth of a unit per step
        assert!((player.pos.x - 0.1).abs() < 1e-5);
        for i in 2..=20 {
            integrate(&mut player, &ctx(i as f64 * STEP_MS), &tuning, &mut events);
        }
        assert_eq!(player.pos.x, 1.2);
    }

    #[test]
    fn test_lane_clamps_at_edges() {
        let mut player = Player::new();
        assert!(change_lane(&mut player, -1));
        assert!(!change_lane(&mut player, -1));
        assert_eq!(player.lane, 0);
        assert!(change_lane(&mut player, 1));
        assert!(change_lane(&mut player, 1));
        assert!(!change_lane(&mut player, 1));
        assert_eq!(player.lane, 2);
    }

    #[test]
    fn test_dash_snaps_with_cooldown() {
        let tuning = Tuning::default();
        let mut player = Player::new();
        change_lane(&mut player, -1);
        assert!(dash(&mut player, 10.0, &tuning));
        assert_eq!(player.pos.x, -1.2);
        change_lane(&mut player, 1);
        assert!(!dash(&mut player, 500.0, &tuning));
        assert!(dash(&mut player, 1210.0, &tuning));
        assert_eq!(player.pos.x, 0.0);
    }

    #[test]
    fn test_flight_rises_and_ignores_jump() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut player = Player::new();
        let fly = |now| MoveContext {
            flying: true,
            ..ctx(now)
        };
        for i in 1..=60 {
            integrate(&mut player, &fly(i as f64 * STEP_MS), &tuning, &mut events);
        }
        assert!((player.pos.y - FLIGHT_Y).abs() < 0.01);
        assert_eq!(
            request_jump(&mut player, &fly(1300.0), &tuning, &mut events),
            JumpOutcome::Ignored
        );
        assert!(!begin_slide(&mut player, 1300.0, true, &tuning));

        // Wings expire: fall back and land
        let mut now = 1300.0;
        for _ in 0..120 {
            now += STEP_MS;
            integrate(&mut player, &ctx(now), &tuning, &mut events);
        }
        assert!(player.grounded);
        assert!(events.contains(&GameEvent::Landed));
    }
}
