//! Collision detection and response
//!
//! Resolution runs in a fixed order every step: obstacles, then orbs (after
//! the magnet pull), then power-ups, then crystals. A lethal hit ends the
//! step's collision work.

use glam::Vec3;

use super::events::GameEvent;
use super::score::orb_award;
use super::state::{Aabb, Player, PowerKind, Session};
use super::timers::{TimerKind, PowerTimers};
use crate::consts::*;
use crate::tuning::Tuning;

/// What an obstacle contact did to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleContact {
    None,
    /// Shield ate the obstacle
    Absorbed,
    /// Lost a life; `lives` remain
    Hit { lives: u8 },
    /// Last life lost
    Fatal,
}

/// Player hit box padded for tunnelling at speed
pub fn player_volume(player: &Player, scroll_speed: f32) -> Aabb {
    player
        .hit_box()
        .expanded(Vec3::new(0.03, 0.0, scroll_speed.max(0.0) * 0.25))
}

/// Obstacles are ignored while flying or during post-hit grace
#[inline]
pub fn obstacles_ignored(timers: &PowerTimers, now: f64) -> bool {
    timers.is_active(TimerKind::Flight, now) || timers.is_active(TimerKind::Invincible, now)
}

/// Check the player against every active obstacle
pub fn resolve_obstacles(session: &mut Session, tuning: &Tuning) -> ObstacleContact {
    let now = session.clock_ms;
    let volume = player_volume(&session.player, session.difficulty.scroll_speed);
    let mut outcome = ObstacleContact::None;

    let Session {
        obstacles,
        timers,
        player,
        events,
        ..
    } = session;

    for obstacle in obstacles.iter_mut().filter(|o| o.active) {
        if obstacles_ignored(timers, now) {
            break;
        }
        if !volume.intersects(&obstacle.aabb()) {
            continue;
        }

        if timers.is_active(TimerKind::Shield, now) {
            obstacle.active = false;
            timers.set(TimerKind::Shield, now, tuning.shield_grace_ms);
            events.push(GameEvent::ShieldAbsorbed { kind: obstacle.kind });
            outcome = ObstacleContact::Absorbed;
            continue;
        }

        player.lives = player.lives.saturating_sub(1);
        timers.grant(TimerKind::Invincible, now, tuning);
        timers.grant(TimerKind::HitFlash, now, tuning);
        events.push(GameEvent::Hit { lives: player.lives });

        if player.lives == 0 {
            return ObstacleContact::Fatal;
        }
        outcome = ObstacleContact::Hit { lives: player.lives };
    }

    outcome
}

/// Pull nearby orbs toward the player while the magnet is live
pub fn apply_magnet(session: &mut Session, tuning: &Tuning) {
    let now = session.clock_ms;
    if !session.timers.is_active(TimerKind::Magnet, now) || session.timers.is_active(TimerKind::Flight, now) {
        return;
    }
    let target = session.player.pos;
    let radius = tuning.magnet_radius * (1.0 + f32::from(session.upgrades.magnet) * tuning.magnet_upgrade_step);

    for orb in session.orbs.iter_mut().filter(|o| o.active) {
        if orb.pos.distance(target) < radius {
            orb.pos += (target - orb.pos) * tuning.magnet_pull;
        }
    }
}

pub fn collect_orbs(session: &mut Session, tuning: &Tuning) {
    let now = session.clock_ms;
    let target = session.player.pos;
    let risk = session.timers.is_active(TimerKind::Risk, now);

    for i in 0..session.orbs.len() {
        let orb = &mut session.orbs[i];
        if !orb.active || orb.pos.distance(target) >= tuning.orb_pickup_radius {
            continue;
        }
        orb.active = false;

        let before = session.combo.count;
        let combo = session.combo.register_pickup(now);
        let points = orb_award(combo, risk, tuning);
        session.score.add(points);
        session.emit(GameEvent::OrbCollected { points, combo });

        for milestone in [3, COMBO_MAX] {
            if before < milestone && combo >= milestone {
                session.emit(GameEvent::ComboMilestone(milestone));
            }
        }
    }
}

pub fn collect_powers(session: &mut Session, tuning: &Tuning) {
    let now = session.clock_ms;
    let target = session.player.pos;

    for i in 0..session.powers.len() {
        let power = &mut session.powers[i];
        if !power.active || power.pos.distance(target) >= tuning.power_pickup_radius {
            continue;
        }
        power.active = false;
        let kind = power.kind;

        match TimerKind::for_power(kind) {
            Some(timer) => session.timers.grant(timer, now, tuning),
            None => {
                debug_assert_eq!(kind, PowerKind::Heart);
                session.player.lives = (session.player.lives + 1).min(MAX_LIVES);
            }
        }
        session.emit(GameEvent::PowerCollected(kind));
    }
}

pub fn collect_crystals(session: &mut Session, tuning: &Tuning) {
    let target = session.player.pos;

    for i in 0..session.crystals.len() {
        let crystal = &mut session.crystals[i];
        if !crystal.active || crystal.pos.distance(target) >= tuning.crystal_pickup_radius {
            continue;
        }
        crystal.active = false;
        session.upgrades.jump = (session.upgrades.jump + 1).min(MAX_UPGRADE_LEVEL);
        let jump_level = session.upgrades.jump;
        session.emit(GameEvent::CrystalCollected { jump_level });
    }
}

/// Run every collision check for the step; returns true if the player died
pub fn resolve(session: &mut Session, tuning: &Tuning) -> bool {
    if resolve_obstacles(session, tuning) == ObstacleContact::Fatal {
        session.dead = true;
        return true;
    }
    apply_magnet(session, tuning);
    collect_orbs(session, tuning);
    collect_powers(session, tuning);
    collect_crystals(session, tuning);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Crystal, Obstacle, ObstacleKind, Orb, Power, RunConfig, Upgrades};

    fn session() -> Session {
        Session::new(&RunConfig::default(), Upgrades::default(), &Tuning::default())
    }

    fn block(session: &mut Session, kind: ObstacleKind) {
        let id = session.next_entity_id();
        session.obstacles.push(Obstacle::new(id, kind, 0.0, 0.0));
    }

    fn orb_at(session: &mut Session, pos: Vec3) {
        let id = session.next_entity_id();
        session.orbs.push(Orb { id, pos, active: true });
    }

    #[test]
    fn test_clear_path_no_contact() {
        let tuning = Tuning::default();
        let mut s = session();
        let id = s.next_entity_id();
        s.obstacles.push(Obstacle::new(id, ObstacleKind::Ground, 1.2, 0.0));
        assert_eq!(resolve_obstacles(&mut s, &tuning), ObstacleContact::None);
        assert_eq!(s.player.lives, 3);
    }

    #[test]
    fn test_shield_absorbs_and_grants_grace() {
        let tuning = Tuning::default();
        let mut s = session();
        s.clock_ms = 5000.0;
        s.timers.grant(TimerKind::Shield, 1000.0, &tuning);
        block(&mut s, ObstacleKind::Ground);

        assert_eq!(resolve_obstacles(&mut s, &tuning), ObstacleContact::Absorbed);
        assert_eq!(s.player.lives, 3);
        assert!(!s.obstacles[0].active);
        assert_eq!(s.timers.expiry(TimerKind::Shield), 5400.0);
        assert_eq!(
            s.events,
            vec![GameEvent::ShieldAbsorbed {
                kind: ObstacleKind::Ground
            }]
        );
    }

    #[test]
    fn test_hit_costs_life_and_grants_grace() {
        let tuning = Tuning::default();
        let mut s = session();
        s.clock_ms = 100.0;
        block(&mut s, ObstacleKind::Ground);
        block(&mut s, ObstacleKind::Ground);

        // Grace from the first hit covers the second obstacle
        assert_eq!(resolve_obstacles(&mut s, &tuning), ObstacleContact::Hit { lives: 2 });
        assert_eq!(s.player.lives, 2);
        assert!(s.timers.is_active(TimerKind::Invincible, 1099.0));
        assert!(!s.timers.is_active(TimerKind::Invincible, 1100.0));
        assert!(s.timers.is_active(TimerKind::HitFlash, 399.0));
        assert!(s.obstacles[0].active);
    }

    #[test]
    fn test_lethal_sequence() {
        let tuning = Tuning::default();
        let mut s = session();
        block(&mut s, ObstacleKind::Ground);

        let mut outcomes = Vec::new();
        for hit in 0..3 {
            s.clock_ms = 2000.0 * f64::from(hit);
            outcomes.push(resolve(&mut s, &tuning));
        }
        assert_eq!(outcomes, vec![false, false, true]);
        assert_eq!(s.player.lives, 0);
        assert!(s.dead);
    }

    #[test]
    fn test_death_skips_pickups() {
        let tuning = Tuning::default();
        let mut s = session();
        s.player.lives = 1;
        block(&mut s, ObstacleKind::Ground);
        let pos = s.player.pos;
        orb_at(&mut s, pos);
        assert!(resolve(&mut s, &tuning));
        assert!(s.orbs[0].active);
        assert_eq!(s.score.score, 0);
    }

    #[test]
    fn test_flight_and_invincibility_ignore_obstacles() {
        let tuning = Tuning::default();
        for timer in [TimerKind::Flight, TimerKind::Invincible] {
            let mut s = session();
            s.timers.grant(timer, 0.0, &tuning);
            block(&mut s, ObstacleKind::Ground);
            assert_eq!(resolve_obstacles(&mut s, &tuning), ObstacleContact::None);
            assert_eq!(s.player.lives, 3);
            assert!(s.obstacles[0].active);
        }
    }

    #[test]
    fn test_slide_under_air_obstacle() {
        let tuning = Tuning::default();
        let mut s = session();
        s.player.sliding = true;
        s.player.scale_y = 0.4;
        block(&mut s, ObstacleKind::Air);
        assert_eq!(resolve_obstacles(&mut s, &tuning), ObstacleContact::None);
    }

    #[test]
    fn test_orb_award_with_combo_and_risk() {
        let tuning = Tuning::default();
        let mut s = session();
        s.combo.count = 2;
        s.timers.grant(TimerKind::Risk, 0.0, &tuning);
        let pos = s.player.pos;
        orb_at(&mut s, pos);
        collect_orbs(&mut s, &tuning);
        // round(10 * (1 + 3*0.2) * 2)
        assert_eq!(s.score.score, 32);
        assert_eq!(s.combo.count, 3);
        assert_eq!(
            s.events,
            vec![
                GameEvent::OrbCollected { points: 32, combo: 3 },
                GameEvent::ComboMilestone(3)
            ]
        );
    }

    #[test]
    fn test_magnet_pulls_orbs_in_range() {
        let tuning = Tuning::default();
        let mut s = session();
        s.timers.grant(TimerKind::Magnet, 0.0, &tuning);
        let near = s.player.pos + Vec3::new(0.0, 0.0, -2.0);
        let far = s.player.pos + Vec3::new(0.0, 0.0, -5.0);
        orb_at(&mut s, near);
        orb_at(&mut s, far);
        apply_magnet(&mut s, &tuning);
        assert!((s.orbs[0].pos.z - (-2.0 + 2.0 * 0.06)).abs() < 1e-5);
        assert_eq!(s.orbs[1].pos, far);

        // No pull while flying
        s.timers.grant(TimerKind::Flight, 0.0, &tuning);
        let pulled = s.orbs[0].pos;
        apply_magnet(&mut s, &tuning);
        assert_eq!(s.orbs[0].pos, pulled);
    }

    #[test]
    fn test_powers_set_timers_and_hearts_cap() {
        let tuning = Tuning::default();
        let mut s = session();
        s.clock_ms = 50.0;
        let pos = s.player.pos;
        for kind in [PowerKind::Shield, PowerKind::Heart] {
            let id = s.next_entity_id();
            s.powers.push(Power {
                id,
                kind,
                pos,
                active: true,
            });
        }
        collect_powers(&mut s, &tuning);
        assert_eq!(s.timers.expiry(TimerKind::Shield), 12_050.0);
        assert_eq!(s.player.lives, MAX_LIVES);
        assert!(s.powers.iter().all(|p| !p.active));

        s.player.lives = 1;
        let id = s.next_entity_id();
        s.powers.push(Power {
            id,
            kind: PowerKind::Heart,
            pos,
            active: true,
        });
        collect_powers(&mut s, &tuning);
        assert_eq!(s.player.lives, 2);
    }

    #[test]
    fn test_crystals_raise_jump_level_to_cap() {
        let tuning = Tuning::default();
        let mut s = session();
        let pos = s.player.pos;
        for _ in 0..7 {
            let id = s.next_entity_id();
            s.crystals.push(Crystal { id, pos, active: true });
        }
        collect_crystals(&mut s, &tuning);
        assert_eq!(s.upgrades.jump, MAX_UPGRADE_LEVEL);
        assert_eq!(s.score.score, 0);
    }
}
