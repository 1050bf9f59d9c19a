//! Procedural content placement
//!
//! Content spawns at negative z and scrolls toward the player at z = 0.
//! Every decision draws from the session's run stream, so a seed and salt
//! reproduce the same corridor.

use glam::Vec3;

use super::patterns::{self, PATTERNS};
use super::state::*;
use crate::consts::*;
use crate::lane_offset;
use crate::tuning::Tuning;

/// Furthest (most negative) z among active entities, or `default` if none is further
fn furthest(zs: impl Iterator<Item = (bool, f32)>, default: f32) -> f32 {
    zs.filter(|(active, _)| *active)
        .fold(default, |min, (_, z)| min.min(z))
}

fn furthest_obstacle(session: &Session, default: f32) -> f32 {
    furthest(session.obstacles.iter().map(|o| (o.active, o.pos.z)), default)
}

/// Seed the corridor at run start
pub fn preload(session: &mut Session, tuning: &Tuning) {
    for i in 1..=tuning.obstacle_preload {
        spawn_obstacle(session, -(i as f32) * 12.0, tuning);
    }
    for i in 1..=tuning.crystal_preload {
        spawn_crystal(session, -(i as f32) * 22.0 - 10.0);
    }
}

/// Place one obstacle of a fixed kind and lane
pub fn spawn_obstacle_with_kind(session: &mut Session, z: f32, lane: u8, kind: ObstacleKind) -> u32 {
    let id = session.next_entity_id();
    let obstacle = Obstacle::new(id, kind, lane_offset(lane), z);
    if kind == ObstacleKind::Air {
        session.decorations.insert(
            id,
            AirDecoration {
                pole_height: (obstacle.pos.y - 0.05).max(0.2),
                // Golden-angle phase per id
                pulse: (id as f32 * 2.399_963) % std::f32::consts::TAU,
            },
        );
    }
    session.obstacles.push(obstacle);
    id
}

/// Place one random obstacle with optional motion
pub fn spawn_obstacle(session: &mut Session, z: f32, tuning: &Tuning) -> u32 {
    let diff = session.difficulty.factor;
    let lane = session.rng.lane();
    let kind = if session.rng.chance(tuning.air_chance_base + tuning.air_chance_diff * diff) {
        ObstacleKind::Air
    } else {
        ObstacleKind::Ground
    };
    let oscillate = session.rng.chance(0.25);
    let rotate = session.rng.chance(0.20);
    let speed = 0.6 + session.rng.next() * 0.8;

    let id = spawn_obstacle_with_kind(session, z, lane, kind);
    if oscillate || rotate {
        if let Some(obstacle) = session.obstacles.last_mut() {
            obstacle.motion = Some(Motion {
                oscillate,
                rotate,
                speed,
                rotation: 0.0,
            });
        }
    }
    id
}

/// Stamp a random pattern starting at `z_start`; returns the z just past its end
pub fn stamp_pattern(session: &mut Session, z_start: f32) -> f32 {
    let pattern = PATTERNS[session.rng.index(PATTERNS.len())];
    for piece in pattern {
        let lane = match piece.lane {
            Some(lane) => lane,
            None => session.rng.lane(),
        };
        spawn_obstacle_with_kind(session, z_start - f32::from(piece.dz), lane, piece.kind);
    }
    z_start - patterns::span(pattern) - 8.0
}

/// Scripted wave: alternating air/ground cycling through the lanes
pub fn stamp_boss_burst(session: &mut Session, tuning: &Tuning) {
    let mut z = furthest_obstacle(session, -10.0).min(-20.0) - 16.0;
    for i in 0..tuning.boss_burst_count {
        let kind = if i % 2 == 0 {
            ObstacleKind::Air
        } else {
            ObstacleKind::Ground
        };
        spawn_obstacle_with_kind(session, z, (i % 3) as u8, kind);
        z -= tuning.boss_burst_spacing;
    }
}

pub fn spawn_orb(session: &mut Session, z: f32) {
    let lane = session.rng.lane();
    let id = session.next_entity_id();
    session.orbs.push(Orb {
        id,
        pos: Vec3::new(lane_offset(lane), GROUND_Y + ORB_RADIUS, z),
        active: true,
    });
}

pub fn spawn_power(session: &mut Session, z: f32) {
    let lane = session.rng.lane();
    let kind = PowerKind::from_roll(session.rng.next());
    spawn_power_kind(session, z, lane, kind);
}

/// Place a specific power (hosts and tests use this for the undrawn kinds)
pub fn spawn_power_kind(session: &mut Session, z: f32, lane: u8, kind: PowerKind) {
    let id = session.next_entity_id();
    session.powers.push(Power {
        id,
        kind,
        pos: Vec3::new(lane_offset(lane), POWER_Y, z),
        active: true,
    });
}

pub fn spawn_crystal(session: &mut Session, z: f32) {
    let lane = session.rng.lane();
    let id = session.next_entity_id();
    session.crystals.push(Crystal {
        id,
        pos: Vec3::new(lane_offset(lane), CRYSTAL_Y, z),
        active: true,
    });
}

/// Scroll everything toward the player and retire what passed the eviction plane
pub fn advance(session: &mut Session) {
    let speed = session.difficulty.scroll_speed;
    let drift = (session.ticks as f32 * 0.03).sin() * 0.006;

    for obstacle in session.obstacles.iter_mut().filter(|o| o.active) {
        obstacle.pos.z += speed;
        if let Some(motion) = obstacle.motion.as_mut() {
            if motion.oscillate {
                obstacle.pos.x = (obstacle.pos.x + drift * motion.speed).clamp(-TRACK_HALF_WIDTH, TRACK_HALF_WIDTH);
            }
            if motion.rotate {
                motion.rotation += 0.01 * motion.speed;
            }
        }
        if let Some(decoration) = session.decorations.get_mut(&obstacle.id) {
            decoration.pulse += 0.08;
        }
        if obstacle.pos.z > EVICTION_Z {
            obstacle.active = false;
        }
    }

    for orb in session.orbs.iter_mut().filter(|o| o.active) {
        orb.pos.z += speed;
        orb.active = orb.pos.z <= EVICTION_Z;
    }
    for power in session.powers.iter_mut().filter(|p| p.active) {
        power.pos.z += speed;
        power.active = power.pos.z <= EVICTION_Z;
    }
    for crystal in session.crystals.iter_mut().filter(|c| c.active) {
        crystal.pos.z += speed;
        crystal.active = crystal.pos.z <= EVICTION_Z;
    }
}

/// Top categories back up to their floors
pub fn refill(session: &mut Session, tuning: &Tuning) {
    let diff = session.difficulty.factor;

    if session.obstacles.iter().filter(|o| o.active).count() < tuning.obstacle_floor {
        let next_base = furthest_obstacle(session, 0.0).min(-20.0);
        if session.rng.chance(tuning.pattern_chance_base + tuning.pattern_chance_diff * diff) {
            let z = next_base - 9.0 - session.rng.next() * (8.0 - 4.0 * diff);
            stamp_pattern(session, z);
        } else {
            let z = next_base - 10.0 - session.rng.next() * (9.0 - 4.0 * diff);
            spawn_obstacle(session, z, tuning);
        }
    }

    if session.orbs.iter().filter(|o| o.active).count() < tuning.orb_floor {
        let last = furthest(session.orbs.iter().map(|o| (o.active, o.pos.z)), 0.0);
        let z = last.min(-10.0) - 9.0 - session.rng.next() * 6.0;
        spawn_orb(session, z);
    }

    if session.powers.iter().filter(|p| p.active).count() < tuning.power_floor
        && session.rng.chance(tuning.power_spawn_chance)
    {
        let last = furthest(session.powers.iter().map(|p| (p.active, p.pos.z)), 0.0);
        let z = last.min(-25.0) - 20.0 - session.rng.next() * 20.0;
        spawn_power(session, z);
    }

    if session.crystals.iter().filter(|c| c.active).count() < tuning.crystal_floor {
        let last = furthest(session.crystals.iter().map(|c| (c.active, c.pos.z)), 0.0);
        let z = last.min(-40.0) - 25.0 - session.rng.next() * 20.0;
        spawn_crystal(session, z);
    }
}
