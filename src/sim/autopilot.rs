//! Demo AI
//!
//! Reads the corridor ahead and produces the intents a careful player would
//! send this step. Drives attract mode and the headless demo binary.

use super::state::{ObstacleKind, Session};
use super::tick::Intent;
use super::timers::TimerKind;

/// Steps ahead within which a blocked lane is worth leaving
const DODGE_HORIZON: f32 = 25.0;
/// Lateral easing needs about this many steps to clear an obstacle
const DODGE_MIN: f32 = 10.0;
/// Jump when a ground obstacle is this close (steps)
const JUMP_AT: f32 = 14.0;
/// Slide when an air obstacle is this close (steps)
const SLIDE_AT: f32 = 10.0;

/// Nearest obstacle in `lane` still ahead of (or overlapping) the player,
/// as steps until it reaches z = 0
fn threat(session: &Session, lane: u8) -> Option<(f32, ObstacleKind)> {
    let speed = session.difficulty.scroll_speed.max(0.01);
    let x = crate::lane_offset(lane);
    session
        .obstacles
        .iter()
        .filter(|o| o.active && (o.pos.x - x).abs() < 0.8 && o.pos.z < 0.9)
        .map(|o| (-o.pos.z / speed, o.kind))
        .filter(|(steps, _)| *steps > -3.0)
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
}

fn lane_clear(session: &Session, lane: u8, horizon: f32) -> bool {
    threat(session, lane).is_none_or(|(steps, _)| steps > horizon)
}

fn toward(from: u8, to: u8) -> Option<Intent> {
    match to.cmp(&from) {
        std::cmp::Ordering::Less => Some(Intent::LaneLeft),
        std::cmp::Ordering::Greater => Some(Intent::LaneRight),
        std::cmp::Ordering::Equal => None,
    }
}

/// Intents for this step
pub fn decide(session: &Session) -> Vec<Intent> {
    let now = session.clock_ms;
    let player = &session.player;
    let lane = player.lane;
    let neighbours: Vec<u8> = [lane.checked_sub(1), Some(lane + 1).filter(|l| *l <= 2)]
        .into_iter()
        .flatten()
        .collect();

    if session.timers.is_active(TimerKind::Flight, now) {
        return seek_orb(session, lane).into_iter().collect();
    }

    let Some((steps, kind)) = threat(session, lane).filter(|(steps, _)| *steps <= DODGE_HORIZON) else {
        return seek_orb(session, lane).into_iter().collect();
    };

    // Sidestep when there is room
    if let Some(&free) = neighbours.iter().find(|l| lane_clear(session, **l, DODGE_HORIZON)) {
        if steps >= DODGE_MIN {
            return toward(lane, free).into_iter().collect();
        }
        if now >= player.dash_ready_at {
            return toward(lane, free).into_iter().chain([Intent::Dash]).collect();
        }
    }

    match kind {
        ObstacleKind::Ground if steps <= JUMP_AT && player.grounded => vec![Intent::Jump],
        ObstacleKind::Air if steps <= SLIDE_AT && !player.sliding => vec![Intent::SlideBegin],
        _ => Vec::new(),
    }
}

/// Drift toward the nearest orb when its lane is safe
fn seek_orb(session: &Session, lane: u8) -> Option<Intent> {
    let orb = session
        .orbs
        .iter()
        .filter(|o| o.active && o.pos.z < 0.0)
        .max_by(|a, b| a.pos.z.partial_cmp(&b.pos.z).unwrap_or(std::cmp::Ordering::Equal))?;
    let target = crate::consts::LANE_OFFSETS
        .iter()
        .enumerate()
        .min_by(|a, b| {
            (a.1 - orb.pos.x)
                .abs()
                .partial_cmp(&(b.1 - orb.pos.x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i as u8)?;
    let next = if target < lane { lane - 1 } else { (lane + 1).min(target) };
    if target == lane || !lane_clear(session, next, DODGE_HORIZON) {
        return None;
    }
    toward(lane, target)
}
