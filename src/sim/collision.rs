//! Collision detection and resolution
//!
//! Each obstacle kind has its own contact volume and color rule. A contact
//! is either a pass (color matches, or for chasers, the palette holds the
//! chaser's color) or a fail, which ends the run. `has_passed` is the only
//! guard against resolving an obstacle twice.

use glam::Vec3;

use super::obstacle::{Obstacle, ObstacleId, ObstacleKind, ObstacleShape, ring_segment, wall_band_index};
use super::palette::{Color, ColorPalette};
use super::state::{GameEvent, GamePhase, GameSession, Outcome};
use crate::consts::*;
use crate::planar_distance;
use crate::tuning::ColorAdvance;

/// Result of testing the ball against one obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Ball is not touching the obstacle
    NoContact,
    Pass,
    Fail,
}

impl Verdict {
    fn from_match(matched: bool) -> Self {
        if matched { Verdict::Pass } else { Verdict::Fail }
    }
}

/// Ball is inside a ring's collision band
#[inline]
pub fn in_ring_band(ring_pos: Vec3, ball_pos: Vec3) -> bool {
    planar_distance(ball_pos, ring_pos) < RING_COLLISION_RADIUS
        && (ball_pos.z - ring_pos.z).abs() < RING_DEPTH_BAND
}

/// Ball is crossing a wall
#[inline]
pub fn in_wall_band(wall_pos: Vec3, ball_pos: Vec3) -> bool {
    (ball_pos.z - wall_pos.z).abs() < WALL_DEPTH_BAND
        && (ball_pos.x - wall_pos.x).abs() < WALL_HALF_WIDTH
}

/// Ball is over a ground plate's footprint
#[inline]
pub fn on_plate(plate_pos: Vec3, ball_pos: Vec3) -> bool {
    (ball_pos.z - plate_pos.z).abs() < PLATE_DEPTH_BAND
        && (ball_pos.x - plate_pos.x).abs() < PLATE_HALF_WIDTH
        && (ball_pos.y - PLATE_PROBE_HEIGHT).abs() < PLATE_VERTICAL_BAND
}

/// Ball is within a tunnel's length and close enough to hit it
#[inline]
pub fn at_tunnel(tunnel_pos: Vec3, ball_pos: Vec3) -> bool {
    let d = ball_pos - tunnel_pos;
    d.z.abs() <= TUNNEL_HALF_LENGTH
        && d.x.abs() <= TUNNEL_HALF_WIDTH + TUNNEL_SIDE_MARGIN
        && d.y <= TUNNEL_FLOOR_Y + TUNNEL_HEIGHT + TUNNEL_SIDE_MARGIN
}

/// Ball fits between the tunnel's walls and under its roof
#[inline]
pub fn inside_tunnel(tunnel_pos: Vec3, ball_pos: Vec3) -> bool {
    let d = ball_pos - tunnel_pos;
    let inner_half_width = TUNNEL_HALF_WIDTH - TUNNEL_WALL_THICKNESS;
    let ceiling = TUNNEL_FLOOR_Y + TUNNEL_HEIGHT - TUNNEL_WALL_THICKNESS;
    d.x.abs() < inner_half_width && d.y >= TUNNEL_FLOOR_Y && d.y <= ceiling
}

/// Ball is within reach of a chaser
#[inline]
pub fn caught_by_chaser(chaser_pos: Vec3, ball_pos: Vec3) -> bool {
    ball_pos.distance(chaser_pos) < CHASER_CATCH_DISTANCE
}

/// Color the ball must carry to pass `obstacle` right now
///
/// Chasers have no color requirement (they test palette membership).
pub fn required_color(obstacle: &Obstacle, ball_pos: Vec3, palette: &ColorPalette) -> Option<Color> {
    match obstacle.shape {
        ObstacleShape::Ring { rotation, .. } => {
            let offset = ball_pos - obstacle.pos;
            let angle = offset.y.atan2(offset.x);
            Some(palette.color_at(ring_segment(angle, rotation)))
        }
        // Bottom band decides
        ObstacleShape::Wall { offset } => Some(palette.color_at(wall_band_index(0, offset))),
        ObstacleShape::GroundPlate { color_index } | ObstacleShape::Tunnel { color_index } => {
            Some(palette.color_at(color_index))
        }
        ObstacleShape::Chaser { .. } => None,
    }
}

/// Test the ball against one obstacle
pub fn evaluate(obstacle: &Obstacle, ball_pos: Vec3, ball_color: Color, palette: &ColorPalette) -> Verdict {
    let pos = obstacle.pos;
    let color_matches = || required_color(obstacle, ball_pos, palette) == Some(ball_color);

    match obstacle.shape {
        ObstacleShape::Ring { .. } => {
            if !in_ring_band(pos, ball_pos) {
                return Verdict::NoContact;
            }
            Verdict::from_match(color_matches())
        }
        ObstacleShape::Wall { .. } => {
            if !in_wall_band(pos, ball_pos) {
                return Verdict::NoContact;
            }
            Verdict::from_match(color_matches())
        }
        ObstacleShape::GroundPlate { .. } => {
            if !on_plate(pos, ball_pos) {
                return Verdict::NoContact;
            }
            Verdict::from_match(color_matches())
        }
        ObstacleShape::Tunnel { .. } => {
            if !at_tunnel(pos, ball_pos) {
                return Verdict::NoContact;
            }
            // Clipping a wall or the roof fails whatever the color
            Verdict::from_match(inside_tunnel(pos, ball_pos) && color_matches())
        }
        ObstacleShape::Chaser { color } => {
            if !caught_by_chaser(pos, ball_pos) {
                return Verdict::NoContact;
            }
            Verdict::from_match(palette.contains(color))
        }
    }
}

/// Resolve every live obstacle against the ball
///
/// Outcomes apply immediately, so a color change from one pass is seen by
/// the next obstacle tested in the same tick. Resolved obstacles leave the
/// live set before this returns. Stops at the first failure.
pub fn resolve_collisions(session: &mut GameSession) {
    if !session.ball.alive {
        return;
    }

    let mut resolved: Vec<ObstacleId> = Vec::new();
    let mut replacement_rings = 0usize;

    let count = session.field.len();
    for index in 0..count {
        let ball_pos = session.ball.pos;
        let ball_color = session.ball.color;

        let obstacle = &mut session.field.obstacles_mut()[index];
        if obstacle.has_passed {
            continue;
        }
        let verdict = evaluate(obstacle, ball_pos, ball_color, &session.palette);
        if verdict == Verdict::NoContact {
            continue;
        }

        obstacle.has_passed = true;
        let id = obstacle.id;
        let kind = obstacle.kind();
        let position = obstacle.pos;
        let chaser_color = match obstacle.shape {
            ObstacleShape::Chaser { color } => Some(color),
            _ => None,
        };
        resolved.push(id);

        match verdict {
            Verdict::Pass => {
                log::debug!("Passed {:?} #{} at z={:.1}", kind, id, position.z);
                match chaser_color {
                    Some(color) => absorb_chaser(session, color),
                    None => {
                        if kind == ObstacleKind::Ring && session.tuning.replacement_rings {
                            replacement_rings += 1;
                        }
                        apply_pass(session, kind);
                    }
                }
                session.emit(GameEvent::ObstacleResolved {
                    id,
                    kind,
                    position,
                    outcome: Outcome::Passed,
                });
            }
            Verdict::Fail => {
                log::debug!("Failed {:?} #{} at z={:.1}", kind, id, position.z);
                session.emit(GameEvent::ObstacleResolved {
                    id,
                    kind,
                    position,
                    outcome: Outcome::Failed,
                });
                destroy_ball(session);
                break;
            }
            Verdict::NoContact => {}
        }
    }

    for id in resolved {
        session.field.remove(id);
    }
    for _ in 0..replacement_rings {
        let id = session.field.spawn_replacement_ring(session.ball.pos.z, &mut session.rng);
        session.announce_spawn(id);
    }
}

/// Score and palette bookkeeping for a passed ring/wall/plate/tunnel
fn apply_pass(session: &mut GameSession, kind: ObstacleKind) {
    debug_assert!(kind.counts_as_pass());
    session.score += kind.score();
    session.obstacles_passed += 1;
    if kind == ObstacleKind::Ring {
        session.ball.ramp_max_speed();
    }

    if let Some(color) = session.palette.unlock_next(session.obstacles_passed) {
        log::info!(
            "Unlocked color {:?} after {} obstacles",
            color,
            session.obstacles_passed
        );
    }
    if session.tuning.color_advance == ColorAdvance::OnPass {
        session.palette.advance_selection();
    }
    session.ball.color = session.palette.selected();

    session.notify_score();
    session.notify_palette();
}

/// Chaser caught a ball that still owns the chaser's color
fn absorb_chaser(session: &mut GameSession, color: Color) {
    if session.palette.remove_color(color) {
        log::info!("Chaser stripped color {:?}", color);
        session.ball.color = session.palette.selected();
        session.notify_palette();
    }
    session.score += ObstacleKind::Chaser.score();
    session.field.restart_chaser_cooldown(session.clock_secs);
    session.notify_score();
}

/// Fatal contact: the run is over
fn destroy_ball(session: &mut GameSession) {
    session.ball.alive = false;
    session.ball.speed = 0.0;
    let position = session.ball.pos;
    let color = session.ball.color;
    session.emit(GameEvent::BallDestroyed { position, color });
    session.phase = GamePhase::GameOver;
    let final_score = session.score;
    log::info!("Game over at z={:.1}, score {}", position.z, final_score);
    session.emit(GameEvent::GameOver { final_score });
}
