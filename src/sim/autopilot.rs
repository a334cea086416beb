//! Demo autopilot
//!
//! Plays the game for the headless demo and for soak tests. It looks at the
//! next unresolved obstacle, selects the color it needs when the palette
//! has it, and holds thrust unless it would reach the obstacle carrying the
//! wrong color. Cycling colors are simply waited out.

use super::collision::required_color;
use super::obstacle::{Obstacle, ObstacleShape};
use super::state::{GameSession, Thrust};
use super::tick::TickInput;
use crate::consts::*;

/// Extra depth kept between a stopped ball and an obstacle it must wait at
const WAIT_MARGIN: f32 = 1.5;

/// Depth from an obstacle's centre to the near edge of its contact volume
fn reach(obstacle: &Obstacle) -> f32 {
    match obstacle.shape {
        ObstacleShape::Ring { .. } => RING_DEPTH_BAND,
        ObstacleShape::Wall { .. } => WALL_DEPTH_BAND,
        ObstacleShape::GroundPlate { .. } => PLATE_DEPTH_BAND,
        ObstacleShape::Tunnel { .. } => TUNNEL_HALF_LENGTH,
        ObstacleShape::Chaser { .. } => CHASER_CATCH_DISTANCE,
    }
}

/// Distance the ball coasts before its speed decays to zero
fn coast_distance(speed: f32) -> f32 {
    speed / (1.0 - BALL_SPEED_DECAY)
}

/// Nearest unresolved obstacle still ahead of the ball
fn next_obstacle(session: &GameSession) -> Option<&Obstacle> {
    let ball_z = session.ball.pos.z;
    session
        .field
        .obstacles()
        .iter()
        .filter(|o| !o.has_passed && !o.is_chaser())
        .filter(|o| o.pos.z - reach(o) < ball_z)
        .max_by(|a, b| a.pos.z.total_cmp(&b.pos.z))
}

/// Choose this tick's input
pub fn autopilot(session: &GameSession) -> TickInput {
    let mut input = TickInput::default();
    if !session.is_playing() {
        return input;
    }

    let ball = &session.ball;
    let Some(target) = next_obstacle(session) else {
        input.thrust = Some(Thrust::Hold);
        return input;
    };

    let needed = required_color(target, ball.pos, &session.palette);
    let matched = needed == Some(ball.color);
    if let Some(color) = needed {
        if !matched && session.palette.contains(color) {
            input.cycle_color = Some(1);
        }
    }

    let gap = ball.pos.z - (target.pos.z + reach(target));
    let stopping = coast_distance(ball.speed + THRUST_HOLD) + WAIT_MARGIN;
    if matched || gap > stopping {
        input.thrust = Some(Thrust::Hold);
    }
    input
}
