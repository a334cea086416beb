//! Chroma Dash - a color-matching endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (obstacles, collisions, palette, session)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Default four-color cycle: red, green, yellow, blue
    pub const DEFAULT_COLORS: [u32; 4] = [0xff0000, 0x00ff00, 0xffff00, 0x0000ff];
    /// Number of colors in the palette (and quadrants/bands per obstacle)
    pub const COLOR_COUNT: usize = 4;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.5;
    pub const BALL_START_MAX_SPEED: f32 = 0.3;
    /// Hard ceiling for the max-speed ramp
    pub const BALL_SPEED_CAP: f32 = 1.2;
    pub const BALL_SPEED_RAMP: f32 = 0.02;
    /// Per-tick speed decay factor
    pub const BALL_SPEED_DECAY: f32 = 0.92;
    pub const BALL_STOP_EPSILON: f32 = 0.01;
    /// Thrust steps per input modality
    pub const THRUST_TAP: f32 = 0.12;
    pub const THRUST_HOLD: f32 = 0.05;

    /// Ring geometry (centre sits right of and above the ball's lane)
    pub const RING_OFFSET_X: f32 = 2.0;
    pub const RING_OFFSET_Y: f32 = 3.0;
    pub const RING_RADIUS: f32 = 4.0;
    pub const RING_TUBE: f32 = 0.8;
    pub const RING_COLLISION_RADIUS: f32 = 5.0;
    pub const RING_DEPTH_BAND: f32 = 1.0;
    /// Spin speed range in radians per tick
    pub const RING_SPIN_MIN: f32 = 0.01;
    pub const RING_SPIN_MAX: f32 = 0.05;

    /// Wall geometry
    pub const WALL_HALF_WIDTH: f32 = 6.0;
    pub const WALL_HEIGHT: f32 = 12.0;
    pub const WALL_DEPTH_BAND: f32 = 1.0;

    /// Ground plate geometry
    pub const PLATE_HALF_WIDTH: f32 = 6.0;
    pub const PLATE_DEPTH_BAND: f32 = 2.0;
    pub const PLATE_Y: f32 = -0.53;
    /// Height the ball's vertical offset is measured from
    pub const PLATE_PROBE_HEIGHT: f32 = 0.5;
    pub const PLATE_VERTICAL_BAND: f32 = 1.5;

    /// Tunnel geometry
    pub const TUNNEL_HALF_LENGTH: f32 = 5.0;
    pub const TUNNEL_HALF_WIDTH: f32 = 2.5;
    pub const TUNNEL_HEIGHT: f32 = 3.0;
    pub const TUNNEL_WALL_THICKNESS: f32 = 0.5;
    pub const TUNNEL_FLOOR_Y: f32 = -0.5;
    /// Lateral slack outside the walls that still counts as a tunnel hit
    pub const TUNNEL_SIDE_MARGIN: f32 = 1.0;

    /// Chaser
    pub const CHASER_RADIUS: f32 = 1.0;
    pub const CHASER_CATCH_DISTANCE: f32 = 2.5;
    pub const CHASER_ADVANCE: f32 = 0.1;
    pub const CHASER_SPAWN_OFFSET: f32 = 20.0;
    pub const CHASER_COOLDOWN_MS: f64 = 10_000.0;

    /// Color cycling rates (cycles per second)
    pub const WALL_COLOR_RATE: f64 = 0.3;
    pub const PLATE_COLOR_RATE: f64 = 0.5;
    pub const TUNNEL_COLOR_RATE: f64 = 0.4;

    /// Level spawning
    pub const FIRST_LEVEL_Z: f32 = -40.0;
    pub const LEVEL_SPACING: f32 = 40.0;
    /// Smallest spacing accepted from tuning data
    pub const MIN_LEVEL_SPACING: f32 = 1.0;
    pub const LEVEL_PAIR_OFFSET: f32 = 15.0;
    pub const SPAWN_AHEAD_DISTANCE: f32 = 120.0;
    pub const DESPAWN_BEHIND_DISTANCE: f32 = 30.0;
    /// Gap used when dropping a replacement ring past the frontier
    pub const REPLACEMENT_RING_GAP: f32 = 20.0;
    pub const REPLACEMENT_RING_LEAD: f32 = 40.0;

    /// Host clock step used by the headless demo (seconds)
    pub const SIM_DT: f64 = 1.0 / 60.0;

    /// Scoring
    pub const SCORE_RING: u64 = 10;
    pub const SCORE_WALL: u64 = 15;
    pub const SCORE_PLATE: u64 = 20;
    pub const SCORE_TUNNEL: u64 = 25;
    pub const SCORE_CHASER: u64 = 50;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Lateral/vertical components of a position (drops depth)
#[inline]
pub fn planar(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.y)
}

/// Distance between two points in the lateral/vertical plane
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}

/// Index into a 4-step color cycle at wall-clock time `t` (seconds)
///
/// Pure function of elapsed time, so the result does not depend on how
/// often it is sampled.
#[inline]
pub fn cycle_index(time_secs: f64, rate: f64) -> usize {
    let steps = (time_secs * rate).floor();
    steps.rem_euclid(consts::COLOR_COUNT as f64) as usize
}
