//! Obstacle records
//!
//! Obstacles are plain data: position, a sticky `has_passed` flag and a
//! per-kind shape holding the animated color state. Renderers build their
//! own visuals from `GameEvent::ObstacleSpawned` and key them by `id`.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use super::palette::Color;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{cycle_index, wrap_angle};

/// Stable obstacle identifier (unique within a session)
pub type ObstacleId = u32;

/// Obstacle variants, without per-instance data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Ring,
    Wall,
    GroundPlate,
    Tunnel,
    Chaser,
}

impl ObstacleKind {
    /// Points awarded when this kind is passed
    pub fn score(self) -> u64 {
        match self {
            ObstacleKind::Ring => SCORE_RING,
            ObstacleKind::Wall => SCORE_WALL,
            ObstacleKind::GroundPlate => SCORE_PLATE,
            ObstacleKind::Tunnel => SCORE_TUNNEL,
            ObstacleKind::Chaser => SCORE_CHASER,
        }
    }

    /// Whether passing this kind counts toward color unlocks
    pub fn counts_as_pass(self) -> bool {
        self != ObstacleKind::Chaser
    }
}

/// Per-kind state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Four quadrants, quadrant `i` painted with color `i`, spinning about
    /// the depth axis. Resolves on the first tick the ball enters its band.
    Ring {
        /// Current rotation (radians)
        rotation: f32,
        /// Rotation added every tick (radians, signed)
        spin: f32,
    },
    /// Four stacked bands; band `i` shows color `(i + offset) % 4`
    Wall { offset: usize },
    /// Floor rectangle with a single cycling color
    GroundPlate { color_index: usize },
    /// Two side walls and a roof with a single cycling color
    Tunnel { color_index: usize },
    /// Pursuing sphere with a fixed color
    Chaser { color: Color },
}

/// How an obstacle's color is derived, for renderers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColorRule {
    /// Quadrant `i` shows `colors[i]`, rotated by the ring's rotation
    Quadrants { colors: [Color; COLOR_COUNT], spin: f32 },
    /// Band `i` shows `colors[(i + cycle_index(t, rate)) % 4]`
    Bands { colors: [Color; COLOR_COUNT], rate: f64 },
    /// Single color `colors[cycle_index(t, rate)]`
    Cycling { colors: [Color; COLOR_COUNT], rate: f64 },
    Fixed(Color),
}

/// A live obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub pos: Vec3,
    /// Set exactly once, when the obstacle resolves
    pub has_passed: bool,
    pub shape: ObstacleShape,
}

impl Obstacle {
    pub fn ring(id: ObstacleId, z: f32, spin: f32) -> Self {
        Self {
            id,
            pos: Vec3::new(RING_OFFSET_X, RING_OFFSET_Y, z),
            has_passed: false,
            shape: ObstacleShape::Ring {
                rotation: 0.0,
                spin,
            },
        }
    }

    pub fn wall(id: ObstacleId, z: f32) -> Self {
        Self {
            id,
            pos: Vec3::new(0.0, 0.0, z),
            has_passed: false,
            shape: ObstacleShape::Wall { offset: 0 },
        }
    }

    pub fn ground_plate(id: ObstacleId, z: f32) -> Self {
        Self {
            id,
            pos: Vec3::new(0.0, PLATE_Y, z),
            has_passed: false,
            shape: ObstacleShape::GroundPlate { color_index: 0 },
        }
    }

    pub fn tunnel(id: ObstacleId, z: f32) -> Self {
        Self {
            id,
            pos: Vec3::new(0.0, 0.0, z),
            has_passed: false,
            shape: ObstacleShape::Tunnel { color_index: 0 },
        }
    }

    pub fn chaser(id: ObstacleId, pos: Vec3, color: Color) -> Self {
        Self {
            id,
            pos,
            has_passed: false,
            shape: ObstacleShape::Chaser { color },
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        match self.shape {
            ObstacleShape::Ring { .. } => ObstacleKind::Ring,
            ObstacleShape::Wall { .. } => ObstacleKind::Wall,
            ObstacleShape::GroundPlate { .. } => ObstacleKind::GroundPlate,
            ObstacleShape::Tunnel { .. } => ObstacleKind::Tunnel,
            ObstacleShape::Chaser { .. } => ObstacleKind::Chaser,
        }
    }

    pub fn is_chaser(&self) -> bool {
        matches!(self.shape, ObstacleShape::Chaser { .. })
    }

    /// Advance time-driven color state and ring spin
    ///
    /// Wall, plate and tunnel colors depend only on `time_secs`; ring spin
    /// is per tick.
    pub fn animate(&mut self, time_secs: f64, tuning: &Tuning) {
        match &mut self.shape {
            ObstacleShape::Ring { rotation, spin, .. } => {
                *rotation = wrap_angle(*rotation + *spin);
            }
            ObstacleShape::Wall { offset } => {
                *offset = cycle_index(time_secs, tuning.wall_color_rate);
            }
            ObstacleShape::GroundPlate { color_index } => {
                *color_index = cycle_index(time_secs, tuning.plate_color_rate);
            }
            ObstacleShape::Tunnel { color_index } => {
                *color_index = cycle_index(time_secs, tuning.tunnel_color_rate);
            }
            ObstacleShape::Chaser { .. } => {}
        }
    }

    /// Color rule handed to the renderer at spawn time
    pub fn color_rule(&self, colors: &[Color; COLOR_COUNT], tuning: &Tuning) -> ColorRule {
        match self.shape {
            ObstacleShape::Ring { spin, .. } => ColorRule::Quadrants {
                colors: *colors,
                spin,
            },
            ObstacleShape::Wall { .. } => ColorRule::Bands {
                colors: *colors,
                rate: tuning.wall_color_rate,
            },
            ObstacleShape::GroundPlate { .. } => ColorRule::Cycling {
                colors: *colors,
                rate: tuning.plate_color_rate,
            },
            ObstacleShape::Tunnel { .. } => ColorRule::Cycling {
                colors: *colors,
                rate: tuning.tunnel_color_rate,
            },
            ObstacleShape::Chaser { color } => ColorRule::Fixed(color),
        }
    }
}

/// Quadrant of a ring under a ball at raw angle `angle` (radians, any
/// range) relative to the ring centre
#[inline]
pub fn ring_segment(angle: f32, rotation: f32) -> usize {
    let relative = wrap_angle(angle - rotation);
    (relative / FRAC_PI_2).floor() as usize % COLOR_COUNT
}

/// Color index shown by wall band `band` at the given cycle offset
#[inline]
pub fn wall_band_index(band: usize, offset: usize) -> usize {
    (band + offset) % COLOR_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_ring_segment_quadrant_boundaries() {
        assert_eq!(ring_segment(0.0, 0.0), 0);
        assert_eq!(ring_segment(FRAC_PI_2, 0.0), 1);
        assert_eq!(ring_segment(PI, 0.0), 2);
        assert_eq!(ring_segment(-PI, 0.0), 2);
        assert_eq!(ring_segment(FRAC_PI_2 + 1e-4, 0.0), 1);
        assert_eq!(ring_segment(PI + 1e-4, 0.0), 2);
        assert_eq!(ring_segment(3.0 * FRAC_PI_2 + 1e-4, 0.0), 3);
        assert_eq!(ring_segment(TAU - 1e-4, 0.0), 3);
    }

    #[test]
    fn test_ring_segment_negative_angles() {
        // atan2 returns (-π, π]; -π/4 sits in the last quadrant
        assert_eq!(ring_segment(-PI / 4.0, 0.0), 3);
        assert_eq!(ring_segment(-3.0 * PI / 4.0, 0.0), 2);
        assert_eq!(ring_segment(-PI / 4.0, -PI), 1);
    }

    #[test]
    fn test_ring_segment_follows_rotation() {
        // Rotating the ring by a quarter turn moves quadrant 0 under π/2
        let angle = FRAC_PI_2 + 0.1;
        assert_eq!(ring_segment(angle, 0.0), 1);
        assert_eq!(ring_segment(angle, FRAC_PI_2), 0);
        assert_eq!(ring_segment(angle, PI), 3);
    }

    #[test]
    fn test_wall_bands_rotate_together() {
        assert_eq!(wall_band_index(0, 0), 0);
        assert_eq!(wall_band_index(0, 3), 3);
        assert_eq!(wall_band_index(3, 2), 1);
    }

    #[test]
    fn test_animate_is_time_driven() {
        let tuning = Tuning::default();
        let mut plate = Obstacle::ground_plate(1, -40.0);
        plate.animate(2.5, &tuning);
        assert_eq!(plate.shape, ObstacleShape::GroundPlate { color_index: 1 });
        // Going back in time gives back the earlier color
        plate.animate(0.1, &tuning);
        assert_eq!(plate.shape, ObstacleShape::GroundPlate { color_index: 0 });
    }

    #[test]
    fn test_ring_spin_accumulates_per_tick() {
        let tuning = Tuning::default();
        let mut ring = Obstacle::ring(1, -40.0, 0.05);
        for _ in 0..10 {
            ring.animate(0.0, &tuning);
        }
        let ObstacleShape::Ring { rotation, .. } = ring.shape else {
            panic!("expected ring");
        };
        assert!((rotation - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_color_cycling_is_frame_rate_independent() {
        let tuning = Tuning::default();
        let mut coarse = Obstacle::tunnel(1, 0.0);
        let mut fine = Obstacle::tunnel(2, 0.0);
        // 30 Hz and 240 Hz clocks sampled at the same checkpoints
        for second in 0..20 {
            for step in 0..30 {
                coarse.animate(second as f64 + step as f64 / 30.0, &tuning);
            }
            for step in 0..240 {
                fine.animate(second as f64 + step as f64 / 240.0, &tuning);
            }
            let checkpoint = second as f64 + 1.0;
            coarse.animate(checkpoint, &tuning);
            fine.animate(checkpoint, &tuning);
            assert_eq!(coarse.shape, fine.shape);
        }
    }

    proptest! {
        #[test]
        fn prop_ring_segment_matches_visual_quadrant(
            quadrant in 0usize..4,
            frac in 0.01f32..0.99,
            rotation in -10.0f32..10.0,
            turns in -3i32..3,
        ) {
            // A point drawn inside painted quadrant `q` at this rotation,
            // expressed with an arbitrary number of extra turns
            let angle = rotation + (quadrant as f32 + frac) * FRAC_PI_2 + turns as f32 * TAU;
            prop_assert_eq!(ring_segment(angle, rotation), quadrant);
        }
    }
}
