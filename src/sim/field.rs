//! Procedural obstacle field
//!
//! Levels are laid down by a single depth cursor that only ever moves
//! forward (toward negative z). Even levels hold a ring with a wall in
//! front of it, odd levels a ground plate with a tunnel behind it.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::obstacle::{Obstacle, ObstacleId, ObstacleKind};
use super::palette::Color;
use crate::consts::*;
use crate::tuning::Tuning;

/// What a `maintain` pass changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Maintenance {
    /// Newly spawned obstacles, in spawn order
    pub spawned: Vec<ObstacleId>,
    /// Obstacles dropped for falling behind the ball
    pub retired: Vec<(ObstacleId, ObstacleKind)>,
}

/// Live obstacles plus the spawn cursor
#[derive(Debug, Clone)]
pub struct ObstacleField {
    /// Live obstacles (sorted by id)
    obstacles: Vec<Obstacle>,
    /// Depth of the next level to spawn
    next_level_z: f32,
    /// Levels spawned so far (parity picks the archetype)
    level_counter: u32,
    next_id: ObstacleId,
    /// Wall-clock time (seconds) of the last chaser spawn or removal
    last_chaser_secs: f64,

    first_level_z: f32,
    level_spacing: f32,
    pair_offset: f32,
    spawn_ahead_distance: f32,
    despawn_behind_distance: f32,
}

impl ObstacleField {
    pub fn new(tuning: &Tuning) -> Self {
        assert!(
            tuning.level_spacing > 0.0,
            "level spacing must be positive for the spawn loop to terminate"
        );
        Self {
            obstacles: Vec::new(),
            next_level_z: tuning.first_level_z,
            level_counter: 0,
            next_id: 1,
            last_chaser_secs: 0.0,
            first_level_z: tuning.first_level_z,
            level_spacing: tuning.level_spacing,
            pair_offset: tuning.pair_offset,
            spawn_ahead_distance: tuning.spawn_ahead_distance,
            despawn_behind_distance: tuning.despawn_behind_distance,
        }
    }

    /// Drop every obstacle and rewind the cursor
    pub fn reset_all(&mut self) {
        self.obstacles.clear();
        self.next_level_z = self.first_level_z;
        self.level_counter = 0;
        self.last_chaser_secs = 0.0;
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn next_level_z(&self) -> f32 {
        self.next_level_z
    }

    pub fn level_counter(&self) -> u32 {
        self.level_counter
    }

    pub fn spawn_ahead_distance(&self) -> f32 {
        self.spawn_ahead_distance
    }

    fn allocate_id(&mut self) -> ObstacleId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn push(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = obstacle.id;
        log::trace!("Spawned {:?} #{} at z={:.1}", obstacle.kind(), id, obstacle.pos.z);
        self.obstacles.push(obstacle);
        id
    }

    /// Lay down one level at the cursor and move the cursor forward
    pub fn spawn_next_level(&mut self, rng: &mut Pcg32) -> [ObstacleId; 2] {
        let z = self.next_level_z;
        let ids = if self.level_counter % 2 == 0 {
            let ring_id = self.allocate_id();
            let ring = Obstacle::ring(ring_id, z, random_spin(rng));
            let wall_id = self.allocate_id();
            // Wall sits between the ring and the player
            let wall = Obstacle::wall(wall_id, z + self.pair_offset);
            [self.push(ring), self.push(wall)]
        } else {
            let plate_id = self.allocate_id();
            let plate = Obstacle::ground_plate(plate_id, z);
            let tunnel_id = self.allocate_id();
            let tunnel = Obstacle::tunnel(tunnel_id, z - self.pair_offset);
            [self.push(plate), self.push(tunnel)]
        };

        self.next_level_z -= self.level_spacing;
        self.level_counter += 1;
        ids
    }

    /// Keep obstacles populated ahead of `ball_z` and drop the ones left
    /// behind
    pub fn maintain(&mut self, ball_z: f32, rng: &mut Pcg32) -> Maintenance {
        let mut report = Maintenance::default();

        while self.next_level_z > ball_z - self.spawn_ahead_distance {
            let before = self.next_level_z;
            report.spawned.extend(self.spawn_next_level(rng));
            if self.next_level_z >= before {
                log::error!(
                    "Spawn cursor stuck at z={} (spacing {}), skipping further levels",
                    before,
                    self.level_spacing
                );
                break;
            }
        }

        let limit = ball_z + self.despawn_behind_distance;
        self.obstacles.retain(|o| {
            if o.pos.z > limit {
                report.retired.push((o.id, o.kind()));
                false
            } else {
                true
            }
        });

        report
    }

    /// Drop a fresh ring past the farthest live obstacle
    pub fn spawn_replacement_ring(&mut self, ball_z: f32, rng: &mut Pcg32) -> ObstacleId {
        let frontier = self
            .obstacles
            .iter()
            .filter(|o| !o.is_chaser())
            .map(|o| o.pos.z)
            .reduce(f32::min);
        let z = match frontier {
            Some(z) => z - REPLACEMENT_RING_GAP,
            None => ball_z - REPLACEMENT_RING_LEAD,
        };
        let id = self.allocate_id();
        self.push(Obstacle::ring(id, z, random_spin(rng)))
    }

    /// Add a hand-placed obstacle built from a fresh id
    pub fn insert_with(&mut self, build: impl FnOnce(ObstacleId) -> Obstacle) -> ObstacleId {
        let id = self.allocate_id();
        self.push(build(id))
    }

    /// Remove a resolved obstacle from the live set
    pub fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let index = self.obstacles.iter().position(|o| o.id == id)?;
        Some(self.obstacles.remove(index))
    }

    pub fn chaser(&self) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.is_chaser())
    }

    pub fn chaser_mut(&mut self) -> Option<&mut Obstacle> {
        self.obstacles.iter_mut().find(|o| o.is_chaser())
    }

    /// Restart the chaser cooldown from `now_secs`
    pub fn restart_chaser_cooldown(&mut self, now_secs: f64) {
        self.last_chaser_secs = now_secs;
    }

    /// True when a new chaser may be spawned at `now_secs`
    pub fn chaser_ready(&self, now_secs: f64, available_colors: usize, cooldown_ms: f64) -> bool {
        self.chaser().is_none()
            && available_colors > 1
            && (now_secs - self.last_chaser_secs) * 1000.0 >= cooldown_ms
    }

    /// Spawn a chaser `offset` depth units from the ball
    pub fn spawn_chaser(&mut self, ball_pos: Vec3, offset: f32, color: Color, now_secs: f64) -> ObstacleId {
        debug_assert!(self.chaser().is_none(), "only one chaser may be live");
        let id = self.allocate_id();
        let pos = Vec3::new(ball_pos.x, ball_pos.y, ball_pos.z + offset);
        self.last_chaser_secs = now_secs;
        log::info!("Chaser #{} spawned with color {:?}", id, color);
        self.push(Obstacle::chaser(id, pos, color))
    }
}

/// Random ring spin: magnitude in [min, max), random direction
fn random_spin(rng: &mut Pcg32) -> f32 {
    let magnitude = rng.random_range(RING_SPIN_MIN..RING_SPIN_MAX);
    if rng.random_bool(0.5) { magnitude } else { -magnitude }
}
