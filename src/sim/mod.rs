//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by obstacle ID)
//! - Time-driven colors read only the timestamp passed to `tick`
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod field;
pub mod obstacle;
pub mod palette;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use collision::{Verdict, evaluate, required_color, resolve_collisions};
pub use field::{Maintenance, ObstacleField};
pub use obstacle::{ColorRule, Obstacle, ObstacleId, ObstacleKind, ObstacleShape, ring_segment, wall_band_index};
pub use palette::{Color, ColorPalette};
pub use state::{
    GameEvent, GamePhase, GameSession, InvariantViolation, Outcome, PlayerBall, RunSummary, Thrust,
};
pub use tick::{TickInput, tick};
