//! Game session state and core simulation types
//!
//! `GameSession` owns everything that changes during a run. Nothing here
//! talks to a renderer directly: side effects are queued as `GameEvent`s
//! and drained by the host once per frame.

use std::fmt;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::field::{Maintenance, ObstacleField};
use super::obstacle::{ColorRule, ObstacleId, ObstacleKind};
use super::palette::{Color, ColorPalette};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created but not started
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended (ball destroyed)
    GameOver,
}

/// Thrust input modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Thrust {
    /// Discrete tap/click
    Tap,
    /// Continuous drag/hold, applied every tick it is active
    Hold,
}

impl Thrust {
    pub fn step(self) -> f32 {
        match self {
            Thrust::Tap => THRUST_TAP,
            Thrust::Hold => THRUST_HOLD,
        }
    }
}

/// Terminal result of an obstacle encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Passed,
    Failed,
}

/// Notifications for the rendering/UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    ObstacleSpawned {
        id: ObstacleId,
        kind: ObstacleKind,
        position: Vec3,
        colors: ColorRule,
    },
    ObstacleResolved {
        id: ObstacleId,
        kind: ObstacleKind,
        position: Vec3,
        outcome: Outcome,
    },
    /// Dropped for falling behind the ball, never resolved
    ObstacleRetired { id: ObstacleId },
    BallDestroyed { position: Vec3, color: Color },
    ScoreChanged { score: u64 },
    PaletteChanged { available: Vec<Color>, selected: usize },
    GameOver { final_score: u64 },
}

/// The player's ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBall {
    pub pos: Vec3,
    /// Forward speed in depth units per tick
    pub speed: f32,
    /// Ceiling for `speed`, ramps up as rings are passed
    pub max_speed: f32,
    pub color: Color,
    pub alive: bool,
}

impl PlayerBall {
    pub fn new(color: Color, max_speed: f32) -> Self {
        Self {
            pos: Vec3::ZERO,
            speed: 0.0,
            max_speed,
            color,
            alive: true,
        }
    }

    /// Back to the origin, stopped
    pub fn reset(&mut self, color: Color, max_speed: f32) {
        *self = Self::new(color, max_speed);
    }

    /// Add thrust, clamped at `max_speed`
    pub fn apply_thrust(&mut self, thrust: Thrust) {
        self.speed = (self.speed + thrust.step()).min(self.max_speed);
    }

    /// Move forward and decay speed
    pub fn advance(&mut self) {
        self.pos.z -= self.speed;
        self.speed *= BALL_SPEED_DECAY;
        if self.speed < BALL_STOP_EPSILON {
            self.speed = 0.0;
        }
    }

    /// Difficulty ramp applied on every ring pass
    pub fn ramp_max_speed(&mut self) {
        self.max_speed = (self.max_speed + BALL_SPEED_RAMP).min(BALL_SPEED_CAP);
    }
}

/// A broken internal contract
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvariantViolation {
    EmptyPalette,
    SelectionOutOfRange { selected: usize, len: usize },
    BallColorMismatch { ball: Color, selected: Color },
    SpeedOutOfRange { speed: f32, max_speed: f32 },
    MaxSpeedAboveCap { max_speed: f32 },
    MultipleChasers { count: usize },
    DeadBallWhilePlaying,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPalette => write!(f, "palette has no available colors"),
            Self::SelectionOutOfRange { selected, len } => {
                write!(f, "selected index {selected} out of range for {len} colors")
            }
            Self::BallColorMismatch { ball, selected } => {
                write!(f, "ball color {ball:?} differs from selected color {selected:?}")
            }
            Self::SpeedOutOfRange { speed, max_speed } => {
                write!(f, "speed {speed} outside [0, {max_speed}]")
            }
            Self::MaxSpeedAboveCap { max_speed } => {
                write!(f, "max speed {max_speed} above cap {BALL_SPEED_CAP}")
            }
            Self::MultipleChasers { count } => write!(f, "{count} chasers live"),
            Self::DeadBallWhilePlaying => write!(f, "ball destroyed but run still playing"),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// End-of-run numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub score: u64,
    pub obstacles_passed: u32,
    /// Depth travelled from the origin
    pub distance: f32,
    pub colors_available: usize,
    pub game_over: bool,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub ball: PlayerBall,
    pub palette: ColorPalette,
    pub field: ObstacleField,
    pub score: u64,
    /// Rings, walls, plates and tunnels passed this run
    pub obstacles_passed: u32,
    /// Ticks simulated this run
    pub time_ticks: u64,
    /// Wall-clock time (seconds) of the latest tick
    pub clock_secs: f64,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// New session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let colors = tuning.colors.map(Color);
        let palette = ColorPalette::new(colors);
        let ball = PlayerBall::new(palette.selected(), tuning.start_max_speed);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            field: ObstacleField::new(&tuning),
            tuning,
            phase: GamePhase::Ready,
            ball,
            palette,
            score: 0,
            obstacles_passed: 0,
            time_ticks: 0,
            clock_secs: 0.0,
            events: Vec::new(),
        }
    }

    /// Reset everything and begin a run at wall-clock `now_secs`
    pub fn start(&mut self, now_secs: f64) {
        self.score = 0;
        self.obstacles_passed = 0;
        self.time_ticks = 0;
        self.clock_secs = now_secs;
        self.palette.reset();
        self.ball.reset(self.palette.selected(), self.tuning.start_max_speed);
        self.field.reset_all();
        self.field.restart_chaser_cooldown(now_secs);
        self.phase = GamePhase::Playing;

        log::info!("Run started (seed {})", self.seed);
        self.emit(GameEvent::RunStarted);
        self.notify_score();
        self.notify_palette();

        let report = self.field.maintain(self.ball.pos.z, &mut self.rng);
        self.report_maintenance(report);
        for obstacle in self.field.obstacles_mut() {
            obstacle.animate(now_secs, &self.tuning);
        }
    }

    /// Start over after a game over (or mid-run)
    pub fn restart(&mut self, now_secs: f64) {
        self.start(now_secs);
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Manual color cycling (+1 / -1)
    pub fn cycle_color(&mut self, direction: i8) {
        if !self.is_playing() || direction == 0 || self.palette.available().len() < 2 {
            return;
        }
        self.ball.color = self.palette.cycle(direction.signum());
        self.notify_palette();
    }

    /// Queued events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn notify_score(&mut self) {
        let score = self.score;
        self.emit(GameEvent::ScoreChanged { score });
    }

    pub(crate) fn notify_palette(&mut self) {
        let available = self.palette.available().to_vec();
        let selected = self.palette.selected_index();
        self.emit(GameEvent::PaletteChanged { available, selected });
    }

    /// Announce spawns and retirements from a field pass
    pub(crate) fn report_maintenance(&mut self, report: Maintenance) {
        for id in report.spawned {
            self.announce_spawn(id);
        }
        for (id, kind) in report.retired {
            if kind == ObstacleKind::Chaser {
                // Outran the chaser; the cooldown counts from now
                self.field.restart_chaser_cooldown(self.clock_secs);
                log::debug!("Chaser #{id} left behind");
            }
            self.emit(GameEvent::ObstacleRetired { id });
        }
    }

    pub(crate) fn announce_spawn(&mut self, id: ObstacleId) {
        let Some(obstacle) = self.field.get(id) else {
            return;
        };
        let event = GameEvent::ObstacleSpawned {
            id,
            kind: obstacle.kind(),
            position: obstacle.pos,
            colors: obstacle.color_rule(self.palette.all_colors(), &self.tuning),
        };
        self.emit(event);
    }

    /// Check internal contracts
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let len = self.palette.available().len();
        if len == 0 {
            return Err(InvariantViolation::EmptyPalette);
        }
        let selected = self.palette.selected_index();
        if selected >= len {
            return Err(InvariantViolation::SelectionOutOfRange { selected, len });
        }
        if self.ball.color != self.palette.selected() {
            return Err(InvariantViolation::BallColorMismatch {
                ball: self.ball.color,
                selected: self.palette.selected(),
            });
        }
        if self.ball.speed < 0.0 || self.ball.speed > self.ball.max_speed {
            return Err(InvariantViolation::SpeedOutOfRange {
                speed: self.ball.speed,
                max_speed: self.ball.max_speed,
            });
        }
        if self.ball.max_speed > BALL_SPEED_CAP {
            return Err(InvariantViolation::MaxSpeedAboveCap {
                max_speed: self.ball.max_speed,
            });
        }
        let chasers = self.field.obstacles().iter().filter(|o| o.is_chaser()).count();
        if chasers > 1 {
            return Err(InvariantViolation::MultipleChasers { count: chasers });
        }
        if self.phase == GamePhase::Playing && !self.ball.alive {
            return Err(InvariantViolation::DeadBallWhilePlaying);
        }
        Ok(())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            ticks: self.time_ticks,
            score: self.score,
            obstacles_passed: self.obstacles_passed,
            distance: -self.ball.pos.z,
            colors_available: self.palette.available().len(),
            game_over: self.is_over(),
        }
    }
}
