//! Data-driven game balance
//!
//! Every gameplay number that is worth tweaking without a rebuild lives
//! here. Missing fields fall back to the compiled-in defaults.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// What happens to the selected color after an obstacle is passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorAdvance {
    /// Step to the next available color on every pass
    #[default]
    OnPass,
    /// Only the player changes colors
    Manual,
}

/// Errors raised while loading tuning data
#[derive(Debug)]
pub enum TuningError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read tuning file: {err}"),
            Self::Parse(err) => write!(f, "malformed tuning json: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid tuning `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for TuningError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Game balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Full color cycle, unlocked left to right (0xRRGGBB)
    pub colors: [u32; COLOR_COUNT],

    // === Ball ===
    pub start_max_speed: f32,

    // === Level spawning ===
    /// Depth of the first level
    pub first_level_z: f32,
    /// Distance between consecutive levels
    pub level_spacing: f32,
    /// Distance between the two obstacles of a level
    pub pair_offset: f32,
    /// Obstacles must exist at least this far ahead of the ball
    pub spawn_ahead_distance: f32,
    /// Obstacles this far behind the ball are retired
    pub despawn_behind_distance: f32,
    /// Drop a fresh ring past the frontier whenever a ring is passed
    pub replacement_rings: bool,

    // === Color cycling (cycles per second) ===
    pub wall_color_rate: f64,
    pub plate_color_rate: f64,
    pub tunnel_color_rate: f64,
    pub color_advance: ColorAdvance,

    // === Chaser ===
    pub chasers_enabled: bool,
    pub chaser_cooldown_ms: f64,
    /// Depth offset from the ball at spawn (positive = behind)
    pub chaser_spawn_offset: f32,
    /// Depth covered per tick
    pub chaser_advance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS,

            start_max_speed: BALL_START_MAX_SPEED,

            first_level_z: FIRST_LEVEL_Z,
            level_spacing: LEVEL_SPACING,
            pair_offset: LEVEL_PAIR_OFFSET,
            spawn_ahead_distance: SPAWN_AHEAD_DISTANCE,
            despawn_behind_distance: DESPAWN_BEHIND_DISTANCE,
            replacement_rings: true,

            wall_color_rate: WALL_COLOR_RATE,
            plate_color_rate: PLATE_COLOR_RATE,
            tunnel_color_rate: TUNNEL_COLOR_RATE,
            color_advance: ColorAdvance::OnPass,

            chasers_enabled: true,
            chaser_cooldown_ms: CHASER_COOLDOWN_MS,
            chaser_spawn_offset: CHASER_SPAWN_OFFSET,
            chaser_advance: CHASER_ADVANCE,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file on disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        for (i, a) in self.colors.iter().enumerate() {
            if self.colors[i + 1..].contains(a) {
                return Err(invalid("colors", format!("duplicate color {a:#08x}")));
            }
        }
        for (field, value) in [
            ("first_level_z", self.first_level_z),
            ("level_spacing", self.level_spacing),
            ("pair_offset", self.pair_offset),
            ("chaser_spawn_offset", self.chaser_spawn_offset),
            ("chaser_advance", self.chaser_advance),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }
        // Each step must move the f32 cursor at gameplay depths
        if self.level_spacing < MIN_LEVEL_SPACING {
            return Err(invalid(
                "level_spacing",
                format!("must be at least {MIN_LEVEL_SPACING}"),
            ));
        }
        if !(self.spawn_ahead_distance > 0.0) {
            return Err(invalid("spawn_ahead_distance", "must be positive"));
        }
        if !(self.despawn_behind_distance > 0.0) {
            return Err(invalid("despawn_behind_distance", "must be positive"));
        }
        if !(self.start_max_speed > 0.0 && self.start_max_speed <= BALL_SPEED_CAP) {
            return Err(invalid(
                "start_max_speed",
                format!("must be in (0, {BALL_SPEED_CAP}]"),
            ));
        }
        for (field, rate) in [
            ("wall_color_rate", self.wall_color_rate),
            ("plate_color_rate", self.plate_color_rate),
            ("tunnel_color_rate", self.tunnel_color_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(invalid(field, "must be finite and non-negative"));
            }
        }
        if !self.chaser_cooldown_ms.is_finite() || self.chaser_cooldown_ms < 0.0 {
            return Err(invalid("chaser_cooldown_ms", "must be finite and non-negative"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}
