//! Simulation tunables
//!
//! Fixed for the lifetime of a run. Defaults come from [`crate::consts`];
//! a JSON file may override any subset at startup.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::AsteroidTier;

/// Per-tier asteroid scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTuning {
    /// Radius multiplier against `asteroid_scale`
    pub size: f32,
    /// Self-propulsion multiplier
    pub velocity: f32,
    /// Fraction of the radius used for hit tests
    pub collision: f32,
}

/// Tuning for each asteroid tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    pub big: TierTuning,
    pub medium: TierTuning,
    pub small: TierTuning,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            big: TierTuning {
                size: 1.0,
                velocity: 0.5,
                collision: 0.75,
            },
            medium: TierTuning {
                size: 0.5,
                velocity: 1.0,
                collision: 0.85,
            },
            small: TierTuning {
                size: 0.25,
                velocity: 1.5,
                collision: 1.0,
            },
        }
    }
}

impl TierTable {
    pub fn get(&self, tier: AsteroidTier) -> &TierTuning {
        match tier {
            AsteroidTier::Big => &self.big,
            AsteroidTier::Medium => &self.medium,
            AsteroidTier::Small => &self.small,
        }
    }
}

/// All recognised simulation tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Playfield ===
    pub width: f32,
    pub height: f32,

    // === Ship ===
    /// Revolutions per second
    pub turn_speed: f32,
    pub move_speed: f32,
    /// Multiplicative velocity loss per tick, shared by ship and asteroids
    pub drag: f32,
    pub ship_size: f32,

    // === Asteroids ===
    pub asteroid_scale: f32,
    pub asteroid_speed: f32,
    pub tiers: TierTable,
    pub asteroid_count: usize,
    pub spawn_clearance: f32,

    // === Projectiles ===
    pub projectile_speed: f32,
    /// Seconds
    pub projectile_ttl: f32,
    /// Milliseconds between shots
    pub shooting_rate_ms: f64,
    pub max_projectiles: usize,
    pub projectile_offset: f32,

    // === Particles ===
    pub particle_burst: usize,
    pub debris_particles: usize,

    // === Lifecycle ===
    pub respawn_delay_ms: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,

            turn_speed: TURN_SPEED,
            move_speed: MOVE_SPEED,
            drag: DRAG,
            ship_size: SHIP_SIZE,

            asteroid_scale: ASTEROID_SCALE,
            asteroid_speed: ASTEROID_SPEED,
            tiers: TierTable::default(),
            asteroid_count: ASTEROID_COUNT,
            spawn_clearance: SPAWN_CLEARANCE,

            projectile_speed: PROJECTILE_SPEED,
            projectile_ttl: PROJECTILE_TTL,
            shooting_rate_ms: SHOOTING_RATE_MS,
            max_projectiles: MAX_PROJECTILES,
            projectile_offset: PROJECTILE_OFFSET,

            particle_burst: PARTICLE_BURST,
            debris_particles: DEBRIS_PARTICLES,

            respawn_delay_ms: RESPAWN_DELAY_MS,
        }
    }
}

/// Rejected configuration
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidPlayfield { width: f32, height: f32 },
    InvalidDrag { drag: f32 },
    InvalidValue { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "config parse error: {err}"),
            Self::InvalidPlayfield { width, height } => {
                write!(f, "playfield must be positive, got {width}x{height}")
            }
            Self::InvalidDrag { drag } => write!(f, "drag must be in [0, 1), got {drag}"),
            Self::InvalidValue { field } => write!(f, "{field} must be positive and finite"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::debug!("Loaded config: {}x{} playfield", config.width, config.height);
        Ok(config)
    }

    /// Playfield size as a vector
    pub fn playfield(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Ship spawn point
    pub fn center(&self) -> Vec2 {
        self.playfield() / 2.0
    }

    /// Absolute radius of an asteroid of the given tier
    pub fn asteroid_radius(&self, tier: AsteroidTier) -> f32 {
        self.asteroid_scale * self.tiers.get(tier).size
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        if !positive(self.width) || !positive(self.height) {
            return Err(ConfigError::InvalidPlayfield {
                width: self.width,
                height: self.height,
            });
        }
        if !(0.0..1.0).contains(&self.drag) {
            return Err(ConfigError::InvalidDrag { drag: self.drag });
        }

        let checks = [
            ("turn_speed", self.turn_speed),
            ("move_speed", self.move_speed),
            ("asteroid_scale", self.asteroid_scale),
            ("projectile_speed", self.projectile_speed),
            ("projectile_ttl", self.projectile_ttl),
            ("shooting_rate_ms", self.shooting_rate_ms as f32),
            ("respawn_delay_ms", self.respawn_delay_ms as f32),
        ];
        if let Some((field, _)) = checks.into_iter().find(|(_, v)| !positive(*v)) {
            return Err(ConfigError::InvalidValue { field });
        }

        for tuning in [&self.tiers.big, &self.tiers.medium, &self.tiers.small] {
            if !positive(tuning.size) || !positive(tuning.collision) {
                return Err(ConfigError::InvalidValue { field: "tiers" });
            }
        }
        if self.max_projectiles == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_projectiles",
            });
        }
        Ok(())
    }
}
