//! Asteroid Drift - deterministic simulation core for a toroidal asteroids game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, splitting, respawn)
//! - `config`: Startup tunables, loadable from JSON
//! - `snapshot`: Read-only frame views handed to a rendering adapter

pub mod config;
pub mod sim;
pub mod snapshot;

pub use config::{ConfigError, SimConfig, TierTuning};
pub use snapshot::Frame;

use glam::Vec2;

/// Game configuration defaults
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f32 = 1024.0;
    pub const PLAYFIELD_HEIGHT: f32 = 768.0;

    /// Ship turn speed (revolutions per second)
    pub const TURN_SPEED: f32 = 0.8;
    /// Ship thrust (velocity gained per second of thrust, pixels/frame)
    pub const MOVE_SPEED: f32 = 10.0;
    /// Fraction of velocity lost every tick (frame-rate dependent on purpose)
    pub const DRAG: f32 = 0.02;
    /// Ship hull length, used for death burst jitter and line lengths
    pub const SHIP_SIZE: f32 = 16.0;

    /// Absolute radius of a BIG asteroid; smaller tiers scale from it
    pub const ASTEROID_SCALE: f32 = 64.0;
    /// Asteroid self-propulsion along its rotation axis
    pub const ASTEROID_SPEED: f32 = 1.0;
    /// Asteroids present at start and after every reset
    pub const ASTEROID_COUNT: usize = 5;
    /// No asteroid spawns closer than this to the ship spawn point
    pub const SPAWN_CLEARANCE: f32 = 150.0;

    /// Projectile speed (pixels/frame)
    pub const PROJECTILE_SPEED: f32 = 8.0;
    /// Projectile time-to-live (seconds)
    pub const PROJECTILE_TTL: f32 = 3.0;
    /// Minimum time between shots (milliseconds)
    pub const SHOOTING_RATE_MS: f64 = 250.0;
    /// Maximum projectiles alive at once
    pub const MAX_PROJECTILES: usize = 8;
    /// Distance from ship centre to the muzzle
    pub const PROJECTILE_OFFSET: f32 = 12.0;

    /// Line particles spawned when the ship dies
    pub const PARTICLE_BURST: usize = 4;
    /// Dot particles spawned when a projectile breaks an asteroid
    pub const DEBRIS_PARTICLES: usize = 6;

    /// Time the ship stays dead before the field resets (milliseconds)
    pub const RESPAWN_DELAY_MS: f64 = 3000.0;
}

/// Unit vector an entity with the given rotation faces.
///
/// Rotation 0 points up the screen (negative y), matching how the ship is drawn.
#[inline]
pub fn heading(rotation: f32) -> Vec2 {
    Vec2::from_angle(rotation - std::f32::consts::FRAC_PI_2)
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Angle of a vector in radians (atan2 convention)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Wrap a single coordinate into `[0, size)`
#[inline]
pub fn wrap_coord(value: f32, size: f32) -> f32 {
    let wrapped = value.rem_euclid(size);
    // rem_euclid can round a tiny negative up to exactly `size`
    if wrapped >= size { 0.0 } else { wrapped }
}

/// Toroidal modulo of a position against the playfield size
#[inline]
pub fn wrap_position(pos: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(wrap_coord(pos.x, size.x), wrap_coord(pos.y, size.y))
}
