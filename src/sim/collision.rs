//! Point-versus-asteroid hit testing
//!
//! Asteroids are treated as circles whose radius is a tier-specific fraction
//! of their drawn size. The same test serves ship and projectile hits.

use glam::Vec2;

use super::asteroid::Asteroid;
use crate::config::SimConfig;

/// Effective hit radius of an asteroid
pub fn collision_radius(asteroid: &Asteroid, config: &SimConfig) -> f32 {
    config.asteroid_radius(asteroid.tier) * config.tiers.get(asteroid.tier).collision
}

/// Check whether a point lies strictly inside an asteroid's hit envelope
pub fn point_hits_asteroid(asteroid: &Asteroid, point: Vec2, config: &SimConfig) -> bool {
    asteroid.pos.distance(point) < collision_radius(asteroid, config)
}

/// Index of the first asteroid hit by a point, if any
pub fn first_hit(asteroids: &[Asteroid], point: Vec2, config: &SimConfig) -> Option<usize> {
    asteroids
        .iter()
        .position(|asteroid| point_hits_asteroid(asteroid, point, config))
}
