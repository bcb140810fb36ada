//! Read-only frame views for the rendering adapter
//!
//! A `Frame` is an owned copy of everything a renderer needs; it cannot be
//! used to mutate the simulation.

use glam::Vec2;
use serde::Serialize;

use crate::sim::{Asteroid, AsteroidTier, GameState, Particle, ParticleShape};

#[derive(Debug, Clone, Serialize)]
pub struct ShipView {
    pub pos: Vec2,
    pub rotation: f32,
    /// Dead ships are not drawn
    pub alive: bool,
    /// Draw the exhaust flame
    pub thrusting: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AsteroidView {
    pub id: u32,
    pub tier: AsteroidTier,
    pub pos: Vec2,
    pub rotation: f32,
    pub radius: f32,
    /// Unit-space polygon, constant for the asteroid's lifetime
    pub shape: Vec<Vec2>,
    /// Polygon placed in the world
    pub outline: Vec<Vec2>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub shape: ParticleShape,
}

/// Everything drawn in one frame, plus debug overlay scalars
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub seed: String,
    pub timestamp: f64,
    pub ship: ShipView,
    pub asteroids: Vec<AsteroidView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<ParticleView>,
}

impl AsteroidView {
    fn new(asteroid: &Asteroid, radius: f32) -> Self {
        Self {
            id: asteroid.id,
            tier: asteroid.tier,
            pos: asteroid.pos,
            rotation: asteroid.rotation,
            radius,
            shape: asteroid.shape().to_vec(),
            outline: asteroid.outline(radius),
        }
    }
}

impl From<&Particle> for ParticleView {
    fn from(particle: &Particle) -> Self {
        Self {
            pos: particle.pos,
            shape: particle.shape,
        }
    }
}

impl GameState {
    /// Capture the current state for drawing
    pub fn snapshot(&self) -> Frame {
        let ship = &self.ship;
        let alive = ship.is_alive();

        Frame {
            seed: self.seed().to_owned(),
            timestamp: self.timestamp,
            ship: ShipView {
                pos: ship.pos,
                rotation: ship.rotation,
                alive,
                thrusting: alive && ship.intents.thrust_forward,
            },
            asteroids: self
                .asteroids
                .iter()
                .map(|a| AsteroidView::new(a, self.config.asteroid_radius(a.tier)))
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(|p| ProjectileView { pos: p.pos })
                .collect(),
            // Fully faded fragments linger at ttl 0 while the ship is dead
            particles: self
                .particles
                .iter()
                .filter(|p| p.ttl > 0.0)
                .map(ParticleView::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::Intents;

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = GameState::new("snap", SimConfig::default());
        state.set_intents(Intents {
            thrust_forward: true,
            ..Default::default()
        });
        state.advance(16.0, 1.0 / 60.0);

        let frame = state.snapshot();
        assert_eq!(frame.seed, "snap");
        assert_eq!(frame.timestamp, 16.0);
        assert_eq!(frame.asteroids.len(), state.asteroids.len());
        for (view, asteroid) in frame.asteroids.iter().zip(&state.asteroids) {
            assert_eq!(view.pos, asteroid.pos);
            assert_eq!(view.shape.len(), view.outline.len());
            assert_eq!(view.radius, state.config.asteroid_radius(asteroid.tier));
        }
        assert!(frame.ship.alive);
        assert!(frame.ship.thrusting);
    }

    #[test]
    fn test_dead_ship_hidden() {
        let mut state = GameState::new("hidden", SimConfig::default());
        state.set_intents(Intents {
            thrust_forward: true,
            ..Default::default()
        });
        state.destroy_ship(0.0);

        let frame = state.snapshot();
        assert!(!frame.ship.alive);
        assert!(!frame.ship.thrusting);
        assert_eq!(frame.particles.len(), state.config.particle_burst);

        // Fragments at ttl 0 are not drawn
        state.advance(100.0, 60.0);
        assert!(state.snapshot().particles.is_empty());
    }

    #[test]
    fn test_frame_serializes() {
        let state = GameState::new("json", SimConfig::default());
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["seed"], "json");
        assert!(json["asteroids"].as_array().is_some());
        assert!(json["ship"]["alive"].as_bool().unwrap());
    }
}
