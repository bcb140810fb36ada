//! Game state and core simulation types
//!
//! `GameState` is the aggregate root: it exclusively owns every entity.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::asteroid::{Asteroid, AsteroidTier};
use super::rng::SimRng;
use crate::config::SimConfig;
use crate::{heading, wrap_position};

/// Held input state for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intents {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust_forward: bool,
    pub fire: bool,
}

/// Whether the ship is flying or waiting for the field to reset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShipStatus {
    Alive,
    /// Destroyed at the given timestamp (milliseconds)
    Dead { since: f64 },
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radians, 0 = facing up the screen
    pub rotation: f32,
    pub intents: Intents,
    pub status: ShipStatus,
}

impl Ship {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            intents: Intents::default(),
            status: ShipStatus::Alive,
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.status, ShipStatus::Alive)
    }

    /// Unit vector the ship points along
    pub fn direction(&self) -> Vec2 {
        heading(self.rotation)
    }
}

/// A projectile fired by the ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left before it fizzles
    pub ttl: f32,
}

/// Shape-specific particle data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleShape {
    /// Hull fragment
    Line { rotation: f32, length: f32 },
    /// Rock debris
    Dot { radius: f32 },
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left; never negative
    pub ttl: f32,
    pub shape: ParticleShape,
}

/// Notable things that happened during the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ProjectileFired { id: u32 },
    AsteroidSplit { parent: u32, tier: AsteroidTier, children: [u32; 2] },
    AsteroidDestroyed { id: u32 },
    ShipDestroyed { at: f64 },
    FieldReset { seed: String },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seeded stream; its seed is the current run seed
    pub rng: SimRng,
    pub config: SimConfig,
    /// Timestamp of the last `advance` call (milliseconds)
    pub timestamp: f64,
    /// Delta of the last `advance` call (seconds)
    pub last_delta: f32,
    pub ship: Ship,
    pub asteroids: Vec<Asteroid>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    /// When the last projectile was fired (milliseconds)
    pub last_shot_at: Option<f64>,
    /// Events raised by the last `advance` call
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game with the given seed and a freshly generated field
    pub fn new(seed: &str, config: SimConfig) -> Self {
        let mut state = Self {
            rng: SimRng::new(seed),
            ship: Ship::new(config.center()),
            config,
            timestamp: 0.0,
            last_delta: 0.0,
            asteroids: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            last_shot_at: None,
            events: Vec::new(),
            next_id: 1,
        };
        state.spawn_field();
        log::info!(
            "New game with seed {} ({} asteroids)",
            state.seed(),
            state.asteroids.len()
        );
        state
    }

    /// Current run seed
    pub fn seed(&self) -> &str {
        self.rng.seed()
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Copy the adapter's intents onto the ship
    pub fn set_intents(&mut self, intents: Intents) {
        self.ship.intents = intents;
    }

    /// Replace the asteroid field with `asteroid_count` random asteroids
    pub fn spawn_field(&mut self) {
        self.asteroids.clear();
        let avoid = self.config.center();
        for _ in 0..self.config.asteroid_count {
            let id = self.next_entity_id();
            let asteroid = Asteroid::random(id, &mut self.rng, &self.config, avoid);
            self.asteroids.push(asteroid);
        }
    }

    /// Start over with a fresh seed drawn from the current stream
    pub fn reset(&mut self) {
        let seed = self.rng.fresh_seed();
        self.rng = SimRng::new(&seed);
        self.ship = Ship::new(self.config.center());
        self.projectiles.clear();
        self.particles.clear();
        self.last_shot_at = None;
        self.spawn_field();

        log::info!("Field reset with seed {seed}");
        self.events.push(GameEvent::FieldReset { seed });
    }

    /// Mark the ship destroyed and throw out a burst of hull fragments
    pub fn destroy_ship(&mut self, timestamp: f64) {
        self.ship.status = ShipStatus::Dead { since: timestamp };

        let size = self.config.ship_size;
        let playfield = self.config.playfield();
        for i in 0..self.config.particle_burst {
            let rng = &mut self.rng;
            let jitter = Vec2::new(rng.random() - 0.5, rng.random() - 0.5) * size;
            let drift = Vec2::from_angle(rng.random() * TAU) * (0.25 + 0.5 * rng.random());
            let rotation = rng.random() * TAU;
            let length = size * (0.4 + 0.6 * rng.random());
            let ttl = 1.0 + i as f32 + rng.random();

            self.particles.push(Particle {
                pos: wrap_position(self.ship.pos + jitter, playfield),
                vel: self.ship.vel * 0.5 + drift,
                ttl,
                shape: ParticleShape::Line { rotation, length },
            });
        }

        log::debug!("Ship destroyed at {:?} (t={timestamp})", self.ship.pos);
        self.events.push(GameEvent::ShipDestroyed { at: timestamp });
    }

    /// Scatter rock debris from a broken asteroid
    pub fn spawn_debris(&mut self, pos: Vec2) {
        for _ in 0..self.config.debris_particles {
            let rng = &mut self.rng;
            let vel = Vec2::from_angle(rng.random() * TAU) * (0.5 + 1.5 * rng.random());
            let radius = 1.0 + 1.5 * rng.random();
            let ttl = 0.5 + 0.5 * rng.random();
            self.particles.push(Particle {
                pos,
                vel,
                ttl,
                shape: ParticleShape::Dot { radius },
            });
        }
    }
}
