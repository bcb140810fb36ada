//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (including spawn placement and re-seeding)
//! - Caller-supplied timestamps and deltas, no clock access
//! - No rendering or platform dependencies

pub mod asteroid;
pub mod collision;
pub mod rng;
pub mod state;
pub mod tick;

pub use asteroid::{Asteroid, AsteroidTier, generate_shape};
pub use collision::{collision_radius, first_hit, point_hits_asteroid};
pub use rng::SimRng;
pub use state::{
    GameEvent, GameState, Intents, Particle, ParticleShape, Projectile, Ship, ShipStatus,
};
pub use tick::advance;

impl GameState {
    /// Advance the simulation by one frame (see [`tick::advance`])
    pub fn advance(&mut self, timestamp: f64, dt: f32) {
        tick::advance(self, timestamp, dt);
    }
}
