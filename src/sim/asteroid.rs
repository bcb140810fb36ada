//! Asteroid tiers, procedural outlines and splitting
//!
//! An asteroid owns a seed; its polygon is generated once from that seed and
//! never changes. Rotation is applied when the outline is placed in the world.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use crate::config::SimConfig;
use crate::{angle_of, rotate, wrap_position};

/// Re-draw limit when a spawn position lands inside the clearance zone
const MAX_SPAWN_ATTEMPTS: usize = 16;

/// Discrete asteroid size, largest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsteroidTier {
    Big,
    Medium,
    Small,
}

impl AsteroidTier {
    /// Tier the children of a split belong to (`None` for Small)
    pub fn smaller(self) -> Option<Self> {
        match self {
            AsteroidTier::Big => Some(AsteroidTier::Medium),
            AsteroidTier::Medium => Some(AsteroidTier::Small),
            AsteroidTier::Small => None,
        }
    }

    /// Pick a tier for a freshly spawned asteroid.
    ///
    /// The second draw only happens when the first one misses BIG, which makes
    /// the weights 70% / 12% / 18%.
    pub fn roll(rng: &mut SimRng) -> Self {
        if rng.random() > 0.3 {
            AsteroidTier::Big
        } else if rng.random() > 0.6 {
            AsteroidTier::Medium
        } else {
            AsteroidTier::Small
        }
    }
}

/// Generate an irregular outline in unit space (vertex radii in [0.15, 0.5])
pub fn generate_shape(rng: &mut SimRng) -> Vec<Vec2> {
    let n = rng.random_int(8, 15) as usize;
    let step = TAU / n as f32;

    (0..n)
        .map(|i| {
            let mut radius = 0.3 + 0.2 * rng.random();
            // Occasional dent
            if rng.random() < 0.2 {
                radius -= 0.15;
            }
            let angle = i as f32 * step + 0.125 * PI * rng.random();
            Vec2::from_angle(angle) * radius
        })
        .collect()
}

/// An asteroid entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub tier: AsteroidTier,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    /// Seed the outline was generated from
    pub seed: String,
    /// Unit-space outline, fixed at creation
    shape: Vec<Vec2>,
}

impl Asteroid {
    /// Build an asteroid whose outline comes from its own seed
    pub fn new(
        id: u32,
        tier: AsteroidTier,
        pos: Vec2,
        vel: Vec2,
        rotation: f32,
        seed: String,
    ) -> Self {
        let shape = generate_shape(&mut SimRng::new(&seed));
        Self {
            id,
            tier,
            pos,
            vel,
            rotation,
            seed,
            shape,
        }
    }

    /// Spawn a random asteroid somewhere outside the clearance zone around `avoid`
    pub fn random(id: u32, rng: &mut SimRng, config: &SimConfig, avoid: Vec2) -> Self {
        let seed = rng.fresh_seed();
        let tier = AsteroidTier::roll(rng);

        let mut pos = Vec2::ZERO;
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            pos = wrap_position(
                Vec2::new(rng.random() * config.width, rng.random() * config.height),
                config.playfield(),
            );
            if pos.distance(avoid) >= config.spawn_clearance {
                break;
            }
        }
        let rotation = rng.random() * TAU;

        Self::new(id, tier, pos, Vec2::ZERO, rotation, seed)
    }

    pub fn shape(&self) -> &[Vec2] {
        &self.shape
    }

    /// Outline placed in the world: scaled so the widest vertex sits at `radius`
    pub fn outline(&self, radius: f32) -> Vec<Vec2> {
        self.shape
            .iter()
            .map(|&v| self.pos + rotate(v * 2.0 * radius, self.rotation))
            .collect()
    }

    /// Break this asteroid into two children of the next tier.
    ///
    /// `impact` is the projectile velocity; the children fly off roughly
    /// perpendicular to it. Panics for SMALL asteroids, which never split.
    pub fn split(&self, impact: Vec2, rng: &mut SimRng, ids: [u32; 2]) -> [Asteroid; 2] {
        let Some(tier) = self.tier.smaller() else {
            panic!("asteroid {} is {:?} and cannot split", self.id, self.tier);
        };

        let impact_angle = angle_of(impact);
        let parent_speed = self.vel.length();

        let mut spawn_child = |id: u32, side: f32| {
            let jitter = 0.25 * PI * (rng.random() - 0.5);
            let angle = impact_angle + side * FRAC_PI_2 + jitter;
            let speed_multiplier = 1.5 * rng.random() + 0.5;
            let vel = Vec2::from_angle(angle) * parent_speed * speed_multiplier;
            let seed = rng.fresh_seed();
            // Face the direction of travel so self-propulsion pushes the same way
            Asteroid::new(id, tier, self.pos, vel, angle + FRAC_PI_2, seed)
        };

        let first = spawn_child(ids[0], 1.0);
        let second = spawn_child(ids[1], -1.0);
        [first, second]
    }
}
