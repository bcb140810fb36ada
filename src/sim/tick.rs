//! Per-frame simulation step
//!
//! Sub-steps run in a fixed order and later ones see earlier mutations:
//! ship, dead-ship timer, particles, projectiles, asteroids, then the
//! deferred merge of split children.

use std::f32::consts::TAU;

use super::asteroid::Asteroid;
use super::collision::{first_hit, point_hits_asteroid};
use super::state::{GameEvent, GameState, Particle, Projectile, ShipStatus};
use crate::{heading, wrap_position};

/// Advance the game by one frame.
///
/// `timestamp` is the frame time in milliseconds, `dt` the seconds elapsed
/// since the previous frame. Calls must be sequential.
pub fn advance(state: &mut GameState, timestamp: f64, dt: f32) {
    state.timestamp = timestamp;
    state.last_delta = dt;
    state.events.clear();

    update_ship(state, timestamp, dt);

    if let ShipStatus::Dead { since } = state.ship.status {
        // Fragments fade in place while the ship is gone
        for particle in &mut state.particles {
            particle.ttl = (particle.ttl - dt).max(0.0);
        }
        if timestamp - since > state.config.respawn_delay_ms {
            state.reset();
            return;
        }
    } else {
        update_particles(state, dt);
    }

    let incoming = update_projectiles(state, dt);
    update_asteroids(state, timestamp, dt);

    // Children join only after the field has been iterated
    state.asteroids.extend(incoming);
}

/// Turn, thrust, drag, move and fire
fn update_ship(state: &mut GameState, timestamp: f64, dt: f32) {
    if !state.ship.is_alive() {
        return;
    }

    let config = &state.config;
    let ship = &mut state.ship;
    let intents = ship.intents;

    if intents.turn_left {
        ship.rotation -= dt * TAU * config.turn_speed;
    }
    if intents.turn_right {
        ship.rotation += dt * TAU * config.turn_speed;
    }

    let direction = ship.direction();
    if intents.thrust_forward {
        ship.vel += direction * (dt * config.move_speed);
    }
    ship.vel *= 1.0 - config.drag;
    ship.pos = wrap_position(ship.pos + ship.vel, config.playfield());

    if !intents.fire || state.projectiles.len() >= config.max_projectiles {
        return;
    }
    let ready = state
        .last_shot_at
        .is_none_or(|last| timestamp - last >= config.shooting_rate_ms);
    if !ready {
        return;
    }

    let pos = wrap_position(
        ship.pos + direction * config.projectile_offset,
        config.playfield(),
    );
    let vel = direction * config.projectile_speed;
    let ttl = config.projectile_ttl;

    let id = state.next_entity_id();
    state.projectiles.push(Projectile { id, pos, vel, ttl });
    state.last_shot_at = Some(timestamp);
    state.events.push(GameEvent::ProjectileFired { id });
    log::trace!("Projectile {id} fired at t={timestamp}");
}

/// Move live particles and drop the expired ones
fn update_particles(state: &mut GameState, dt: f32) {
    let playfield = state.config.playfield();
    state.particles.retain_mut(|particle: &mut Particle| {
        particle.pos = wrap_position(particle.pos + particle.vel, playfield);
        particle.ttl -= dt;
        particle.ttl > 0.0
    });
}

/// Resolve projectile hits, then move survivors.
///
/// Returns the children of split asteroids; they are merged after the
/// asteroid pass so nothing iterates a collection that is growing.
fn update_projectiles(state: &mut GameState, dt: f32) -> Vec<Asteroid> {
    let playfield = state.config.playfield();
    let mut incoming = Vec::new();

    let mut i = 0;
    while i < state.projectiles.len() {
        let pos = state.projectiles[i].pos;

        if let Some(hit) = first_hit(&state.asteroids, pos, &state.config) {
            // Both the projectile and the asteroid are consumed this tick
            let projectile = state.projectiles.remove(i);
            let parent = state.asteroids.remove(hit);
            break_asteroid(state, &parent, &projectile, &mut incoming);
            continue;
        }

        let projectile = &mut state.projectiles[i];
        projectile.pos = wrap_position(projectile.pos + projectile.vel, playfield);
        projectile.ttl -= dt;
        if projectile.ttl <= 0.0 {
            state.projectiles.remove(i);
        } else {
            i += 1;
        }
    }

    incoming
}

/// Split or destroy a hit asteroid
fn break_asteroid(
    state: &mut GameState,
    parent: &Asteroid,
    projectile: &Projectile,
    incoming: &mut Vec<Asteroid>,
) {
    match parent.tier.smaller() {
        Some(_) => {
            let ids = [state.next_entity_id(), state.next_entity_id()];
            let children = parent.split(projectile.vel, &mut state.rng, ids);
            log::debug!(
                "Asteroid {} ({:?}) split into {:?}",
                parent.id,
                parent.tier,
                ids
            );
            state.events.push(GameEvent::AsteroidSplit {
                parent: parent.id,
                tier: parent.tier,
                children: ids,
            });
            incoming.extend(children);
        }
        None => {
            log::debug!("Asteroid {} destroyed", parent.id);
            state
                .events
                .push(GameEvent::AsteroidDestroyed { id: parent.id });
        }
    }
    state.spawn_debris(parent.pos);
}

/// Drift asteroids and check them against the ship
fn update_asteroids(state: &mut GameState, timestamp: f64, dt: f32) {
    let config = &state.config;
    let playfield = config.playfield();
    let ship_alive = state.ship.is_alive();
    let ship_pos = state.ship.pos;
    let mut ship_hit = false;

    for asteroid in &mut state.asteroids {
        let thrust = dt * config.asteroid_speed * config.tiers.get(asteroid.tier).velocity;
        asteroid.vel += heading(asteroid.rotation) * thrust;
        asteroid.vel *= 1.0 - config.drag;
        asteroid.pos = wrap_position(asteroid.pos + asteroid.vel, playfield);

        if ship_alive && !ship_hit && point_hits_asteroid(asteroid, ship_pos, config) {
            ship_hit = true;
        }
    }

    if ship_hit {
        state.destroy_ship(timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::{AsteroidTier, Intents, ParticleShape};
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// A game with no asteroids and no debris, so scenarios stay isolated
    fn empty_game(seed: &str) -> GameState {
        let config = SimConfig {
            asteroid_count: 0,
            debris_particles: 0,
            ..Default::default()
        };
        GameState::new(seed, config)
    }

    fn place(state: &mut GameState, tier: AsteroidTier, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state
            .asteroids
            .push(Asteroid::new(id, tier, pos, Vec2::ZERO, 0.0, format!("rock-{id}")));
        id
    }

    fn fire() -> Intents {
        Intents {
            fire: true,
            ..Default::default()
        }
    }

    fn assert_in_bounds(state: &GameState) {
        let (w, h) = (state.config.width, state.config.height);
        let inside = |p: Vec2| p.x >= 0.0 && p.x < w && p.y >= 0.0 && p.y < h;
        assert!(inside(state.ship.pos));
        assert!(state.asteroids.iter().all(|a| inside(a.pos)));
        assert!(state.projectiles.iter().all(|p| inside(p.pos)));
        assert!(state.particles.iter().all(|p| inside(p.pos)));
    }

    #[test]
    fn test_turn_left_exact() {
        let mut state = empty_game("turn");
        state.set_intents(Intents {
            turn_left: true,
            ..Default::default()
        });
        advance(&mut state, 100.0, 0.1);
        assert_eq!(state.ship.rotation, -(0.1 * TAU * 0.8));
    }

    #[test]
    fn test_both_turns_cancel() {
        let mut state = empty_game("turn-both");
        state.set_intents(Intents {
            turn_left: true,
            turn_right: true,
            ..Default::default()
        });
        advance(&mut state, 100.0, 0.1);
        assert_eq!(state.ship.rotation, 0.0);
    }

    #[test]
    fn test_thrust_and_drag() {
        let mut state = empty_game("thrust");
        let start = state.ship.pos;
        state.set_intents(Intents {
            thrust_forward: true,
            ..Default::default()
        });
        advance(&mut state, 0.0, 0.1);

        // Rotation 0 faces up: velocity goes negative y, reduced by drag
        let expected = 0.1 * state.config.move_speed * (1.0 - state.config.drag);
        assert!(state.ship.vel.x.abs() < 1e-6);
        assert!((state.ship.vel.y + expected).abs() < 1e-6);
        assert_eq!(state.ship.pos, start + state.ship.vel);

        // Drag keeps bleeding speed once thrust stops
        state.set_intents(Intents::default());
        let before = state.ship.vel;
        advance(&mut state, 16.0, DT);
        assert_eq!(state.ship.vel, before * (1.0 - state.config.drag));
    }

    #[test]
    fn test_ship_wraps_around() {
        let mut state = empty_game("wrap");
        state.ship.pos = Vec2::new(1023.5, 0.5);
        state.ship.vel = Vec2::new(2.0, -2.0);
        advance(&mut state, 0.0, DT);
        assert_in_bounds(&state);
        assert!(state.ship.pos.x < 10.0);
        assert!(state.ship.pos.y > 700.0);
    }

    #[test]
    fn test_fire_rate_limit() {
        let mut state = empty_game("rate");
        state.set_intents(fire());

        advance(&mut state, 1000.0, DT);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.events, vec![GameEvent::ProjectileFired { id: state.projectiles[0].id }]);

        // Inside the window: no second shot
        advance(&mut state, 1100.0, DT);
        assert_eq!(state.projectiles.len(), 1);

        // Exactly at the rate boundary a shot is allowed
        advance(&mut state, 1250.0, DT);
        assert_eq!(state.projectiles.len(), 2);
        assert_eq!(state.last_shot_at, Some(1250.0));
    }

    #[test]
    fn test_projectile_cap() {
        let mut state = empty_game("cap");
        state.set_intents(fire());
        let mut t = 0.0;
        for _ in 0..40 {
            advance(&mut state, t, DT);
            assert!(state.projectiles.len() <= state.config.max_projectiles);
            t += state.config.shooting_rate_ms;
        }
        assert_eq!(state.projectiles.len(), state.config.max_projectiles);
    }

    #[test]
    fn test_projectile_spawn_and_expiry() {
        let mut state = empty_game("ttl");
        state.set_intents(fire());
        advance(&mut state, 0.0, DT);
        state.set_intents(Intents::default());

        let projectile = &state.projectiles[0];
        // Spawned at the muzzle, then moved once during the same tick
        let muzzle = Vec2::new(512.0, 384.0 - state.config.projectile_offset);
        assert!((projectile.pos - (muzzle + projectile.vel)).length() < 1e-4);
        assert!((projectile.vel.length() - state.config.projectile_speed).abs() < 1e-5);

        // Three seconds of frames later it has fizzled
        advance(&mut state, 1000.0, 1.5);
        assert_eq!(state.projectiles.len(), 1);
        advance(&mut state, 2000.0, 1.5);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_big_asteroid_split_scenario() {
        let mut state = empty_game("test-1");
        let parent_pos = Vec2::new(500.0, 400.0);
        let parent = place(&mut state, AsteroidTier::Big, parent_pos);

        // Aim the ship at the asteroid
        let aim = parent_pos - state.ship.pos;
        state.ship.rotation = aim.y.atan2(aim.x) + std::f32::consts::FRAC_PI_2;
        state.set_intents(fire());

        let fired_before = state.projectiles.len();
        advance(&mut state, 0.0, DT);

        assert_eq!(state.asteroids.len(), 2);
        assert!(state.asteroids.iter().all(|a| a.tier == AsteroidTier::Medium));
        assert!(state.asteroids.iter().all(|a| a.pos == parent_pos));
        assert!(state.asteroids.iter().all(|a| a.id != parent));
        // One fired and consumed in the same tick
        assert_eq!(state.projectiles.len(), fired_before);
        assert!(state.ship.is_alive());
        assert!(matches!(
            state.events.as_slice(),
            [GameEvent::ProjectileFired { .. }, GameEvent::AsteroidSplit { tier: AsteroidTier::Big, .. }]
        ));
    }

    #[test]
    fn test_split_and_destroy_counts() {
        for (tier, delta) in [
            (AsteroidTier::Big, 1i32),
            (AsteroidTier::Medium, 1),
            (AsteroidTier::Small, -1),
        ] {
            let mut state = empty_game("counts");
            place(&mut state, AsteroidTier::Small, Vec2::new(100.0, 100.0));
            let target = Vec2::new(800.0, 600.0);
            place(&mut state, tier, target);
            state.projectiles.push(Projectile {
                id: 99,
                pos: target,
                vel: Vec2::new(8.0, 0.0),
                ttl: 3.0,
            });

            let before = state.asteroids.len() as i32;
            advance(&mut state, 0.0, DT);
            assert_eq!(state.asteroids.len() as i32 - before, delta, "{tier:?}");
            assert!(state.projectiles.is_empty());
        }
    }

    #[test]
    fn test_projectile_hits_only_one_asteroid() {
        let mut state = empty_game("one-hit");
        let spot = Vec2::new(800.0, 600.0);
        place(&mut state, AsteroidTier::Small, spot);
        place(&mut state, AsteroidTier::Small, spot);
        state.projectiles.push(Projectile {
            id: 50,
            pos: spot,
            vel: Vec2::new(0.0, 8.0),
            ttl: 3.0,
        });

        advance(&mut state, 0.0, DT);
        assert_eq!(state.asteroids.len(), 1);
    }

    #[test]
    fn test_debris_on_hit() {
        let mut state = empty_game("debris");
        state.config.debris_particles = 6;
        let spot = Vec2::new(800.0, 600.0);
        place(&mut state, AsteroidTier::Small, spot);
        state.projectiles.push(Projectile {
            id: 7,
            pos: spot,
            vel: Vec2::new(0.0, 8.0),
            ttl: 3.0,
        });

        advance(&mut state, 0.0, DT);
        assert_eq!(state.particles.len(), 6);
        assert!(state
            .particles
            .iter()
            .all(|p| matches!(p.shape, ParticleShape::Dot { .. })));
    }

    #[test]
    fn test_ship_dies_on_contact() {
        let mut state = empty_game("crash");
        let ship_pos = state.ship.pos;
        place(&mut state, AsteroidTier::Big, ship_pos + Vec2::new(10.0, 0.0));

        advance(&mut state, 500.0, DT);
        assert_eq!(state.ship.status, ShipStatus::Dead { since: 500.0 });
        assert_eq!(state.particles.len(), state.config.particle_burst);
        assert!(state.events.contains(&GameEvent::ShipDestroyed { at: 500.0 }));
    }

    #[test]
    fn test_dead_ship_ignores_intents() {
        let mut state = empty_game("gated");
        state.destroy_ship(0.0);
        let (pos, vel, rotation) = (state.ship.pos, state.ship.vel, state.ship.rotation);

        state.set_intents(Intents {
            turn_left: true,
            turn_right: false,
            thrust_forward: true,
            fire: true,
        });
        for frame in 1..=30 {
            advance(&mut state, frame as f64 * FRAME_MS, DT);
        }

        assert_eq!(state.ship.pos, pos);
        assert_eq!(state.ship.vel, vel);
        assert_eq!(state.ship.rotation, rotation);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_particles_decay_in_place_while_dead() {
        let mut state = empty_game("decay");
        state.destroy_ship(0.0);
        let before: Vec<(Vec2, f32)> = state.particles.iter().map(|p| (p.pos, p.ttl)).collect();

        advance(&mut state, 100.0, 0.5);
        for (p, (pos, ttl)) in state.particles.iter().zip(&before) {
            assert_eq!(p.pos, *pos);
            assert!((p.ttl - (ttl - 0.5)).abs() < 1e-6);
        }

        // Clamped at zero, never negative
        advance(&mut state, 200.0, 10.0);
        assert!(state.particles.iter().all(|p| p.ttl == 0.0));
        assert_eq!(state.particles.len(), before.len());
    }

    #[test]
    fn test_particles_move_and_expire_while_alive() {
        let mut state = empty_game("alive-particles");
        state.particles.push(Particle {
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::new(1.0, 2.0),
            ttl: 0.05,
            shape: ParticleShape::Dot { radius: 1.0 },
        });

        advance(&mut state, 0.0, 0.02);
        assert_eq!(state.particles[0].pos, Vec2::new(11.0, 12.0));
        advance(&mut state, 20.0, 0.05);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_respawn_timing() {
        let mut state = empty_game("respawn");
        state.config.asteroid_count = 3;
        state.destroy_ship(1000.0);
        state.projectiles.push(Projectile {
            id: 1,
            pos: Vec2::new(5.0, 5.0),
            vel: Vec2::ZERO,
            ttl: 100.0,
        });

        // Exactly at the delay the ship is still dead
        advance(&mut state, 4000.0, DT);
        assert!(!state.ship.is_alive());
        assert_eq!(state.seed(), "respawn");

        advance(&mut state, 4000.5, DT);
        assert!(state.ship.is_alive());
        assert_eq!(state.ship.pos, state.config.center());
        assert_eq!(state.asteroids.len(), 3);
        assert!(state.particles.is_empty());
        assert!(state.projectiles.is_empty());
        assert_ne!(state.seed(), "respawn");
        assert!(matches!(state.events.as_slice(), [GameEvent::FieldReset { .. }]));
    }

    #[test]
    fn test_asteroid_drifts_along_rotation() {
        let mut state = empty_game("drift");
        place(&mut state, AsteroidTier::Medium, Vec2::new(100.0, 100.0));

        advance(&mut state, 0.0, 0.5);
        let asteroid = &state.asteroids[0];
        // Rotation 0 pushes up the screen
        let expected = 0.5 * state.config.asteroid_speed * state.config.tiers.medium.velocity
            * (1.0 - state.config.drag);
        assert!(asteroid.vel.x.abs() < 1e-6);
        assert!((asteroid.vel.y + expected).abs() < 1e-6);
        assert_eq!(asteroid.pos, Vec2::new(100.0, 100.0) + asteroid.vel);
    }

    fn run(seed: &str, frames: &[Intents]) -> GameState {
        let mut state = GameState::new(seed, SimConfig::default());
        for (i, intents) in frames.iter().enumerate() {
            state.set_intents(*intents);
            advance(&mut state, i as f64 * FRAME_MS, DT);
        }
        state
    }

    fn intents_strategy() -> impl Strategy<Value = Intents> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(turn_left, turn_right, thrust_forward, fire)| Intents {
                turn_left,
                turn_right,
                thrust_forward,
                fire,
            },
        )
    }

    #[test]
    fn test_determinism() {
        let script: Vec<Intents> = (0..600)
            .map(|i| Intents {
                turn_left: i % 90 < 20,
                turn_right: i % 120 > 100,
                thrust_forward: i % 50 < 25,
                fire: i % 7 == 0,
            })
            .collect();

        let a = run("det", &script);
        let b = run("det", &script);

        assert_eq!(a.seed(), b.seed());
        assert_eq!(a.ship.pos.to_array().map(f32::to_bits), b.ship.pos.to_array().map(f32::to_bits));
        assert_eq!(a.asteroids.len(), b.asteroids.len());
        for (x, y) in a.asteroids.iter().zip(&b.asteroids) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.pos.to_array().map(f32::to_bits), y.pos.to_array().map(f32::to_bits));
            assert_eq!(x.seed, y.seed);
        }
        assert_eq!(a.projectiles.len(), b.projectiles.len());
        assert_eq!(a.particles.len(), b.particles.len());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_positions_stay_on_playfield(
            seed in "[a-z0-9]{1,12}",
            frames in prop::collection::vec(intents_strategy(), 1..240),
        ) {
            let mut state = GameState::new(&seed, SimConfig::default());
            for (i, intents) in frames.iter().enumerate() {
                state.set_intents(*intents);
                advance(&mut state, i as f64 * 100.0, 0.1);
                assert_in_bounds(&state);
            }
        }

        #[test]
        fn prop_projectiles_never_exceed_cap(
            frames in prop::collection::vec(intents_strategy(), 1..240),
        ) {
            let mut state = GameState::new("cap-prop", SimConfig::default());
            for (i, intents) in frames.iter().enumerate() {
                state.set_intents(*intents);
                advance(&mut state, i as f64 * 50.0, 0.05);
                prop_assert!(state.projectiles.len() <= state.config.max_projectiles);
            }
        }
    }
}
