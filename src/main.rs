//! Asteroid Drift headless driver
//!
//! Runs the simulation at a fixed frame rate with scripted intents, standing
//! in for the display-synced scheduler a real frontend would provide.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use asteroid_drift::SimConfig;
use asteroid_drift::sim::{GameEvent, GameState, Intents};
use clap::Parser;
use rand::Rng;

#[derive(Parser, Debug)]
#[command(name = "asteroid-drift")]
#[command(about = "Run the asteroids simulation headless with scripted input")]
struct Args {
    /// Seed string (random when omitted)
    #[arg(short, long)]
    seed: Option<String>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u32,

    /// Frames per second (sets the per-frame delta)
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// JSON file overriding simulation tunables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hold thrust for the whole run
    #[arg(long)]
    thrust: bool,

    /// Hold turn-left for the whole run
    #[arg(long)]
    turn_left: bool,

    /// Hold turn-right for the whole run
    #[arg(long)]
    turn_right: bool,

    /// Hold fire for the whole run
    #[arg(long)]
    fire: bool,

    /// Print the final frame as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SimConfig::from_json(&json).with_context(|| format!("loading config {}", path.display()))
}

#[derive(Debug, Default)]
struct Tally {
    shots: u32,
    splits: u32,
    destroyed: u32,
    deaths: u32,
    resets: u32,
}

impl Tally {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ProjectileFired { .. } => self.shots += 1,
            GameEvent::AsteroidSplit { .. } => self.splits += 1,
            GameEvent::AsteroidDestroyed { .. } => self.destroyed += 1,
            GameEvent::ShipDestroyed { at } => {
                self.deaths += 1;
                log::info!("Ship destroyed at t={at:.0}ms");
            }
            GameEvent::FieldReset { seed } => {
                self.resets += 1;
                log::info!("Field reset, new seed {seed}");
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("fps must be positive, got {}", args.fps);
    }

    let config = load_config(args.config.as_ref())?;
    let seed = args
        .seed
        .clone()
        .unwrap_or_else(|| format!("{:016x}", rand::rng().random::<u64>()));

    // Held keys, sampled by the "input adapter" before every frame
    let held = Intents {
        turn_left: args.turn_left,
        turn_right: args.turn_right,
        thrust_forward: args.thrust,
        fire: args.fire,
    };

    let mut state = GameState::new(&seed, config);
    let dt = 1.0 / args.fps;
    let frame_ms = 1000.0 / args.fps as f64;
    let mut tally = Tally::default();

    for frame in 1..=args.frames {
        state.set_intents(held);
        state.advance(frame as f64 * frame_ms, dt);
        for event in &state.events {
            tally.record(event);
        }
    }

    if args.json {
        let frame = state.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&frame).context("serializing frame")?
        );
        return Ok(());
    }

    println!("Seed:        {seed}");
    println!("Final seed:  {}", state.seed());
    println!("Frames:      {}", args.frames);
    println!("Shots:       {}", tally.shots);
    println!("Splits:      {}", tally.splits);
    println!("Destroyed:   {}", tally.destroyed);
    println!("Deaths:      {}", tally.deaths);
    println!("Resets:      {}", tally.resets);
    println!("Asteroids:   {}", state.asteroids.len());
    println!("Ship alive:  {}", state.ship.is_alive());
    Ok(())
}
