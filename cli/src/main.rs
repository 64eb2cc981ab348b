//! # Material Effects CLI
//!
//! Shoots single particles from the origin through a layered tracker and
//! reports what the material did to them.
//!
//! ## Usage
//!
//! ```bash
//! # 1000 electrons of 10 GeV through the layers of geometry.json
//! material-effects --config effects.json --geometry geometry.json \
//!     --events 1000 --pid 11 --energy 10
//!
//! # Same job, different seed, verbose
//! RUST_LOG=debug material-effects -c effects.json -g geometry.json --seed 7
//! ```
//!
//! The geometry file is a JSON array of layers. Barrel layers carry a
//! `radius`, forward layers a `z` position (cm):
//!
//! ```json
//! [
//!   {"layer_number": 1, "radiation_length": 0.02, "sensitive": true, "radius": 4.4},
//!   {"layer_number": 107, "radiation_length": 0.1, "forward": true,
//!    "disk_normal": {"x": 0.0, "y": 0.0, "z": 1.0}, "z": 150.0}
//! ]
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use material_effects_core_rs::rng::{self, SharedRng};
use material_effects_core_rs::{
    Daughter, Fate, FourVector, Layer, MaterialEffects, MaterialEffectsConfig,
    ParticleTrack, SimEvent, TrackerLayer, Vector3,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Particle gun through the tracker material
#[derive(Parser, Debug)]
#[command(name = "material-effects")]
#[command(about = "Simulate material effects of a layered tracker on single particles")]
#[command(version)]
struct Args {
    /// Process flags and options (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Tracker layers (JSON array)
    #[arg(short, long)]
    geometry: PathBuf,

    /// Number of events
    #[arg(short = 'n', long, default_value = "100")]
    events: usize,

    /// Random seed
    #[arg(short, long, default_value = "12345")]
    seed: u64,

    /// PDG code of the shot particle
    #[arg(long, default_value = "11")]
    pid: i32,

    /// Energy of the shot particle (GeV)
    #[arg(long, default_value = "10.0")]
    energy: f64,

    /// Particles are shot uniformly in [-eta_max, eta_max]
    #[arg(long, default_value = "2.5")]
    eta_max: f64,
}

/// Layer with its position along the flight path
#[derive(Debug, Deserialize)]
struct PlacedLayer {
    #[serde(flatten)]
    layer: TrackerLayer,
    /// Barrel radius (cm)
    #[serde(default)]
    radius: Option<f64>,
    /// Disk position (cm)
    #[serde(default)]
    z: Option<f64>,
}

impl PlacedLayer {
    /// Flight distance from `position` along `direction` to the layer
    fn distance(&self, position: Vector3, direction: Vector3) -> Option<f64> {
        let t = if self.layer.is_forward() {
            let z = self.z?;
            if direction.z == 0.0 {
                return None;
            }
            (z - position.z) / direction.z
        } else {
            let radius = self.radius?;
            // |p_T + t d_T| = R
            let a = direction.x * direction.x + direction.y * direction.y;
            if a == 0.0 {
                return None;
            }
            let b = position.x * direction.x + position.y * direction.y;
            let c = position.x * position.x + position.y * position.y - radius * radius;
            let disc = b * b - a * c;
            if disc < 0.0 {
                return None;
            }
            (-b + disc.sqrt()) / a
        };
        (t > 0.0 && t.is_finite()).then_some(t)
    }
}

/// Mass of the shot particle (GeV)
fn mass_of(pid: i32) -> f64 {
    match pid.abs() {
        11 => 0.000_511,
        13 => 0.105_66,
        211 => 0.139_57,
        321 => 0.493_68,
        2112 => 0.939_57,
        2212 => 0.938_27,
        _ => 0.0,
    }
}

/// Electric charge of the shot particle
fn charge_of(pid: i32) -> f64 {
    let charge = match pid.abs() {
        11 | 13 => -1.0,
        211 | 321 | 2212 => 1.0,
        _ => 0.0,
    };
    if pid < 0 {
        -charge
    } else {
        charge
    }
}

#[derive(Default)]
struct Summary {
    survived: usize,
    converted: usize,
    absorbed: usize,
    crossings: usize,
    energy_loss: f64,
    vertices: usize,
    tracks: usize,
    processes: BTreeMap<&'static str, usize>,
}

fn shoot(
    effects: &mut MaterialEffects,
    layers: &[PlacedLayer],
    gun: &SharedRng,
    args: &Args,
    summary: &mut Summary,
) -> anyhow::Result<()> {
    let (eta, phi) = {
        let mut rng = gun.borrow_mut();
        (
            rng.flat(-args.eta_max, args.eta_max),
            rng.flat(0.0, 2.0 * std::f64::consts::PI),
        )
    };
    let mass = mass_of(args.pid);
    let p = (args.energy * args.energy - mass * mass).max(0.0).sqrt();
    let pt = p / eta.cosh();
    let momentum = FourVector::from_momentum(
        Vector3::new(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh()),
        mass,
    );

    let mut event = SimEvent::new();
    let charge = charge_of(args.pid);
    let index = event.add_primary(
        Daughter::new(momentum, args.pid, charge),
        FourVector::default(),
    );
    let mut track = ParticleTrack::new(momentum, FourVector::default(), args.pid, charge);

    let mut fate = Fate::Survives;
    for placed in layers {
        let Some(direction) = track.momentum().vect().unit() else {
            break;
        };
        let position = track.position().vect();
        let Some(distance) = placed.distance(position, direction) else {
            continue;
        };
        let hit = position + direction * distance;
        track.set_position(FourVector::new(hit.x, hit.y, hit.z, 0.0));

        fate = effects
            .interact(&mut event, &placed.layer, &mut track, index)
            .with_context(|| format!("event {}: layer {}", event.id(), placed.layer.layer_number))?;
        summary.crossings += 1;
        summary.energy_loss += effects.energy_loss();
        if !fate.survives() {
            break;
        }
    }

    match fate {
        Fate::Survives => summary.survived += 1,
        Fate::Converted(_) => summary.converted += 1,
        Fate::Absorbed(_) => summary.absorbed += 1,
    }
    summary.vertices += event.n_vertices();
    summary.tracks += event.n_tracks();

    for interaction in effects.interaction_log().events() {
        *summary
            .processes
            .entry(interaction.interaction_type())
            .or_default() += 1;
    }
    effects.clear_interaction_log();

    log::debug!("event {}: {} ({})", event.id(), fate, track);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.energy <= 0.0 {
        bail!("energy must be positive, got {}", args.energy);
    }

    let config = MaterialEffectsConfig::from_json_file(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let geometry = fs::read_to_string(&args.geometry)
        .with_context(|| format!("reading {}", args.geometry.display()))?;
    let layers: Vec<PlacedLayer> = serde_json::from_str(&geometry)
        .with_context(|| format!("parsing {}", args.geometry.display()))?;
    log::info!("{} layers from {}", layers.len(), args.geometry.display());

    let shared = rng::shared(args.seed);
    let mut effects = MaterialEffects::new(&config, shared.clone())?;

    let mut summary = Summary::default();
    for _ in 0..args.events {
        shoot(&mut effects, &layers, &shared, &args, &mut summary)?;
    }
    effects.save().context("saving simulator state")?;

    println!("events:        {}", args.events);
    println!("survived:      {}", summary.survived);
    println!("converted:     {}", summary.converted);
    println!("absorbed:      {}", summary.absorbed);
    println!("vertices:      {}", summary.vertices);
    println!("tracks:        {}", summary.tracks);
    if summary.crossings > 0 {
        println!(
            "mean dE/layer: {:.6} GeV",
            summary.energy_loss / summary.crossings as f64
        );
    }
    for (process, count) in &summary.processes {
        println!("  {:<20} {}", process, count);
    }
    Ok(())
}
