//! Command line interface for Atomlife

use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, SimulationConfig};
use crate::physics::engine::TickOrdering;
use crate::physics::math::{Dimensions, Scalar};
use crate::physics::{SavedState, SimulationClock, Snapshot, StateError};
use crate::resources::SharedRng;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

/// Ticks between progress lines in headless runs
const HEADLESS_PROGRESS_INTERVAL: u64 = 100;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded
    ConfigLoad(String),
    /// Configuration after overrides is out of range
    InvalidConfig(ConfigError),
    /// Saved state could not be read or written
    State(StateError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(msg) => write!(f, "Failed to load configuration: {msg}"),
            CliError::InvalidConfig(err) => write!(f, "Invalid configuration: {err}"),
            CliError::State(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<StateError> for CliError {
    fn from(err: StateError) -> Self {
        CliError::State(err)
    }
}

/// Atomlife - emergent patterns from typed attracting and repelling particles
#[derive(Parser, Debug, Default)]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Total number of particles, split evenly across types (overrides config file)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub particles: Option<usize>,

    /// Number of particle types (overrides config file)
    #[arg(short = 't', long, value_name = "COUNT")]
    pub types: Option<usize>,

    /// Simulate in two or three dimensions
    #[arg(short = 'd', long, value_name = "DIMENSIONS")]
    pub dimensions: Option<Dimensions>,

    /// Damping applied to force before it becomes acceleration, in [0, 1)
    #[arg(long, value_name = "VALUE")]
    pub viscosity: Option<Scalar>,

    /// Displacement multiplier per tick, in [0.1, 3]
    #[arg(long, value_name = "VALUE")]
    pub speed: Option<Scalar>,

    /// Random seed for particle placement and rule randomization
    #[arg(short = 's', long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Order in which forces are read and particles moved within a tick
    #[arg(long, value_name = "ORDERING")]
    pub ordering: Option<TickOrdering>,

    /// Replace the configured rules with random ones
    #[arg(short = 'r', long)]
    pub randomize_rules: bool,

    /// Start paused
    #[arg(short = 'p', long)]
    pub paused: bool,

    /// Resume from a saved state file
    #[arg(long, value_name = "FILE")]
    pub load_state: Option<PathBuf>,

    /// Where to save the state (after a headless run, or with the S key)
    #[arg(long, value_name = "FILE")]
    pub save_state: Option<PathBuf>,

    /// Run this many ticks without a window, print a summary and exit
    #[arg(long, value_name = "TICKS")]
    pub headless: Option<u64>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Loads configuration from file or defaults, then applies command-line overrides
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        if !Path::new(config_path).exists() {
            return Err(CliError::ConfigLoad(format!("{config_path} does not exist")));
        }
        println!("Loading configuration from: {config_path}");
        SimulationConfig::load_or_default(config_path)
    } else {
        SimulationConfig::load_from_user_config()
    };

    // Apply command-line overrides
    if let Some(particle_count) = args.particles {
        println!("Overriding particle count to: {particle_count}");
        config.physics.particle_count = particle_count;
    }

    if let Some(type_count) = args.types {
        println!("Overriding type count to: {type_count}");
        config.physics.type_count = type_count;
        config.physics.rules = config.physics.rules.resized(type_count);
    }

    if let Some(dimensions) = args.dimensions {
        println!("Simulating in {dimensions:?} dimensions");
        config.physics.dimensions = dimensions;
    }

    if let Some(viscosity) = args.viscosity {
        println!("Overriding viscosity to: {viscosity}");
        config.physics.viscosity = viscosity;
    }

    if let Some(speed) = args.speed {
        println!("Overriding speed to: {speed}");
        config.physics.speed = speed;
    }

    if let Some(seed) = args.seed {
        println!("Using random seed: {seed}");
        config.physics.initial_seed = Some(seed);
    }

    if let Some(ordering) = args.ordering {
        println!("Using tick ordering: {ordering:?}");
        config.physics.ordering = ordering;
    }

    if args.randomize_rules {
        let mut rng = SharedRng::for_rules(config.physics.initial_seed);
        config.physics.rules.randomize(&mut *rng);
        println!("Randomized rules for {} types", config.physics.type_count);
    }

    if args.paused {
        config.physics.running = false;
    }

    config.validate().map_err(CliError::InvalidConfig)?;
    Ok(config)
}

/// Reads the state file named by `--load-state`, if any
pub fn load_saved_state(args: &Args) -> Result<Option<SavedState>, CliError> {
    match &args.load_state {
        Some(path) => {
            println!("Resuming from: {}", path.display());
            Ok(Some(SavedState::load(path)?))
        }
        None => Ok(None),
    }
}

/// Outcome of a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSummary {
    pub ticks: u64,
    pub particles: usize,
    pub counts_by_type: Vec<usize>,
    pub kinetic_energy: Scalar,
    pub collisions: usize,
    pub reflections: usize,
}

impl fmt::Display for HeadlessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ticks:          {}", self.ticks)?;
        writeln!(f, "Particles:      {} {:?}", self.particles, self.counts_by_type)?;
        writeln!(f, "Kinetic energy: {:.6e}", self.kinetic_energy)?;
        writeln!(f, "Collisions:     {}", self.collisions)?;
        write!(f, "Reflections:    {}", self.reflections)
    }
}

/// Runs `ticks` ticks without a window, optionally saving the final state
pub fn run_headless(
    config: &SimulationConfig,
    ticks: u64,
    resume: Option<SavedState>,
    save_to: Option<&Path>,
) -> Result<HeadlessSummary, CliError> {
    let mut clock = match resume {
        Some(saved) => SimulationClock::from_saved(saved)?,
        None => {
            let mut rng = SharedRng::from_optional_seed(config.physics.initial_seed);
            SimulationClock::new(config.physics.clone(), &mut *rng)
                .map_err(CliError::InvalidConfig)?
        }
    };
    clock.play();
    clock.add_observer(|snapshot: &Snapshot| {
        if snapshot.tick % HEADLESS_PROGRESS_INTERVAL == 0 {
            bevy::log::debug!("Tick {}", snapshot.tick);
        }
    });

    let mut collisions = 0;
    let mut reflections = 0;
    for _ in 0..ticks {
        if let Some(stats) = clock.tick() {
            collisions += stats.collisions;
            reflections += stats.reflections;
        }
    }

    if let Some(path) = save_to {
        clock.save_state().save(path)?;
        println!("Saved state to: {}", path.display());
    }

    Ok(HeadlessSummary {
        ticks: clock.tick_count(),
        particles: clock.particles().len(),
        counts_by_type: clock.particles().counts_by_type(),
        kinetic_energy: clock.engine().kinetic_energy(),
        collisions,
        reflections,
    })
}
