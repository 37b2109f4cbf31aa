//! Simulation configuration
//!
//! Loaded once at startup from a TOML file (or the per-user config file plus
//! `ATOMLIFE_*` environment variables), then edited live through
//! [`SimulationCommand`](crate::events::SimulationCommand)s. Every edit is
//! validated before it reaches the engine.

use crate::physics::collisions::DEFAULT_COLLISION_RADIUS;
use crate::physics::engine::TickOrdering;
use crate::physics::forces::DEFAULT_CUTOFF_RADIUS;
use crate::physics::math::{Dimensions, Scalar, Vector};
use crate::physics::rules::{RuleError, RuleMatrix};
use crate::utils::color::parse_palette;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const TYPE_COUNT_RANGE: RangeInclusive<usize> = 3..=6;
pub const PARTICLE_COUNT_RANGE: RangeInclusive<usize> = 50..=500;
pub const SPEED_RANGE: RangeInclusive<Scalar> = 0.1..=3.0;
/// Largest viscosity offered by interactive controls
pub const MAX_INTERACTIVE_VISCOSITY: Scalar = 0.99;
/// Positions kept per particle trail, in ticks
pub const TRAIL_LENGTH_RANGE: RangeInclusive<usize> = 2..=240;

const CONFIG_FILE_NAME: &str = "config.toml";
const ENVIRONMENT_PREFIX: &str = "ATOMLIFE";

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub rendering: RenderingConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Total particle count, split evenly across types
    pub particle_count: usize,
    pub type_count: usize,
    pub dimensions: Dimensions,
    /// Size of the simulation box per axis; the third entry is unused in 2D
    pub extent: [Scalar; 3],
    pub cutoff_radius: Scalar,
    pub min_distance: Scalar,
    pub collision_radius: Scalar,
    pub viscosity: Scalar,
    pub speed: Scalar,
    /// Largest initial velocity component; zero starts every particle at rest
    pub initial_speed: Scalar,
    pub ordering: TickOrdering,
    pub suppress_same_type_repulsion: bool,
    pub rules: RuleMatrix,
    pub initial_seed: Option<u64>,
    pub running: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            particle_count: 300,
            type_count: 3,
            dimensions: Dimensions::Two,
            extent: [800.0, 800.0, 800.0],
            cutoff_radius: DEFAULT_CUTOFF_RADIUS,
            min_distance: 0.0,
            collision_radius: DEFAULT_COLLISION_RADIUS,
            viscosity: 0.0,
            speed: 1.0,
            initial_speed: 0.0,
            ordering: TickOrdering::Phased,
            suppress_same_type_repulsion: false,
            rules: RuleMatrix::classic(),
            initial_seed: None,
            running: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RenderingConfig {
    /// One hex color per particle type
    pub palette: Vec<String>,
    pub particle_radius: f32,
    pub connect_lines: bool,
    pub show_bounds: bool,
    pub camera_radius_multiplier: f32,
    /// Simulation ticks per second when driven by the window
    pub tick_rate_hz: f64,
    /// Leave fading trails behind moving particles
    pub trails: bool,
    /// Number of past positions drawn per trail
    pub trail_length: usize,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            palette: [
                "#FFFF00", "#FF0000", "#00FF00", "#0000FF", "#FF00FF", "#00FFFF",
            ]
            .map(String::from)
            .to_vec(),
            particle_radius: 2.5,
            connect_lines: false,
            show_bounds: true,
            camera_radius_multiplier: 1.5,
            tick_rate_hz: 60.0,
            trails: false,
            trail_length: 30,
        }
    }
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    TypeCount(usize),
    ParticleCount(usize),
    Viscosity(Scalar),
    Speed(Scalar),
    CutoffRadius(Scalar),
    MinDistance(Scalar),
    CollisionRadius(Scalar),
    InitialSpeed(Scalar),
    Extent([Scalar; 3]),
    /// Rule matrix covers a different number of types than configured
    RuleTypeCount { rules: usize, types: usize },
    Rules(RuleError),
    Palette(String),
    TickRate(f64),
    TrailLength(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TypeCount(count) => write!(
                f,
                "type count {count} is outside {}..={}",
                TYPE_COUNT_RANGE.start(),
                TYPE_COUNT_RANGE.end()
            ),
            ConfigError::ParticleCount(count) => write!(
                f,
                "particle count {count} is outside {}..={}",
                PARTICLE_COUNT_RANGE.start(),
                PARTICLE_COUNT_RANGE.end()
            ),
            ConfigError::Viscosity(v) => write!(f, "viscosity {v} is outside [0, 1)"),
            ConfigError::Speed(s) => write!(
                f,
                "speed {s} is outside {}..={}",
                SPEED_RANGE.start(),
                SPEED_RANGE.end()
            ),
            ConfigError::CutoffRadius(r) => write!(f, "cutoff radius {r} must be positive"),
            ConfigError::MinDistance(d) => {
                write!(f, "minimum distance {d} must be non-negative and below the cutoff")
            }
            ConfigError::CollisionRadius(r) => {
                write!(f, "collision radius {r} must be non-negative")
            }
            ConfigError::InitialSpeed(s) => write!(f, "initial speed {s} must be non-negative"),
            ConfigError::Extent(extent) => {
                write!(f, "boundary extent {extent:?} must be positive on every axis")
            }
            ConfigError::RuleTypeCount { rules, types } => write!(
                f,
                "rule matrix covers {rules} types but {types} types are configured"
            ),
            ConfigError::Rules(err) => write!(f, "invalid rules: {err}"),
            ConfigError::Palette(msg) => write!(f, "invalid palette: {msg}"),
            ConfigError::TickRate(hz) => write!(f, "tick rate {hz} must be positive"),
            ConfigError::TrailLength(length) => write!(
                f,
                "trail length {length} is outside {}..={}",
                TRAIL_LENGTH_RANGE.start(),
                TRAIL_LENGTH_RANGE.end()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<RuleError> for ConfigError {
    fn from(err: RuleError) -> Self {
        ConfigError::Rules(err)
    }
}

fn is_finite_non_negative(value: Scalar) -> bool {
    value.is_finite() && value >= 0.0
}

impl PhysicsConfig {
    pub fn extent_vector(&self) -> Vector {
        self.dimensions.project(Vector::from_array(self.extent))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TYPE_COUNT_RANGE.contains(&self.type_count) {
            return Err(ConfigError::TypeCount(self.type_count));
        }
        if !PARTICLE_COUNT_RANGE.contains(&self.particle_count) {
            return Err(ConfigError::ParticleCount(self.particle_count));
        }
        if !(is_finite_non_negative(self.viscosity) && self.viscosity < 1.0) {
            return Err(ConfigError::Viscosity(self.viscosity));
        }
        if !SPEED_RANGE.contains(&self.speed) {
            return Err(ConfigError::Speed(self.speed));
        }
        if !(self.cutoff_radius.is_finite() && self.cutoff_radius > 0.0) {
            return Err(ConfigError::CutoffRadius(self.cutoff_radius));
        }
        if !(is_finite_non_negative(self.min_distance) && self.min_distance < self.cutoff_radius) {
            return Err(ConfigError::MinDistance(self.min_distance));
        }
        if !is_finite_non_negative(self.collision_radius) {
            return Err(ConfigError::CollisionRadius(self.collision_radius));
        }
        if !is_finite_non_negative(self.initial_speed) {
            return Err(ConfigError::InitialSpeed(self.initial_speed));
        }
        let active_extent = &self.extent[..self.dimensions.axes()];
        if !active_extent.iter().all(|e| e.is_finite() && *e > 0.0) {
            return Err(ConfigError::Extent(self.extent));
        }
        if self.rules.type_count() != self.type_count {
            return Err(ConfigError::RuleTypeCount {
                rules: self.rules.type_count(),
                types: self.type_count,
            });
        }
        Ok(())
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;

        let palette = parse_palette(&self.rendering.palette).map_err(ConfigError::Palette)?;
        if palette.len() < self.physics.type_count {
            return Err(ConfigError::Palette(format!(
                "{} colors for {} types",
                palette.len(),
                self.physics.type_count
            )));
        }
        if !(self.rendering.tick_rate_hz.is_finite() && self.rendering.tick_rate_hz > 0.0) {
            return Err(ConfigError::TickRate(self.rendering.tick_rate_hz));
        }
        if !TRAIL_LENGTH_RANGE.contains(&self.rendering.trail_length) {
            return Err(ConfigError::TrailLength(self.rendering.trail_length));
        }
        Ok(())
    }

    /// Load configuration from a file, falling back to defaults if the file doesn't exist
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse config file {}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("Config file {} not found. Using defaults.", path);
                Self::default()
            }
        }
    }

    /// Location of the per-user configuration file, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "atomlife")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load the per-user configuration layered under `ATOMLIFE_*` environment
    /// variables (`ATOMLIFE_PHYSICS__VISCOSITY=0.2`), falling back to defaults
    pub fn load_from_user_config() -> Self {
        let mut builder = ::config::Config::builder();
        if let Some(path) = Self::user_config_path() {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENVIRONMENT_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        match builder
            .build()
            .and_then(|layered| layered.try_deserialize::<Self>())
        {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load user configuration: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn save_to_user_config(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::user_config_path().ok_or("no configuration directory available")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::rules::RuleShape;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_counts_outside_limits_are_rejected() {
        let mut config = SimulationConfig::default();
        config.physics.type_count = 7;
        config.physics.rules = RuleMatrix::zeroed(7, RuleShape::Scalar);
        assert_eq!(config.validate(), Err(ConfigError::TypeCount(7)));

        let mut config = SimulationConfig::default();
        config.physics.particle_count = 49;
        assert_eq!(config.validate(), Err(ConfigError::ParticleCount(49)));

        config.physics.particle_count = 501;
        assert_eq!(config.validate(), Err(ConfigError::ParticleCount(501)));
    }

    #[test]
    fn test_rules_must_cover_configured_types() {
        let mut config = SimulationConfig::default();
        config.physics.type_count = 4;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RuleTypeCount { rules: 3, types: 4 })
        );

        config.physics.rules = config.physics.rules.resized(4);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_continuous_parameters_are_range_checked() {
        let mut physics = PhysicsConfig {
            viscosity: 1.0,
            ..PhysicsConfig::default()
        };
        assert_eq!(physics.validate(), Err(ConfigError::Viscosity(1.0)));

        physics.viscosity = 0.5;
        physics.speed = 3.5;
        assert_eq!(physics.validate(), Err(ConfigError::Speed(3.5)));

        physics.speed = 1.0;
        physics.cutoff_radius = 0.0;
        assert_eq!(physics.validate(), Err(ConfigError::CutoffRadius(0.0)));

        physics.cutoff_radius = 80.0;
        physics.extent = [800.0, -1.0, 800.0];
        assert!(matches!(physics.validate(), Err(ConfigError::Extent(_))));

        // Depth is unused in two dimensions
        physics.extent = [800.0, 800.0, 0.0];
        assert_eq!(physics.validate(), Ok(()));
    }

    #[test]
    fn test_palette_must_cover_every_type() {
        let mut config = SimulationConfig::default();
        config.rendering.palette.truncate(2);
        assert!(matches!(config.validate(), Err(ConfigError::Palette(_))));

        let mut config = SimulationConfig::default();
        config.rendering.palette[0] = "not a color".into();
        assert!(matches!(config.validate(), Err(ConfigError::Palette(_))));
    }

    #[test]
    fn test_trail_length_is_bounded() {
        let mut config = SimulationConfig::default();
        config.rendering.trail_length = 1;
        assert_eq!(config.validate(), Err(ConfigError::TrailLength(1)));

        config.rendering.trail_length = 240;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            [physics]
            viscosity = 0.3
            dimensions = "3d"
            ordering = "interleaved"
            "#,
        )
        .unwrap();

        assert_eq!(config.physics.viscosity, 0.3);
        assert_eq!(config.physics.dimensions, Dimensions::Three);
        assert_eq!(config.physics.ordering, TickOrdering::Interleaved);
        assert_eq!(config.physics.particle_count, 300);
        assert_eq!(config.rendering, RenderingConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SimulationConfig::default();
        config.physics.initial_seed = Some(42);
        config.physics.rules = RuleMatrix::classic().to_shape(RuleShape::Dual);

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SimulationConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let config = SimulationConfig::load_or_default("/nonexistent/atomlife.toml");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join("atomlife_config_test.toml");
        let mut config = SimulationConfig::default();
        config.physics.speed = 2.5;

        config.save(&path).unwrap();
        let loaded = SimulationConfig::load_or_default(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.physics.speed, 2.5);
    }
}
