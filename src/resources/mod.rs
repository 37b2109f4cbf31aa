use crate::physics::SimulationClock;
use crate::prelude::*;
use crate::utils::color::parse_palette;
use chrono::Local;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};
use std::path::PathBuf;

/// ChaCha stream used for rule coefficients drawn before the run starts
const RULES_STREAM: u64 = 1;

#[derive(Resource, Deref, DerefMut, Debug, Clone, PartialEq)]
pub struct SharedRng(pub ChaCha8Rng);

impl SharedRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::default(),
        }
    }

    /// Generator for startup rule randomization.
    ///
    /// Same seed as particle placement, separate stream, so the rules do not
    /// repeat the numbers that place the particles.
    pub fn for_rules(seed: Option<u64>) -> Self {
        let mut rng = Self::from_optional_seed(seed);
        rng.set_stream(RULES_STREAM);
        rng
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_rng(&mut rand::rng()))
    }
}

/// The running engine and its lifecycle
#[derive(Resource, Deref, DerefMut)]
pub struct Simulation(pub SimulationClock);

/// Parsed display color for each particle type
#[derive(Resource, Deref, DerefMut, Debug, Clone, Default, PartialEq)]
pub struct Palette(pub Vec<Color>);

impl Palette {
    /// Parses the configured palette, keeping white for unreadable entries
    pub fn from_config(config: &SimulationConfig) -> Self {
        match parse_palette(&config.rendering.palette) {
            Ok(colors) => Self(colors),
            Err(err) => {
                warn!("Invalid palette, drawing particles in white: {}", err);
                Self(vec![Color::WHITE; config.physics.type_count])
            }
        }
    }
}

/// Where [`SimulationCommand::SaveState`] writes the current run
///
/// Without a fixed path every save gets its own timestamped file in the
/// working directory.
#[derive(Resource, Deref, DerefMut, Debug, Clone, Default, PartialEq)]
pub struct StateFile(pub Option<PathBuf>);

impl StateFile {
    pub fn path(&self) -> PathBuf {
        match &self.0 {
            Some(path) => path.clone(),
            None => {
                let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S%.3f");
                PathBuf::from(format!("atomlife-state-{timestamp}.toml"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_rng_deterministic_with_seed() {
        let mut rng1 = SharedRng::from_seed(12345);
        let mut rng2 = SharedRng::from_seed(12345);

        let values1: Vec<f64> = (0..10).map(|_| rng1.random_range(0.0..1.0)).collect();
        let values2: Vec<f64> = (0..10).map(|_| rng2.random_range(0.0..1.0)).collect();

        assert_eq!(values1, values2);
    }

    #[test]
    fn test_shared_rng_from_optional_seed() {
        let mut seeded = SharedRng::from_optional_seed(Some(54321));
        let mut same = SharedRng::from_seed(54321);

        let value1: f64 = seeded.random_range(0.0..1.0);
        let value2: f64 = same.random_range(0.0..1.0);
        assert_eq!(value1, value2);
    }

    #[test]
    fn test_rules_rng_is_seeded_but_independent() {
        let mut placement = SharedRng::from_seed(77);
        let mut rules = SharedRng::for_rules(Some(77));
        let mut rules_again = SharedRng::for_rules(Some(77));

        let placed: Vec<u64> = (0..4).map(|_| placement.random()).collect();
        let drawn: Vec<u64> = (0..4).map(|_| rules.random()).collect();
        let redrawn: Vec<u64> = (0..4).map(|_| rules_again.random()).collect();

        assert_ne!(placed, drawn);
        assert_eq!(drawn, redrawn);
    }

    #[test]
    fn test_palette_from_default_config() {
        let palette = Palette::from_config(&SimulationConfig::default());
        assert_eq!(palette.len(), 6);
        assert_eq!(palette[1], Color::from(Srgba::rgb(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_palette_falls_back_to_white() {
        let mut config = SimulationConfig::default();
        config.rendering.palette = vec!["nope".into()];
        let palette = Palette::from_config(&config);
        assert_eq!(*palette, vec![Color::WHITE; 3]);
    }

    #[test]
    fn test_state_file_paths() {
        let fixed = StateFile(Some(PathBuf::from("run.toml")));
        assert_eq!(fixed.path(), PathBuf::from("run.toml"));

        let stamped = StateFile::default().path();
        let name = stamped.to_string_lossy();
        assert!(name.starts_with("atomlife-state-"));
        assert!(name.ends_with(".toml"));
    }
}
