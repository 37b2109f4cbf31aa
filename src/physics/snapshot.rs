//! What the outside world sees of the simulation
//!
//! Renderers never touch live particle state. After each tick the clock
//! publishes an immutable [`Snapshot`] and hands it to every registered
//! [`SnapshotObserver`]. [`SavedState`] is the persisted form used to resume
//! a run exactly.

use crate::config::{ConfigError, PhysicsConfig};
use crate::physics::math::{Dimensions, Scalar, Vector};
use crate::physics::particles::{Particle, ParticleSet, ParticleType};
use crate::physics::rules::{RuleError, RuleMatrix};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Drawable state of one particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapshotEntry {
    pub position: Vector,
    pub particle_type: ParticleType,
}

/// Positions and types of every particle at the end of a tick, in the
/// engine's particle order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub dimensions: Dimensions,
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn capture(tick: u64, particles: &ParticleSet) -> Self {
        Self {
            tick,
            dimensions: particles.dimensions(),
            entries: particles
                .iter()
                .map(|particle| SnapshotEntry {
                    position: particle.position,
                    particle_type: particle.particle_type,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SnapshotEntry> {
        self.entries.iter()
    }

    pub fn of_type(&self, particle_type: ParticleType) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.particle_type == particle_type)
    }
}

/// Receives each published snapshot, once per completed tick
pub trait SnapshotObserver: Send + Sync {
    fn present(&mut self, snapshot: &Snapshot);
}

impl<F> SnapshotObserver for F
where
    F: FnMut(&Snapshot) + Send + Sync,
{
    fn present(&mut self, snapshot: &Snapshot) {
        (*self)(snapshot)
    }
}

/// Errors while saving or restoring a [`SavedState`]
#[derive(Debug)]
pub enum StateError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Config(ConfigError),
    Rules(RuleError),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Io(err) => write!(f, "state file error: {err}"),
            StateError::Parse(err) => write!(f, "failed to parse saved state: {err}"),
            StateError::Serialize(err) => write!(f, "failed to serialize state: {err}"),
            StateError::Config(err) => write!(f, "saved configuration is invalid: {err}"),
            StateError::Rules(err) => write!(f, "saved particles do not match the rules: {err}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Io(err) => Some(err),
            StateError::Parse(err) => Some(err),
            StateError::Serialize(err) => Some(err),
            StateError::Config(err) => Some(err),
            StateError::Rules(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StateError {
    fn from(err: std::io::Error) -> Self {
        StateError::Io(err)
    }
}

impl From<toml::de::Error> for StateError {
    fn from(err: toml::de::Error) -> Self {
        StateError::Parse(err)
    }
}

impl From<toml::ser::Error> for StateError {
    fn from(err: toml::ser::Error) -> Self {
        StateError::Serialize(err)
    }
}

impl From<ConfigError> for StateError {
    fn from(err: ConfigError) -> Self {
        StateError::Config(err)
    }
}

impl From<RuleError> for StateError {
    fn from(err: RuleError) -> Self {
        StateError::Rules(err)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SavedParticle {
    pub particle_type: ParticleType,
    pub position: [Scalar; 3],
    pub velocity: [Scalar; 3],
}

impl From<&Particle> for SavedParticle {
    fn from(particle: &Particle) -> Self {
        Self {
            particle_type: particle.particle_type,
            position: particle.position.to_array(),
            velocity: particle.velocity.to_array(),
        }
    }
}

impl From<SavedParticle> for Particle {
    fn from(saved: SavedParticle) -> Self {
        Particle::new(
            Vector::from_array(saved.position),
            Vector::from_array(saved.velocity),
            saved.particle_type,
        )
    }
}

/// Everything needed to resume a run where it stopped.
///
/// `rules` and `dimensions` describe the live particle set, which can differ
/// from `config` when edits are waiting for a restart.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SavedState {
    pub tick: u64,
    pub dimensions: Dimensions,
    pub rules: RuleMatrix,
    pub config: PhysicsConfig,
    pub particles: Vec<SavedParticle>,
}

impl SavedState {
    pub fn capture(
        tick: u64,
        config: &PhysicsConfig,
        rules: &RuleMatrix,
        particles: &ParticleSet,
    ) -> Self {
        Self {
            tick,
            dimensions: particles.dimensions(),
            rules: rules.clone(),
            config: config.clone(),
            particles: particles.iter().map(SavedParticle::from).collect(),
        }
    }

    /// Rebuilds the particle set, checking every type against the rules
    pub fn particle_set(&self) -> Result<ParticleSet, RuleError> {
        ParticleSet::from_particles(
            self.rules.type_count(),
            self.dimensions,
            self.particles.iter().copied().map(Particle::from).collect(),
        )
    }

    pub fn to_toml(&self) -> Result<String, StateError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(text: &str) -> Result<Self, StateError> {
        let state: Self = toml::from_str(text)?;
        state.config.validate()?;
        Ok(state)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    fn sample_set() -> ParticleSet {
        let config = PhysicsConfig {
            particle_count: 60,
            initial_speed: 0.5,
            ..PhysicsConfig::default()
        };
        ParticleSet::initialize(&config, &mut ChaCha8Rng::seed_from_u64(9))
    }

    #[test]
    fn test_capture_preserves_order_and_types() {
        let set = sample_set();
        let snapshot = Snapshot::capture(12, &set);

        assert_eq!(snapshot.tick, 12);
        assert_eq!(snapshot.len(), set.len());
        for (entry, particle) in snapshot.iter().zip(&set) {
            assert_eq!(entry.position, particle.position);
            assert_eq!(entry.particle_type, particle.particle_type);
        }
        assert_eq!(snapshot.of_type(ParticleType(2)).count(), 20);
    }

    #[test]
    fn test_closure_observer_receives_snapshot() {
        let mut seen = Vec::new();
        {
            let mut observer = |snapshot: &Snapshot| seen.push(snapshot.tick);
            observer.present(&Snapshot::default());
        }
        assert_eq!(seen, vec![0]);
    }

    #[test]
    fn test_saved_state_restores_exact_particles() {
        let set = sample_set();
        let config = PhysicsConfig::default();
        let state = SavedState::capture(40, &config, &config.rules, &set);

        let text = state.to_toml().unwrap();
        let restored = SavedState::from_toml(&text).unwrap();

        assert_eq!(restored, state);
        assert_eq!(restored.particle_set().unwrap(), set);
    }

    #[test]
    fn test_saved_state_rejects_invalid_config() {
        let set = sample_set();
        let config = PhysicsConfig::default();
        let mut state = SavedState::capture(0, &config, &config.rules, &set);
        state.config.viscosity = 2.0;

        let text = state.to_toml().unwrap();
        assert!(matches!(
            SavedState::from_toml(&text),
            Err(StateError::Config(ConfigError::Viscosity(_)))
        ));
    }

    #[test]
    fn test_saved_particles_must_match_rules() {
        let set = sample_set();
        let config = PhysicsConfig::default();
        let mut state = SavedState::capture(0, &config, &config.rules, &set);
        state.particles[0].particle_type = ParticleType(5);

        assert!(matches!(
            state.particle_set(),
            Err(RuleError::TypeOutOfRange { .. })
        ));
    }
}
