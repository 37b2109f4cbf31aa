//! Running, stopping and restarting the simulation
//!
//! The clock wraps an [`Engine`] with a three-state lifecycle:
//!
//! - `Running`: every [`tick`](SimulationClock::tick) advances the engine
//! - `Stopped`: ticks are ignored and particle state is frozen
//! - `Restarting`: the particle set is being replaced; always followed by
//!   `Running`
//!
//! Configuration edits are validated before they are accepted. Rejected
//! edits leave the last valid configuration in place. Tunables apply on the
//! next tick; counts and dimensionality wait for the next restart.

use crate::config::{ConfigError, PhysicsConfig};
use crate::physics::engine::{Engine, TickStats};
use crate::physics::particles::{ParticleSet, ParticleType};
use crate::physics::rules::{Rule, RuleMatrix};
use crate::physics::snapshot::{SavedState, Snapshot, SnapshotObserver, StateError};
use bevy::log::{info, warn};
use rand::Rng;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockState {
    Stopped,
    #[default]
    Running,
    Restarting,
}

pub struct SimulationClock {
    state: ClockState,
    /// Last accepted configuration, including edits waiting for a restart
    config: PhysicsConfig,
    engine: Engine,
    latest: Arc<Snapshot>,
    observers: Vec<Box<dyn SnapshotObserver>>,
}

impl SimulationClock {
    /// Validates `config` and samples the first particle set from `rng`
    pub fn new<R: Rng + ?Sized>(config: PhysicsConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;

        let particles = ParticleSet::initialize(&config, rng);
        let engine = Engine::new(&config, particles)?;

        Ok(Self::from_engine(config, engine))
    }

    /// Resumes exactly where a saved run stopped
    pub fn from_saved(saved: SavedState) -> Result<Self, StateError> {
        saved.config.validate()?;

        let particles = saved.particle_set()?;
        let mut engine = Engine::with_rules(&saved.config, saved.rules, particles)?;
        engine.set_tick(saved.tick);

        Ok(Self::from_engine(saved.config, engine))
    }

    fn from_engine(config: PhysicsConfig, engine: Engine) -> Self {
        let state = if config.running {
            ClockState::Running
        } else {
            ClockState::Stopped
        };
        Self {
            state,
            latest: Arc::new(engine.snapshot()),
            config,
            engine,
            observers: Vec::new(),
        }
    }

    pub fn save_state(&self) -> SavedState {
        SavedState::capture(
            self.engine.tick_count(),
            &self.config,
            self.engine.rules(),
            self.engine.particles(),
        )
    }

    /// Registers an observer called after every completed tick
    pub fn add_observer(&mut self, observer: impl SnapshotObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[inline]
    pub fn state(&self) -> ClockState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn particles(&self) -> &ParticleSet {
        self.engine.particles()
    }

    /// Rules applied by the live engine
    pub fn rules(&self) -> &RuleMatrix {
        self.engine.rules()
    }

    pub fn tick_count(&self) -> u64 {
        self.engine.tick_count()
    }

    /// Most recently published snapshot
    pub fn latest_snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.latest)
    }

    /// Switches between `Running` and `Stopped`
    pub fn toggle(&mut self) -> ClockState {
        self.state = match self.state {
            ClockState::Running => ClockState::Stopped,
            ClockState::Stopped | ClockState::Restarting => ClockState::Running,
        };
        self.state
    }

    pub fn play(&mut self) {
        self.state = ClockState::Running;
    }

    pub fn pause(&mut self) {
        self.state = ClockState::Stopped;
    }

    /// Replaces the particle set from the current configuration and resumes
    /// running
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.state = ClockState::Restarting;

        let particles = ParticleSet::initialize(&self.config, rng);
        match Engine::new(&self.config, particles) {
            Ok(engine) => self.engine = engine,
            // Accepted configurations always carry rules for their type count
            Err(err) => warn!("Restart kept the previous particles: {}", err),
        }
        info!(
            "Restarted with {} particles of {} types in {:?}",
            self.engine.particles().len(),
            self.engine.particles().type_count(),
            self.engine.particles().dimensions()
        );

        self.publish();
        self.state = ClockState::Running;
    }

    /// Advances one tick unless stopped
    pub fn tick(&mut self) -> Option<TickStats> {
        if self.state != ClockState::Running {
            return None;
        }

        let stats = self.engine.tick();
        self.publish();
        Some(stats)
    }

    fn publish(&mut self) {
        let snapshot = Arc::new(self.engine.snapshot());
        for observer in &mut self.observers {
            observer.present(&snapshot);
        }
        self.latest = snapshot;
    }

    /// Accepts a new configuration if it is valid.
    ///
    /// Tunables take effect on the next tick. The rule matrix is applied now
    /// when it covers the live type count, otherwise with the next restart, as
    /// are particle count, type count and dimensionality.
    pub fn apply_config(&mut self, config: PhysicsConfig) -> Result<(), ConfigError> {
        if let Err(err) = config.validate() {
            warn!("Rejected configuration: {}", err);
            return Err(err);
        }

        self.engine.apply_settings(&config);
        if config.rules.type_count() == self.engine.particles().type_count() {
            self.engine.set_rules(config.rules.clone())?;
        }
        self.config = config;
        Ok(())
    }

    /// Whether accepted edits are waiting for a restart
    pub fn restart_pending(&self) -> bool {
        let live = self.engine.particles();
        let per_type = self.config.particle_count / self.config.type_count.max(1);

        self.config.type_count != live.type_count()
            || self.config.dimensions != live.dimensions()
            || live.counts_by_type().iter().any(|&count| count != per_type)
    }

    /// Replaces the whole rule matrix
    pub fn set_rules(&mut self, rules: RuleMatrix) -> Result<(), ConfigError> {
        let config = PhysicsConfig {
            rules,
            ..self.config.clone()
        };
        self.apply_config(config)
    }

    /// Replaces the rule for one ordered type pair
    pub fn set_rule(
        &mut self,
        source: ParticleType,
        target: ParticleType,
        rule: Rule,
    ) -> Result<(), ConfigError> {
        let mut rules = self.config.rules.clone();
        rules.set(source, target, rule)?;
        self.set_rules(rules)
    }

    /// Redraws every rule coefficient from `rng`
    pub fn randomize_rules<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), ConfigError> {
        let mut rules = self.config.rules.clone();
        rules.randomize(rng);
        self.set_rules(rules)?;
        info!("Randomized rules for {} types", self.config.rules.type_count());
        Ok(())
    }
}
