//! One tick of the particle simulation
//!
//! The engine owns the live [`ParticleSet`] and the [`RuleMatrix`] in force,
//! and advances both through the force, integration, boundary and collision
//! phases. It has no notion of running or paused; that gating belongs to
//! [`SimulationClock`](crate::physics::clock::SimulationClock).

use crate::config::PhysicsConfig;
use crate::physics::boundary::{BoundaryPolicy, ReflectingWalls};
use crate::physics::collisions::CollisionResolver;
use crate::physics::forces::ForceModel;
use crate::physics::integrators::{Integrator, ViscousBlend};
use crate::physics::math::{Scalar, Vector};
use crate::physics::particles::{ParticleSet, ParticleType};
use crate::physics::rules::{RuleError, RuleMatrix};
use crate::physics::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// Order in which forces are read and particles are moved within a tick
#[derive(
    Serialize, Deserialize, clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum TickOrdering {
    /// Forces for every type pair are read from one frozen set of positions,
    /// then every particle moves once
    #[default]
    Phased,
    /// Each wired type pair moves its source particles as soon as their force
    /// from the target group is known, so later pairs see already-moved
    /// particles. Pairs with a zero rule are not wired and never move anything.
    /// See [`interleaved_pairs`] for the visiting order.
    Interleaved,
}

/// Counters from one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Velocity components inverted at the walls
    pub reflections: usize,
    /// Particle pairs that exchanged velocity
    pub collisions: usize,
}

pub struct Engine {
    particles: ParticleSet,
    rules: RuleMatrix,
    force_model: ForceModel,
    integrator: Box<dyn Integrator>,
    boundary: ReflectingWalls,
    collisions: CollisionResolver,
    ordering: TickOrdering,
    /// Per-particle accumulator for the phased read phase
    forces: Vec<Vector>,
    tick: u64,
}

impl Engine {
    /// Builds an engine over `particles` using the rules and tunables of `config`
    pub fn new(config: &PhysicsConfig, particles: ParticleSet) -> Result<Self, RuleError> {
        Self::with_rules(config, config.rules.clone(), particles)
    }

    /// Builds an engine whose rules differ from the ones in `config`
    pub fn with_rules(
        config: &PhysicsConfig,
        rules: RuleMatrix,
        particles: ParticleSet,
    ) -> Result<Self, RuleError> {
        check_type_count(&rules, &particles)?;

        let mut engine = Self {
            boundary: ReflectingWalls::new(config.extent_vector(), particles.dimensions()),
            forces: Vec::with_capacity(particles.len()),
            particles,
            rules,
            force_model: ForceModel::default(),
            integrator: Box::new(ViscousBlend::default()),
            collisions: CollisionResolver::default(),
            ordering: config.ordering,
            tick: 0,
        };
        engine.apply_settings(config);
        Ok(engine)
    }

    /// Applies every tunable that can change without a restart.
    ///
    /// Particle counts, type count, dimensionality and the rule matrix are
    /// left alone.
    pub fn apply_settings(&mut self, config: &PhysicsConfig) {
        self.force_model = ForceModel::new(config.cutoff_radius)
            .with_min_distance(config.min_distance)
            .with_same_type_repulsion_suppressed(config.suppress_same_type_repulsion);
        self.integrator = Box::new(ViscousBlend::new(config.viscosity, config.speed));
        self.boundary = ReflectingWalls::new(
            self.particles.dimensions().project(Vector::from_array(config.extent)),
            self.particles.dimensions(),
        );
        self.collisions = CollisionResolver::new(config.collision_radius);
        self.ordering = config.ordering;
    }

    /// Replaces the rule matrix; takes effect on the next tick
    pub fn set_rules(&mut self, rules: RuleMatrix) -> Result<(), RuleError> {
        check_type_count(&rules, &self.particles)?;
        self.rules = rules;
        Ok(())
    }

    pub fn set_integrator(&mut self, integrator: Box<dyn Integrator>) {
        self.integrator = integrator;
    }

    /// Resumes the tick counter from a saved point
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    #[inline]
    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    #[inline]
    pub fn rules(&self) -> &RuleMatrix {
        &self.rules
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn ordering(&self) -> TickOrdering {
        self.ordering
    }

    pub fn integrator_name(&self) -> &'static str {
        self.integrator.name()
    }

    pub fn kinetic_energy(&self) -> Scalar {
        self.particles.kinetic_energy()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.tick, &self.particles)
    }

    /// Advances every particle by one tick
    pub fn tick(&mut self) -> TickStats {
        let reflections = match self.ordering {
            TickOrdering::Phased => self.tick_phased(),
            TickOrdering::Interleaved => self.tick_interleaved(),
        };
        let collisions = self.collisions.resolve(self.particles.as_mut_slice());

        self.tick += 1;
        TickStats {
            reflections,
            collisions,
        }
    }

    fn tick_phased(&mut self) -> usize {
        let type_count = self.particles.type_count();

        self.forces.clear();
        self.forces.resize(self.particles.len(), Vector::ZERO);

        for source in ParticleType::all(type_count) {
            let group = self.particles.group(source);
            let sources = &self.particles.as_slice()[group.clone()];
            let forces = &mut self.forces[group];

            for target in ParticleType::all(type_count) {
                self.force_model.accumulate(
                    sources,
                    self.particles.particles_of_type(target),
                    self.rules.get(source, target),
                    source == target,
                    forces,
                );
            }
        }

        let particles = self.particles.as_mut_slice();
        for (particle, &force) in particles.iter_mut().zip(&self.forces) {
            particle.acceleration =
                self.integrator
                    .step(&mut particle.position, &mut particle.velocity, force);
        }

        self.boundary.apply_all(particles)
    }

    fn tick_interleaved(&mut self) -> usize {
        let mut reflections = 0;

        for (source, target) in interleaved_pairs(&self.rules) {
            let sources = self.particles.group(source);
            let targets = self.particles.group(target);
            let rule = self.rules.get(source, target);
            let particles = self.particles.as_mut_slice();

            for index in sources {
                let force = self.force_model.force_on(
                    particles[index].position,
                    &particles[targets.clone()],
                    rule,
                    source == target,
                );

                let particle = &mut particles[index];
                particle.acceleration =
                    self.integrator
                        .step(&mut particle.position, &mut particle.velocity, force);
                reflections += self.boundary.apply(particle);
            }
        }

        reflections
    }
}

/// Ordered `(source, target)` pairs visited by the interleaved tick.
///
/// Sources run from the highest type index down. Each source visits itself
/// first, then the other types from the highest index down. Pairs whose rule
/// is zero are skipped. With [`RuleMatrix::classic`] this is green, red, then
/// yellow, over the seven pairs the classic demo wires up.
pub fn interleaved_pairs(rules: &RuleMatrix) -> Vec<(ParticleType, ParticleType)> {
    let types: Vec<ParticleType> = (0..rules.type_count())
        .rev()
        .map(|index| ParticleType(index as u8))
        .collect();

    types
        .iter()
        .flat_map(|&source| {
            std::iter::once(source)
                .chain(types.iter().copied().filter(move |&target| target != source))
                .map(move |target| (source, target))
        })
        .filter(|&(source, target)| !rules.get(source, target).is_zero())
        .collect()
}

fn check_type_count(rules: &RuleMatrix, particles: &ParticleSet) -> Result<(), RuleError> {
    if rules.type_count() != particles.type_count() {
        return Err(RuleError::TypeCountMismatch {
            expected: particles.type_count(),
            found: rules.type_count(),
        });
    }
    Ok(())
}
