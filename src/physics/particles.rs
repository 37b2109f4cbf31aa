//! Particle state for one run of the simulation

use crate::config::PhysicsConfig;
use crate::physics::math::{self, Dimensions, Scalar, Vector};
use crate::physics::rules::RuleError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Identifier of a particle type, mapped 1:1 to a palette color
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ParticleType(pub u8);

impl ParticleType {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Every type of a run with `type_count` types, in order
    pub fn all(type_count: usize) -> impl Iterator<Item = ParticleType> + Clone {
        (0..type_count).map(|index| ParticleType(index as u8))
    }
}

/// One simulated body
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vector,
    pub velocity: Vector,
    /// Acceleration applied during the most recent tick
    pub acceleration: Vector,
    pub particle_type: ParticleType,
}

impl Particle {
    pub fn new(position: Vector, velocity: Vector, particle_type: ParticleType) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vector::ZERO,
            particle_type,
        }
    }

    #[inline]
    pub fn speed(&self) -> Scalar {
        self.velocity.length()
    }
}

/// Every particle of a run, grouped contiguously by type.
///
/// Groups never change after creation: no particle is ever re-typed, added or
/// removed. A restart replaces the whole set.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSet {
    dimensions: Dimensions,
    particles: Vec<Particle>,
    groups: Vec<Range<usize>>,
}

impl ParticleSet {
    /// Samples a fresh set from the configuration.
    ///
    /// The total count is split evenly by integer division; a remainder is
    /// dropped. Positions are uniform in the boundary box, velocities are
    /// zero unless `initial_speed` is positive.
    pub fn initialize<R: Rng + ?Sized>(config: &PhysicsConfig, rng: &mut R) -> Self {
        let type_count = config.type_count;
        let per_type = config.particle_count / type_count.max(1);
        let extent = config.extent_vector();

        let mut particles = Vec::with_capacity(per_type * type_count);
        let mut groups = Vec::with_capacity(type_count);

        for particle_type in ParticleType::all(type_count) {
            let start = particles.len();
            for _ in 0..per_type {
                let position = math::random_point_in_box(rng, extent, config.dimensions);
                let velocity =
                    math::random_velocity(rng, config.initial_speed, config.dimensions);
                particles.push(Particle::new(position, velocity, particle_type));
            }
            groups.push(start..particles.len());
        }

        Self {
            dimensions: config.dimensions,
            particles,
            groups,
        }
    }

    /// Builds a set from explicit particles, grouping them by type.
    ///
    /// Relative order within a type is preserved.
    pub fn from_particles(
        type_count: usize,
        dimensions: Dimensions,
        mut particles: Vec<Particle>,
    ) -> Result<Self, RuleError> {
        if let Some(stray) = particles
            .iter()
            .find(|particle| particle.particle_type.index() >= type_count)
        {
            return Err(RuleError::TypeOutOfRange {
                particle_type: stray.particle_type.index(),
                type_count,
            });
        }

        particles.sort_by_key(|particle| particle.particle_type);
        for particle in &mut particles {
            particle.position = dimensions.project(particle.position);
            particle.velocity = dimensions.project(particle.velocity);
        }

        let groups = ParticleType::all(type_count)
            .map(|particle_type| {
                let start = particles.partition_point(|p| p.particle_type < particle_type);
                let end = particles.partition_point(|p| p.particle_type <= particle_type);
                start..end
            })
            .collect();

        Ok(Self {
            dimensions,
            particles,
            groups,
        })
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[inline]
    pub fn type_count(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Index range of the particles of one type
    #[inline]
    pub fn group(&self, particle_type: ParticleType) -> Range<usize> {
        self.groups
            .get(particle_type.index())
            .cloned()
            .unwrap_or(0..0)
    }

    /// View of the particles of one type
    pub fn particles_of_type(&self, particle_type: ParticleType) -> &[Particle] {
        &self.particles[self.group(particle_type)]
    }

    /// Mutable view of the particles of one type
    pub fn particles_of_type_mut(&mut self, particle_type: ParticleType) -> &mut [Particle] {
        let group = self.group(particle_type);
        &mut self.particles[group]
    }

    pub fn counts_by_type(&self) -> Vec<usize> {
        self.groups.iter().map(|group| group.len()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Sum of squared speeds over every particle
    pub fn kinetic_energy(&self) -> Scalar {
        self.particles
            .iter()
            .map(|particle| particle.velocity.length_squared())
            .sum()
    }

    pub fn max_speed(&self) -> Scalar {
        self.particles
            .iter()
            .map(Particle::speed)
            .fold(0.0, Scalar::max)
    }
}

impl<'a> IntoIterator for &'a ParticleSet {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn test_initialize_partitions_evenly_and_drops_remainder() {
        let config = PhysicsConfig {
            particle_count: 200,
            type_count: 3,
            ..PhysicsConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let set = ParticleSet::initialize(&config, &mut rng);

        assert_eq!(set.len(), 198);
        assert_eq!(set.counts_by_type(), vec![66, 66, 66]);
        for particle_type in ParticleType::all(3) {
            assert!(
                set.particles_of_type(particle_type)
                    .iter()
                    .all(|p| p.particle_type == particle_type)
            );
        }
    }

    #[test]
    fn test_initialize_places_particles_inside_boundary() {
        let config = PhysicsConfig {
            dimensions: Dimensions::Three,
            extent: [300.0, 200.0, 100.0],
            ..PhysicsConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let set = ParticleSet::initialize(&config, &mut rng);

        for particle in &set {
            assert!((0.0..300.0).contains(&particle.position.x));
            assert!((0.0..200.0).contains(&particle.position.y));
            assert!((0.0..100.0).contains(&particle.position.z));
            assert_eq!(particle.velocity, Vector::ZERO);
        }
    }

    #[test]
    fn test_initial_speed_seeds_small_velocities() {
        let config = PhysicsConfig {
            initial_speed: 0.25,
            ..PhysicsConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let set = ParticleSet::initialize(&config, &mut rng);

        assert!(set.kinetic_energy() > 0.0);
        assert!(set.iter().all(|p| p.velocity.x.abs() <= 0.25 && p.velocity.z == 0.0));
    }

    #[test]
    fn test_type_views_mutate_underlying_particles() {
        let particles = vec![
            Particle::new(Vector::new(1.0, 1.0, 0.0), Vector::ZERO, ParticleType(1)),
            Particle::new(Vector::new(2.0, 2.0, 0.0), Vector::ZERO, ParticleType(0)),
            Particle::new(Vector::new(3.0, 3.0, 0.0), Vector::ZERO, ParticleType(1)),
        ];
        let mut set = ParticleSet::from_particles(3, Dimensions::Two, particles).unwrap();

        assert_eq!(set.counts_by_type(), vec![1, 2, 0]);
        assert_eq!(set.particles_of_type(ParticleType(1))[0].position.x, 1.0);
        assert_eq!(set.particles_of_type(ParticleType(1))[1].position.x, 3.0);

        set.particles_of_type_mut(ParticleType(1))[1].velocity = Vector::X;
        assert_eq!(set.as_slice()[2].velocity, Vector::X);
        assert!(set.particles_of_type(ParticleType(2)).is_empty());
    }

    #[test]
    fn test_from_particles_rejects_unknown_types() {
        let particles = vec![Particle::new(Vector::ZERO, Vector::ZERO, ParticleType(4))];
        assert!(ParticleSet::from_particles(3, Dimensions::Two, particles).is_err());
    }
}
