//! Near-contact resolution between particles
//!
//! Every unordered pair closer than the collision radius exchanges velocity
//! with the one-dimensional elastic formula, applied independently per axis:
//!
//! ```text
//! v1' = ((m1 - m2) * v1 + 2 * m2 * v2) / (m1 + m2)
//! v2' = ((m2 - m1) * v2 + 2 * m1 * v1) / (m1 + m2)
//! ```
//!
//! Every particle has unit mass, so the formula reduces to swapping the two
//! velocity vectors component-wise. Direction of approach is ignored; a pair
//! that stays in contact swaps again on the next tick.

use crate::physics::math::{Scalar, Vector, distance};
use crate::physics::particles::Particle;

/// Default contact distance
pub const DEFAULT_COLLISION_RADIUS: Scalar = 5.0;

/// Mass assigned to every particle
pub const PARTICLE_MASS: Scalar = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionResolver {
    /// Pairs strictly closer than this collide; zero disables collisions
    pub radius: Scalar,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            radius: DEFAULT_COLLISION_RADIUS,
        }
    }
}

/// Post-collision velocities for a pair of bodies
#[inline]
pub fn elastic_exchange(
    v1: Vector,
    m1: Scalar,
    v2: Vector,
    m2: Scalar,
) -> (Vector, Vector) {
    let total_mass = m1 + m2;
    let v1_after = (v1 * (m1 - m2) + v2 * (2.0 * m2)) / total_mass;
    let v2_after = (v2 * (m2 - m1) + v1 * (2.0 * m1)) / total_mass;
    (v1_after, v2_after)
}

impl CollisionResolver {
    pub fn new(radius: Scalar) -> Self {
        Self { radius }
    }

    /// Resolves every colliding pair in index order, returning the number of
    /// pairs that collided
    pub fn resolve(&self, particles: &mut [Particle]) -> usize {
        if self.radius <= 0.0 {
            return 0;
        }

        let mut collisions = 0;
        for i in 0..particles.len() {
            let (head, tail) = particles.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                if distance(a.position, b.position) < self.radius {
                    let (va, vb) =
                        elastic_exchange(a.velocity, PARTICLE_MASS, b.velocity, PARTICLE_MASS);
                    a.velocity = va;
                    b.velocity = vb;
                    collisions += 1;
                }
            }
        }
        collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::particles::ParticleType;

    #[test]
    fn test_unit_mass_exchange_is_an_exact_swap() {
        let v1 = Vector::new(1.25, -3.5, 0.0);
        let v2 = Vector::new(-0.75, 2.0, 9.0);

        let (v1_after, v2_after) = elastic_exchange(v1, 1.0, v2, 1.0);

        assert_eq!(v1_after, v2);
        assert_eq!(v2_after, v1);
    }

    #[test]
    fn test_unequal_masses_conserve_momentum() {
        let v1 = Vector::new(2.0, 0.0, 0.0);
        let v2 = Vector::new(-1.0, 0.0, 0.0);

        let (v1_after, v2_after) = elastic_exchange(v1, 1.0, v2, 3.0);

        let before = v1 * 1.0 + v2 * 3.0;
        let after = v1_after * 1.0 + v2_after * 3.0;
        assert!((before - after).length() < 1e-12);
    }

    #[test]
    fn test_resolve_swaps_only_pairs_inside_radius() {
        let mut particles = vec![
            Particle::new(Vector::new(0.0, 0.0, 0.0), Vector::X, ParticleType(0)),
            Particle::new(Vector::new(3.0, 0.0, 0.0), Vector::Y, ParticleType(1)),
            Particle::new(Vector::new(50.0, 0.0, 0.0), Vector::Z, ParticleType(2)),
        ];

        let collisions = CollisionResolver::default().resolve(&mut particles);

        assert_eq!(collisions, 1);
        assert_eq!(particles[0].velocity, Vector::Y);
        assert_eq!(particles[1].velocity, Vector::X);
        assert_eq!(particles[2].velocity, Vector::Z);
    }

    #[test]
    fn test_radius_is_exclusive_and_zero_disables() {
        let mut particles = vec![
            Particle::new(Vector::ZERO, Vector::X, ParticleType(0)),
            Particle::new(Vector::new(5.0, 0.0, 0.0), Vector::Y, ParticleType(0)),
        ];

        assert_eq!(CollisionResolver::default().resolve(&mut particles), 0);
        assert_eq!(CollisionResolver::new(0.0).resolve(&mut particles), 0);
        assert_eq!(CollisionResolver::new(5.5).resolve(&mut particles), 1);
        assert_eq!(particles[0].velocity, Vector::Y);
    }
}
