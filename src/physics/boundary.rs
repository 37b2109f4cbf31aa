//! Walls of the simulation volume

use crate::physics::math::{Dimensions, Vector};
use crate::physics::particles::Particle;

/// How particles interact with the edges of the simulation volume
pub trait BoundaryPolicy: Send + Sync {
    /// Applies the policy to one particle, returning the number of axes on
    /// which it acted
    fn apply(&self, particle: &mut Particle) -> usize;

    fn apply_all(&self, particles: &mut [Particle]) -> usize {
        particles.iter_mut().map(|particle| self.apply(particle)).sum()
    }
}

/// Axis-aligned walls at `0` and `extent` on every active axis.
///
/// A particle touching or beyond a wall has that axis's velocity inverted.
/// Its position is left where it is, so it may sit outside the box for a
/// tick until the inverted velocity carries it back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReflectingWalls {
    pub extent: Vector,
    pub dimensions: Dimensions,
}

impl ReflectingWalls {
    pub fn new(extent: Vector, dimensions: Dimensions) -> Self {
        Self { extent, dimensions }
    }

    #[inline]
    pub fn is_inside(&self, position: Vector) -> bool {
        (0..self.dimensions.axes())
            .all(|axis| position[axis] > 0.0 && position[axis] < self.extent[axis])
    }
}

impl BoundaryPolicy for ReflectingWalls {
    #[inline]
    fn apply(&self, particle: &mut Particle) -> usize {
        let mut reflected = 0;
        for axis in 0..self.dimensions.axes() {
            let coordinate = particle.position[axis];
            if coordinate <= 0.0 || coordinate >= self.extent[axis] {
                particle.velocity[axis] *= -1.0;
                reflected += 1;
            }
        }
        reflected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::particles::ParticleType;

    fn walls() -> ReflectingWalls {
        ReflectingWalls::new(Vector::new(100.0, 50.0, 10.0), Dimensions::Two)
    }

    #[test]
    fn test_reflects_each_crossed_axis_once_without_clamping() {
        let mut particle = Particle::new(
            Vector::new(-1.5, 60.0, 0.0),
            Vector::new(-2.0, 3.0, 0.0),
            ParticleType(0),
        );

        assert_eq!(walls().apply(&mut particle), 2);
        assert_eq!(particle.velocity, Vector::new(2.0, -3.0, 0.0));
        assert_eq!(particle.position, Vector::new(-1.5, 60.0, 0.0));
    }

    #[test]
    fn test_walls_are_inclusive() {
        let mut on_wall = Particle::new(
            Vector::new(100.0, 25.0, 0.0),
            Vector::new(1.0, 1.0, 0.0),
            ParticleType(0),
        );
        assert_eq!(walls().apply(&mut on_wall), 1);
        assert_eq!(on_wall.velocity.x, -1.0);
        assert!(!walls().is_inside(on_wall.position));
    }

    #[test]
    fn test_inactive_axis_is_ignored_in_two_dimensions() {
        let mut particle = Particle::new(
            Vector::new(10.0, 10.0, 0.0),
            Vector::new(1.0, 1.0, 0.0),
            ParticleType(0),
        );
        assert_eq!(walls().apply(&mut particle), 0);
        assert!(walls().is_inside(particle.position));

        let walls_3d = ReflectingWalls::new(Vector::new(100.0, 50.0, 10.0), Dimensions::Three);
        assert_eq!(walls_3d.apply(&mut particle), 1);
    }

    #[test]
    fn test_apply_all_counts_reflections() {
        let mut particles = vec![
            Particle::new(Vector::new(-1.0, 10.0, 0.0), Vector::X, ParticleType(0)),
            Particle::new(Vector::new(10.0, 10.0, 0.0), Vector::X, ParticleType(1)),
        ];
        assert_eq!(walls().apply_all(&mut particles), 1);
        assert_eq!(particles[0].velocity, -Vector::X);
        assert_eq!(particles[1].velocity, Vector::X);
    }
}
