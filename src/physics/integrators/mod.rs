//! Integration of accumulated force into motion
//!
//! One tick is the unit of time; there is no time step variable.

use crate::physics::math::Vector;

pub mod viscous_blend;

pub use viscous_blend::ViscousBlend;

/// Base trait for all integrators
pub trait Integrator: Send + Sync {
    /// Advance a single particle by one tick
    ///
    /// # Arguments
    /// * `position` - Mutable reference to position
    /// * `velocity` - Mutable reference to velocity vector
    /// * `force` - Net force accumulated for this tick
    ///
    /// Returns the acceleration that was applied.
    fn step(&self, position: &mut Vector, velocity: &mut Vector, force: Vector) -> Vector;

    /// Get the name of this integrator
    fn name(&self) -> &'static str;
}
