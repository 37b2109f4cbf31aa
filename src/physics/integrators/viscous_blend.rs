//! Damped velocity blend used by particle life
//!
//! Unlike the Euler family, the new velocity is the *average* of the old
//! velocity and the incoming acceleration rather than their sum:
//!
//! ```text
//! a      = f * (1 - viscosity)
//! v(t+1) = (v(t) + a) * 0.5
//! x(t+1) = x(t) + v(t+1) * speed
//! ```
//!
//! Halving every tick bounds particle speed without an explicit cap. With no
//! force a residual velocity decays as `v0 / 2^k` after `k` ticks. Replacing
//! the blend with additive integration changes the emergent behaviour
//! qualitatively.

use super::Integrator;
use crate::physics::math::{Scalar, Vector};

/// Blend factor applied to `velocity + acceleration` every tick
pub const VELOCITY_BLEND: Scalar = 0.5;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViscousBlend {
    /// Damping in `[0, 1)`; zero is frictionless
    pub viscosity: Scalar,
    /// Displacement multiplier; does not affect the velocity blend
    pub speed: Scalar,
}

impl Default for ViscousBlend {
    fn default() -> Self {
        Self {
            viscosity: 0.0,
            speed: 1.0,
        }
    }
}

impl ViscousBlend {
    pub fn new(viscosity: Scalar, speed: Scalar) -> Self {
        Self { viscosity, speed }
    }
}

impl Integrator for ViscousBlend {
    #[inline]
    fn step(&self, position: &mut Vector, velocity: &mut Vector, force: Vector) -> Vector {
        let acceleration = force * (1.0 - self.viscosity);
        *velocity = (*velocity + acceleration) * VELOCITY_BLEND;
        *position += *velocity * self.speed;
        acceleration
    }

    fn name(&self) -> &'static str {
        "viscous_blend"
    }
}
