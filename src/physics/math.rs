use rand::Rng;
use serde::{Deserialize, Serialize};

/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// Vector type for positions, velocities, and forces.
///
/// Two-dimensional runs keep the `z` component at zero for their whole
/// lifetime, so one vector type serves both dimensionalities.
pub type Vector = bevy::math::DVec3;

/// Dimensionality of a run, fixed between restarts
#[derive(
    Serialize, Deserialize, clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash,
)]
pub enum Dimensions {
    #[default]
    #[serde(rename = "2d")]
    #[value(name = "2d")]
    Two,
    #[serde(rename = "3d")]
    #[value(name = "3d")]
    Three,
}

impl Dimensions {
    /// Number of axes that carry motion
    #[inline]
    pub fn axes(self) -> usize {
        match self {
            Dimensions::Two => 2,
            Dimensions::Three => 3,
        }
    }

    /// Zeroes every component outside the active axes
    #[inline]
    pub fn project(self, vector: Vector) -> Vector {
        match self {
            Dimensions::Two => Vector::new(vector.x, vector.y, 0.0),
            Dimensions::Three => vector,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Dimensions::Two => Dimensions::Three,
            Dimensions::Three => Dimensions::Two,
        }
    }
}

/// Euclidean distance between two points.
///
/// Uses `libm` so the result does not depend on the platform's `sqrt`.
#[inline]
pub fn distance(a: Vector, b: Vector) -> Scalar {
    libm::sqrt((a - b).length_squared())
}

/// Uniformly random point inside the box `[0, extent)` on every active axis
pub fn random_point_in_box<R: Rng + ?Sized>(
    rng: &mut R,
    extent: Vector,
    dimensions: Dimensions,
) -> Vector {
    let mut point = Vector::ZERO;
    for axis in 0..dimensions.axes() {
        point[axis] = rng.random::<Scalar>() * extent[axis];
    }
    point
}

/// Random vector with every active component uniform in `[-max, max]`
pub fn random_velocity<R: Rng + ?Sized>(
    rng: &mut R,
    max_component: Scalar,
    dimensions: Dimensions,
) -> Vector {
    if max_component <= 0.0 {
        return Vector::ZERO;
    }

    let mut velocity = Vector::ZERO;
    for axis in 0..dimensions.axes() {
        velocity[axis] = rng.random_range(-max_component..=max_component);
    }
    velocity
}
