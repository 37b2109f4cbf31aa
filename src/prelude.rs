//! Atomlife prelude module
//!
//! This module re-exports the most commonly used types, traits, and functions
//! across the application to reduce import boilerplate.

// External crate re-exports
pub use bevy::prelude::*;
pub use rand::Rng;

// Internal re-exports - Config
pub use crate::config::SimulationConfig;

// Internal re-exports - Events
pub use crate::events::SimulationCommand;

// Internal re-exports - States
pub use crate::states::AppState;

// Internal re-exports - Physics
pub use crate::physics::math::{Dimensions, Scalar, Vector};

// Internal re-exports - Resources (most commonly used)
pub use crate::resources::{Palette, SharedRng, Simulation, StateFile};
