//! Centralized event definitions
//!
//! Every input method (keyboard today) is translated into a
//! [`SimulationCommand`]; the simulation and visualization plugins each react
//! to the commands they own.

use crate::physics::math::Scalar;
use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum SimulationCommand {
    Restart,
    TogglePause,
    RandomizeRules,
    /// Switch every rule between the scalar and the dual shape
    ToggleRuleShape,
    /// Switch between 2D and 3D; restarts the run
    ToggleDimensions,
    AdjustSpeed(Scalar),
    AdjustViscosity(Scalar),
    /// Change the total particle count, effective on the next restart
    AdjustParticleCount(i32),
    /// Change the number of types, effective on the next restart
    AdjustTypeCount(i32),
    ToggleConnectLines,
    ToggleBounds,
    /// Leave fading trails behind particles
    ToggleTrails,
    /// Shift every type to the next palette color
    CyclePalette,
    SaveState,
    Quit,
}
