//! Atomlife library
//!
//! This provides the particle engine and the Bevy front end of atomlife as a
//! library to enable integration testing and benchmarks.

pub mod cli;
pub mod config;
pub mod events;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod resources;
pub mod states;
pub mod utils;

// Test utilities are public for integration tests
pub mod test_utils;

// Re-export commonly used items
pub use config::SimulationConfig;
pub use events::SimulationCommand;
pub use physics::{
    Engine, ParticleSet, Rule, RuleMatrix, SimulationClock, Snapshot,
    math::{Dimensions, Scalar, Vector},
};
pub use plugins::{
    camera::CameraPlugin, controls::ControlsPlugin, simulation::SimulationPlugin,
    trails::TrailsPlugin, visualization::VisualizationPlugin,
};
pub use states::AppState;
