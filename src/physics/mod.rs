//! Particle interaction engine
//!
//! Everything in this module is plain Rust over [`ParticleSet`] and
//! [`RuleMatrix`]; the Bevy front end only drives a [`SimulationClock`] and
//! reads the snapshots it publishes.

pub mod boundary;
pub mod clock;
pub mod collisions;
pub mod engine;
pub mod forces;
pub mod integrators;
pub mod math;
pub mod particles;
pub mod rules;
pub mod snapshot;

pub use clock::{ClockState, SimulationClock};
pub use engine::{Engine, TickOrdering, TickStats, interleaved_pairs};
pub use particles::{Particle, ParticleSet, ParticleType};
pub use rules::{Rule, RuleError, RuleMatrix, RuleShape};
pub use snapshot::{SavedState, Snapshot, SnapshotObserver, StateError};
