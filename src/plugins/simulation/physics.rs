use crate::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    Tick,
}

/// Advances the clock by one tick per fixed step.
///
/// The clock publishes a fresh snapshot after the tick; drawing systems in
/// `Update` only ever read that snapshot.
pub fn advance_simulation(mut simulation: ResMut<Simulation>) {
    if let Some(stats) = simulation.tick() {
        if stats.collisions > 0 {
            trace!(
                "Tick {}: {} collisions, {} reflections",
                simulation.tick_count(),
                stats.collisions,
                stats.reflections
            );
        }
    }
}
