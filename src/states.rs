use bevy::prelude::*;

/// Mirrors whether the [`SimulationClock`](crate::physics::SimulationClock)
/// is ticking, so systems can be gated with `in_state`
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Running,
    Paused,
}

impl AppState {
    pub fn for_clock(running: bool) -> Self {
        if running {
            AppState::Running
        } else {
            AppState::Paused
        }
    }
}
