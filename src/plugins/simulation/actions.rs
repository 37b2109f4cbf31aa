//! Action handlers for simulation commands
//!
//! This module contains handlers for SimulationCommand events: restart,
//! pause/resume, rule edits, configuration edits and saving the run.

use crate::config::{
    MAX_INTERACTIVE_VISCOSITY, PARTICLE_COUNT_RANGE, SPEED_RANGE, SimulationConfig,
    TYPE_COUNT_RANGE,
};
use crate::prelude::*;

pub fn handle_restart_simulation_event(
    mut commands_reader: EventReader<SimulationCommand>,
    mut simulation: ResMut<Simulation>,
    mut rng: ResMut<SharedRng>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for command in commands_reader.read() {
        if !matches!(command, SimulationCommand::Restart) {
            continue;
        }
        simulation.restart(&mut **rng);
        next_state.set(AppState::Running);
    }
}

pub fn handle_toggle_pause_simulation_event(
    mut commands_reader: EventReader<SimulationCommand>,
    mut simulation: ResMut<Simulation>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for command in commands_reader.read() {
        if !matches!(command, SimulationCommand::TogglePause) {
            continue;
        }
        let state = simulation.toggle();
        let running = state == crate::physics::ClockState::Running;
        next_state.set(AppState::for_clock(running));
        info!("Simulation {}", if running { "resumed" } else { "paused" });
    }
}

pub fn handle_rule_commands(
    mut commands_reader: EventReader<SimulationCommand>,
    mut simulation: ResMut<Simulation>,
    mut rng: ResMut<SharedRng>,
    mut config: ResMut<SimulationConfig>,
) {
    for command in commands_reader.read() {
        let result = match command {
            SimulationCommand::RandomizeRules => simulation.randomize_rules(&mut **rng),
            SimulationCommand::ToggleRuleShape => {
                let shape = simulation.config().rules.shape().toggled();
                let rules = simulation.config().rules.to_shape(shape);
                info!("Switched to {:?} rules", shape);
                simulation.set_rules(rules)
            }
            _ => continue,
        };

        match result {
            Ok(()) => config.physics.rules = simulation.config().rules.clone(),
            Err(err) => warn!("Rule change rejected: {}", err),
        }
    }
}

/// Applies an edit to a copy of the configuration and hands it to the clock
/// only if the whole configuration stays valid
fn apply_edit(
    config: &mut SimulationConfig,
    simulation: &mut Simulation,
    edit: impl FnOnce(&mut SimulationConfig),
) -> bool {
    let mut candidate = config.clone();
    edit(&mut candidate);

    if let Err(err) = candidate.validate() {
        warn!("Configuration change rejected: {}", err);
        return false;
    }
    if simulation.apply_config(candidate.physics.clone()).is_err() {
        return false;
    }
    *config = candidate;
    true
}

fn step_count(current: usize, delta: i32, range: &std::ops::RangeInclusive<usize>) -> usize {
    let stepped = current.saturating_add_signed(delta as isize);
    stepped.clamp(*range.start(), *range.end())
}

pub fn handle_config_edits(
    mut commands_reader: EventReader<SimulationCommand>,
    mut simulation: ResMut<Simulation>,
    mut config: ResMut<SimulationConfig>,
    mut palette: ResMut<Palette>,
    mut rng: ResMut<SharedRng>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for command in commands_reader.read() {
        match *command {
            SimulationCommand::AdjustSpeed(delta) => {
                if apply_edit(&mut config, &mut simulation, |c| {
                    c.physics.speed =
                        (c.physics.speed + delta).clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end());
                }) {
                    info!("Speed set to {:.2}", config.physics.speed);
                }
            }
            SimulationCommand::AdjustViscosity(delta) => {
                if apply_edit(&mut config, &mut simulation, |c| {
                    c.physics.viscosity =
                        (c.physics.viscosity + delta).clamp(0.0, MAX_INTERACTIVE_VISCOSITY);
                }) {
                    info!("Viscosity set to {:.2}", config.physics.viscosity);
                }
            }
            SimulationCommand::AdjustParticleCount(delta) => {
                if apply_edit(&mut config, &mut simulation, |c| {
                    c.physics.particle_count =
                        step_count(c.physics.particle_count, delta, &PARTICLE_COUNT_RANGE);
                }) {
                    info!(
                        "Particle count set to {} (applies on restart)",
                        config.physics.particle_count
                    );
                }
            }
            SimulationCommand::AdjustTypeCount(delta) => {
                if apply_edit(&mut config, &mut simulation, |c| {
                    c.physics.type_count =
                        step_count(c.physics.type_count, delta, &TYPE_COUNT_RANGE);
                    c.physics.rules = c.physics.rules.resized(c.physics.type_count);
                }) {
                    info!(
                        "Type count set to {} (applies on restart)",
                        config.physics.type_count
                    );
                }
            }
            SimulationCommand::ToggleDimensions => {
                if apply_edit(&mut config, &mut simulation, |c| {
                    c.physics.dimensions = c.physics.dimensions.toggled();
                }) {
                    simulation.restart(&mut **rng);
                    next_state.set(AppState::Running);
                }
            }
            _ => continue,
        }

        *palette = Palette::from_config(&config);
    }
}

pub fn handle_save_state_event(
    mut commands_reader: EventReader<SimulationCommand>,
    simulation: Res<Simulation>,
    state_file: Res<StateFile>,
) {
    for command in commands_reader.read() {
        if !matches!(command, SimulationCommand::SaveState) {
            continue;
        }
        let path = state_file.path();
        match simulation.save_state().save(&path) {
            Ok(()) => info!("Saved tick {} to {}", simulation.tick_count(), path.display()),
            Err(err) => error!("Failed to save state: {}", err),
        }
    }
}
