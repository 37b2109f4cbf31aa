//! Simulation plugin - Self-contained plugin pattern
//!
//! This plugin owns the [`SimulationClock`] and drives it from `FixedUpdate`,
//! one tick per fixed step. It also applies every [`SimulationCommand`] that
//! changes the run: restart, pause, rule and configuration edits.

use crate::physics::{SavedState, SimulationClock};
use crate::prelude::*;

mod actions;
mod physics;

use actions::{
    handle_config_edits, handle_restart_simulation_event, handle_rule_commands,
    handle_save_state_event, handle_toggle_pause_simulation_event,
};
use bevy::ecs::schedule::{LogLevel, ScheduleBuildSettings};
use physics::{PhysicsSet, advance_simulation};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Commands,
    Visualization,
    Camera,
}

#[derive(Default)]
pub struct SimulationPlugin {
    resume: Option<SavedState>,
}

impl SimulationPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a saved run instead of a fresh particle set
    pub fn resuming(saved: SavedState) -> Self {
        Self {
            resume: Some(saved),
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let mut config = app
            .world()
            .get_resource::<SimulationConfig>()
            .cloned()
            .unwrap_or_else(SimulationConfig::load_from_user_config);

        if let Err(err) = config.validate() {
            error!("Invalid configuration ({}), using defaults", err);
            config = SimulationConfig::default();
        }

        match toml::to_string_pretty(&config) {
            Ok(toml_string) => {
                debug!("=== Current Configuration (TOML) ===\n{}", toml_string);
                debug!("=== End Configuration ===");
            }
            Err(e) => {
                error!("Failed to serialize configuration to TOML: {}", e);
            }
        }

        let mut rng = SharedRng::from_optional_seed(config.physics.initial_seed);
        match build_clock(&mut config, self.resume.clone(), &mut rng) {
            Some(clock) => {
                app.insert_state(AppState::for_clock(clock.is_running()));
                app.insert_resource(Simulation(clock));
            }
            None => {
                app.init_state::<AppState>();
            }
        }

        app.insert_resource(Time::<Fixed>::from_hz(config.rendering.tick_rate_hz));
        app.insert_resource(Palette::from_config(&config));
        app.insert_resource(config);
        app.insert_resource(rng);
        app.init_resource::<StateFile>();

        app.add_event::<SimulationCommand>();

        app.edit_schedule(FixedUpdate, |schedule| {
            schedule.set_build_settings(ScheduleBuildSettings {
                ambiguity_detection: LogLevel::Warn,
                ..default()
            });
        });

        app.configure_sets(
            FixedUpdate,
            PhysicsSet::Tick.run_if(resource_exists::<Simulation>),
        );

        app.configure_sets(
            Update,
            (
                SimulationSet::Input,
                SimulationSet::Commands.run_if(resource_exists::<Simulation>),
                SimulationSet::Visualization,
                SimulationSet::Camera,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            advance_simulation
                .in_set(PhysicsSet::Tick)
                .run_if(in_state(AppState::Running)),
        );

        app.add_systems(
            Update,
            (
                handle_restart_simulation_event,
                handle_toggle_pause_simulation_event,
                handle_rule_commands,
                handle_config_edits,
                handle_save_state_event,
            )
                .chain()
                .in_set(SimulationSet::Commands),
        );
    }
}

/// Resumes `resume` when given and valid, otherwise starts fresh from `config`
fn build_clock(
    config: &mut SimulationConfig,
    resume: Option<SavedState>,
    rng: &mut SharedRng,
) -> Option<SimulationClock> {
    if let Some(saved) = resume {
        let physics = saved.config.clone();
        match SimulationClock::from_saved(saved) {
            Ok(clock) => {
                info!("Resuming saved run at tick {}", clock.tick_count());
                config.physics = physics;
                return Some(clock);
            }
            Err(err) => warn!("Cannot resume saved run, starting fresh: {}", err),
        }
    }

    match SimulationClock::new(config.physics.clone(), &mut **rng) {
        Ok(clock) => Some(clock),
        Err(err) => {
            error!("Failed to start the simulation: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_app;

    #[test]
    fn test_plugin_uses_inserted_config() {
        let mut app = create_test_app();
        let mut config = SimulationConfig::default();
        config.physics.particle_count = 90;
        config.physics.initial_seed = Some(5);
        app.insert_resource(config);
        app.add_plugins(SimulationPlugin::new());
        app.update();

        let simulation = app.world().resource::<Simulation>();
        assert_eq!(simulation.particles().len(), 90);
        assert_eq!(
            *app.world().resource::<State<AppState>>().get(),
            AppState::Running
        );
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let mut app = create_test_app();
        let mut config = SimulationConfig::default();
        config.physics.particle_count = 10_000;
        app.insert_resource(config);
        app.add_plugins(SimulationPlugin::new());

        let simulation = app.world().resource::<Simulation>();
        assert_eq!(simulation.particles().len(), 300);
        assert_eq!(
            app.world()
                .resource::<SimulationConfig>()
                .physics
                .particle_count,
            300
        );
    }

    #[test]
    fn test_paused_config_starts_paused() {
        let mut app = create_test_app();
        let mut config = SimulationConfig::default();
        config.physics.running = false;
        app.insert_resource(config);
        app.add_plugins(SimulationPlugin::new());
        app.update();

        assert_eq!(
            *app.world().resource::<State<AppState>>().get(),
            AppState::Paused
        );
    }

    #[test]
    fn test_resuming_restores_saved_tick() {
        let mut rng = SharedRng::from_seed(1);
        let mut clock = SimulationClock::new(Default::default(), &mut *rng).unwrap();
        for _ in 0..3 {
            clock.tick();
        }

        let mut app = create_test_app();
        app.insert_resource(SimulationConfig::default());
        app.add_plugins(SimulationPlugin::resuming(clock.save_state()));

        let simulation = app.world().resource::<Simulation>();
        assert_eq!(simulation.tick_count(), 3);
        assert_eq!(simulation.latest_snapshot(), clock.latest_snapshot());
    }
}
