//! Controls plugin - Self-contained plugin pattern
//!
//! This plugin translates keyboard input into SimulationCommand events. It is
//! the only configuration surface of the windowed app:
//!
//! | Key | Command |
//! |---|---|
//! | Space | play / pause |
//! | R | restart |
//! | N | randomize rules |
//! | M | switch scalar / dual rules |
//! | V | switch 2D / 3D (restarts) |
//! | `+` / `-` | speed |
//! | `]` / `[` | viscosity |
//! | Up / Down | particle count (on restart) |
//! | PageUp / PageDown | type count (on restart) |
//! | L | connect lines |
//! | B | show bounds |
//! | T | trails |
//! | C | cycle colors |
//! | S | save state |
//! | Escape / Q | quit |

use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;
use bevy::input::ButtonState;
use bevy::input::keyboard::KeyboardInput;

pub const SPEED_STEP: Scalar = 0.1;
pub const VISCOSITY_STEP: Scalar = 0.05;
pub const PARTICLE_COUNT_STEP: i32 = 25;

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (keyboard_input_handler, quit_handler)
                .chain()
                .in_set(SimulationSet::Input),
        );
    }
}

/// Command bound to a physical key, if any
pub fn command_for_key(key: KeyCode) -> Option<SimulationCommand> {
    let command = match key {
        KeyCode::Space => SimulationCommand::TogglePause,
        KeyCode::KeyR => SimulationCommand::Restart,
        KeyCode::KeyN => SimulationCommand::RandomizeRules,
        KeyCode::KeyM => SimulationCommand::ToggleRuleShape,
        KeyCode::KeyV => SimulationCommand::ToggleDimensions,
        KeyCode::Equal | KeyCode::NumpadAdd => SimulationCommand::AdjustSpeed(SPEED_STEP),
        KeyCode::Minus | KeyCode::NumpadSubtract => SimulationCommand::AdjustSpeed(-SPEED_STEP),
        KeyCode::BracketRight => SimulationCommand::AdjustViscosity(VISCOSITY_STEP),
        KeyCode::BracketLeft => SimulationCommand::AdjustViscosity(-VISCOSITY_STEP),
        KeyCode::ArrowUp => SimulationCommand::AdjustParticleCount(PARTICLE_COUNT_STEP),
        KeyCode::ArrowDown => SimulationCommand::AdjustParticleCount(-PARTICLE_COUNT_STEP),
        KeyCode::PageUp => SimulationCommand::AdjustTypeCount(1),
        KeyCode::PageDown => SimulationCommand::AdjustTypeCount(-1),
        KeyCode::KeyL => SimulationCommand::ToggleConnectLines,
        KeyCode::KeyB => SimulationCommand::ToggleBounds,
        KeyCode::KeyT => SimulationCommand::ToggleTrails,
        KeyCode::KeyC => SimulationCommand::CyclePalette,
        KeyCode::KeyS => SimulationCommand::SaveState,
        KeyCode::Escape | KeyCode::KeyQ => SimulationCommand::Quit,
        _ => return None,
    };
    Some(command)
}

fn keyboard_input_handler(
    mut keyboard_events: EventReader<KeyboardInput>,
    mut commands: EventWriter<SimulationCommand>,
) {
    for event in keyboard_events.read() {
        if event.state != ButtonState::Pressed || event.repeat {
            continue;
        }
        if let Some(command) = command_for_key(event.key_code) {
            commands.write(command);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn quit_handler(mut commands: EventReader<SimulationCommand>, mut exit: EventWriter<AppExit>) {
    if commands
        .read()
        .any(|command| matches!(command, SimulationCommand::Quit))
    {
        exit.write_default();
    }
}

#[cfg(target_arch = "wasm32")]
fn quit_handler(mut commands: EventReader<SimulationCommand>) {
    commands.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, send_key};
    use bevy::ecs::event::Events;

    fn controls_app() -> App {
        let mut app = create_test_app();
        app.add_event::<SimulationCommand>();
        app.add_plugins(ControlsPlugin);
        app
    }

    fn written_commands(app: &App) -> Vec<SimulationCommand> {
        let events = app.world().resource::<Events<SimulationCommand>>();
        events.iter_current_update_events().copied().collect()
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            command_for_key(KeyCode::Space),
            Some(SimulationCommand::TogglePause)
        );
        assert_eq!(
            command_for_key(KeyCode::BracketLeft),
            Some(SimulationCommand::AdjustViscosity(-VISCOSITY_STEP))
        );
        assert_eq!(
            command_for_key(KeyCode::PageUp),
            Some(SimulationCommand::AdjustTypeCount(1))
        );
        assert_eq!(
            command_for_key(KeyCode::KeyT),
            Some(SimulationCommand::ToggleTrails)
        );
        assert_eq!(command_for_key(KeyCode::KeyZ), None);
    }

    #[test]
    fn test_key_press_writes_command() {
        let mut app = controls_app();
        send_key(&mut app, KeyCode::KeyN);
        app.update();

        assert_eq!(
            written_commands(&app),
            vec![SimulationCommand::RandomizeRules]
        );
    }

    #[test]
    fn test_escape_requests_exit() {
        let mut app = controls_app();
        send_key(&mut app, KeyCode::Escape);
        app.update();

        let exits = app.world().resource::<Events<AppExit>>();
        assert!(!exits.is_empty());
    }
}
