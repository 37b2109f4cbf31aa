//! Camera plugin - Self-contained plugin pattern
//!
//! Spawns one orbit camera looking at the center of the simulation volume.
//! Two-dimensional runs are drawn in the XY plane, so the camera is reset to
//! face that plane whenever a run switches dimensionality.

use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;
use bevy_panorbit_camera::PanOrbitCameraPlugin;
use bevy_panorbit_camera::TouchControls;
use bevy_panorbit_camera::TrackpadBehavior;

/// Plugin that handles camera setup and control
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PanOrbitCameraPlugin);
        app.add_systems(Startup, spawn_camera);
        app.add_systems(
            Update,
            reset_camera_on_dimension_change.in_set(SimulationSet::Camera),
        );
    }
}

/// Orbit distance that fits the whole volume in view
fn camera_radius(config: &SimulationConfig) -> f32 {
    let [width, height, depth] = config.physics.extent;
    let span = match config.physics.dimensions {
        Dimensions::Two => width.max(height),
        Dimensions::Three => width.max(height).max(depth),
    };
    span as f32 * config.rendering.camera_radius_multiplier
}

fn spawn_camera(mut commands: Commands, config: Res<SimulationConfig>) {
    commands.spawn((
        Name::new("Main Camera"),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        Camera3d::default(),
        Msaa::Sample4,
        PanOrbitCamera {
            allow_upside_down: true,
            focus: Vec3::ZERO,
            pan_smoothness: 0.0,
            radius: Some(camera_radius(&config)),
            touch_enabled: true,
            touch_controls: TouchControls::OneFingerOrbit,
            trackpad_behavior: TrackpadBehavior::blender_default(),
            trackpad_pinch_to_zoom_enabled: true,
            ..default()
        },
    ));
}

fn reset_camera_on_dimension_change(
    config: Res<SimulationConfig>,
    mut last_dimensions: Local<Option<Dimensions>>,
    mut cameras: Query<&mut PanOrbitCamera>,
) {
    let dimensions = config.physics.dimensions;
    if last_dimensions.replace(dimensions) == Some(dimensions) {
        return;
    }

    for mut camera in &mut cameras {
        camera.target_focus = Vec3::ZERO;
        camera.target_yaw = 0.0;
        camera.target_pitch = 0.0;
        camera.target_radius = camera_radius(&config);
        camera.force_update = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_radius_uses_active_axes() {
        let mut config = SimulationConfig::default();
        config.physics.extent = [400.0, 300.0, 1000.0];
        config.rendering.camera_radius_multiplier = 2.0;
        assert_eq!(camera_radius(&config), 800.0);

        config.physics.dimensions = Dimensions::Three;
        assert_eq!(camera_radius(&config), 2000.0);
    }
}
