//! Visualization plugin - Self-contained plugin pattern
//!
//! Draws the latest published snapshot with gizmos: one circle (2D) or
//! sphere (3D) per particle in its type's color, optional same-type connect
//! lines and the walls of the simulation volume. Drawing only reads the
//! snapshot, never the live particle set.

use crate::physics::Snapshot;
use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;
use crate::utils::color::color_for_type;

pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK));
        app.init_resource::<Palette>();

        app.add_systems(
            Update,
            (
                handle_visualization_commands,
                (
                    draw_particles,
                    draw_connect_lines.run_if(connect_lines_enabled),
                    draw_bounds.run_if(bounds_enabled),
                )
                    .run_if(resource_exists::<Simulation>),
            )
                .chain()
                .in_set(SimulationSet::Visualization),
        );
    }
}

fn connect_lines_enabled(config: Res<SimulationConfig>) -> bool {
    config.rendering.connect_lines
}

fn bounds_enabled(config: Res<SimulationConfig>) -> bool {
    config.rendering.show_bounds
}

/// Handles SimulationCommand events for rendering-only settings
fn handle_visualization_commands(
    mut commands: EventReader<SimulationCommand>,
    mut config: ResMut<SimulationConfig>,
    mut palette: ResMut<Palette>,
) {
    for command in commands.read() {
        match command {
            SimulationCommand::ToggleConnectLines => {
                config.rendering.connect_lines = !config.rendering.connect_lines;
                info!(
                    "Connect lines {}",
                    if config.rendering.connect_lines {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
            }
            SimulationCommand::ToggleBounds => {
                config.rendering.show_bounds = !config.rendering.show_bounds;
            }
            SimulationCommand::ToggleTrails => {
                config.rendering.trails = !config.rendering.trails;
            }
            SimulationCommand::CyclePalette => {
                config.rendering.palette.rotate_left(1);
                *palette = Palette::from_config(&config);
                debug!("Palette is now {:?}", config.rendering.palette);
            }
            _ => {} // Ignore other commands
        }
    }
}

/// Offset that centers the simulation volume on the world origin
pub(crate) fn world_offset(simulation: &Simulation, snapshot: &Snapshot) -> Vec3 {
    let extent = snapshot
        .dimensions
        .project(Vector::from_array(simulation.config().extent));
    (extent * 0.5).as_vec3()
}

fn draw_particles(
    mut gizmos: Gizmos,
    simulation: Res<Simulation>,
    palette: Res<Palette>,
    config: Res<SimulationConfig>,
) {
    let snapshot = simulation.latest_snapshot();
    let offset = world_offset(&simulation, &snapshot);
    let radius = config.rendering.particle_radius;

    for entry in snapshot.iter() {
        let position = entry.position.as_vec3() - offset;
        let color = color_for_type(&palette, entry.particle_type);
        match snapshot.dimensions {
            Dimensions::Two => {
                gizmos.circle_2d(Isometry2d::from_translation(position.truncate()), radius, color);
            }
            Dimensions::Three => {
                gizmos.sphere(Isometry3d::from_translation(position), radius, color);
            }
        }
    }
}

/// Joins every pair of same-type particles with a line in their color
fn draw_connect_lines(mut gizmos: Gizmos, simulation: Res<Simulation>, palette: Res<Palette>) {
    let snapshot = simulation.latest_snapshot();
    let offset = world_offset(&simulation, &snapshot);

    for (index, a) in snapshot.entries.iter().enumerate() {
        let color = color_for_type(&palette, a.particle_type).with_alpha(0.25);
        for b in snapshot.entries[index + 1..]
            .iter()
            .filter(|b| b.particle_type == a.particle_type)
        {
            gizmos.line(
                a.position.as_vec3() - offset,
                b.position.as_vec3() - offset,
                color,
            );
        }
    }
}

fn draw_bounds(mut gizmos: Gizmos, simulation: Res<Simulation>) {
    let snapshot = simulation.latest_snapshot();
    let extent = (world_offset(&simulation, &snapshot) * 2.0).max(Vec3::splat(1.0));
    let color = Color::srgba(1.0, 1.0, 1.0, 0.2);

    match snapshot.dimensions {
        Dimensions::Two => {
            gizmos.rect_2d(Isometry2d::IDENTITY, extent.truncate(), color);
        }
        Dimensions::Three => {
            gizmos.cuboid(Transform::from_scale(extent), color);
        }
    }
}
