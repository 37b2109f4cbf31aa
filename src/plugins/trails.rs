//! Trails plugin - Self-contained plugin pattern
//!
//! Keeps a short history of published positions for every particle and draws
//! it as a line strip that fades towards its oldest point. Histories are fed
//! from snapshots only, one point per new tick.

use crate::physics::Snapshot;
use crate::plugins::simulation::SimulationSet;
use crate::plugins::visualization::world_offset;
use crate::prelude::*;
use crate::utils::color::color_for_type;

/// Opacity of the newest trail segment
const TRAIL_ALPHA: f32 = 0.6;

pub struct TrailsPlugin;

impl Plugin for TrailsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ParticleTrails>();
        app.add_systems(
            Update,
            (update_trails, draw_trails.run_if(trails_enabled))
                .chain()
                .run_if(resource_exists::<Simulation>)
                .in_set(SimulationSet::Visualization),
        );
    }
}

fn trails_enabled(config: Res<SimulationConfig>) -> bool {
    config.rendering.trails
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrailPoint {
    pub position: Vec3,
    pub tick: u64,
}

/// Recent positions of one particle, newest first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trail {
    pub points: Vec<TrailPoint>,
}

impl Trail {
    pub fn add_point(&mut self, position: Vec3, tick: u64) {
        self.points.insert(0, TrailPoint { position, tick });
    }

    pub fn cleanup_old_points(&mut self, current_tick: u64, max_points: usize) {
        self.points
            .retain(|point| current_tick.saturating_sub(point.tick) < max_points as u64);
        self.points.truncate(max_points);
    }
}

/// One trail per snapshot entry, in snapshot order
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct ParticleTrails {
    pub trails: Vec<Trail>,
    last_tick: Option<u64>,
}

impl ParticleTrails {
    /// Appends the positions of a newly published snapshot.
    ///
    /// A snapshot with a different particle count or an earlier tick starts
    /// every trail over, since it belongs to a new run.
    pub fn record(&mut self, snapshot: &Snapshot, max_points: usize) {
        if self.last_tick == Some(snapshot.tick) {
            return;
        }
        let restarted = self.last_tick.is_some_and(|tick| snapshot.tick < tick);
        if restarted || self.trails.len() != snapshot.len() {
            self.clear();
            self.trails.resize_with(snapshot.len(), Trail::default);
        }

        for (trail, entry) in self.trails.iter_mut().zip(snapshot.iter()) {
            trail.add_point(entry.position.as_vec3(), snapshot.tick);
            trail.cleanup_old_points(snapshot.tick, max_points);
        }
        self.last_tick = Some(snapshot.tick);
    }

    pub fn clear(&mut self) {
        self.trails.clear();
        self.last_tick = None;
    }
}

fn update_trails(
    simulation: Res<Simulation>,
    config: Res<SimulationConfig>,
    mut trails: ResMut<ParticleTrails>,
) {
    if !config.rendering.trails {
        if !trails.trails.is_empty() {
            trails.clear();
        }
        return;
    }

    trails.record(&simulation.latest_snapshot(), config.rendering.trail_length);
}

fn draw_trails(
    mut gizmos: Gizmos,
    simulation: Res<Simulation>,
    palette: Res<Palette>,
    trails: Res<ParticleTrails>,
) {
    let snapshot = simulation.latest_snapshot();
    let offset = world_offset(&simulation, &snapshot);

    for (trail, entry) in trails.trails.iter().zip(snapshot.iter()) {
        if trail.points.len() < 2 {
            continue;
        }
        let color = color_for_type(&palette, entry.particle_type);
        let steps = (trail.points.len() - 1) as f32;

        gizmos.linestrip_gradient(trail.points.iter().enumerate().map(|(age, point)| {
            let alpha = TRAIL_ALPHA * (1.0 - age as f32 / steps);
            (point.position - offset, color.with_alpha(alpha))
        }));
    }
}
