//! Orbit path gizmos

use crate::config::OrreryConfig;
use crate::core::coordinates::ecliptic_to_bevy_world;
use crate::orbital::Simulation;
use crate::visualization::config::VisualizationConfig;
use bevy::prelude::*;

/// Draw every body's sampled orbit as a closed line strip
pub fn draw_orbit_paths(
    mut gizmos: Gizmos,
    sim: Res<Simulation>,
    config: Res<OrreryConfig>,
    vis: Res<VisualizationConfig>,
) {
    if !vis.show_orbits {
        return;
    }
    for body in sim.bodies() {
        // Bodies whose curve failed to sample are drawn without a path
        let Some(curve) = body.curve() else { continue };
        gizmos.linestrip(
            curve
                .closed_points()
                .map(|p| ecliptic_to_bevy_world(p, config.au_to_world)),
            vis.orbit_color_for(body.class()),
        );
    }
}
