//! Visualization module
//!
//! This module handles the Sun, orbit paths and the per-class look of bodies.

use bevy::prelude::*;

pub mod config;
pub mod lighting;
pub mod orbits;

pub use config::VisualizationConfig;
pub use lighting::setup_sun;
pub use orbits::draw_orbit_paths;

/// Plugin for visualization systems
pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VisualizationConfig>()
            .add_systems(Startup, setup_sun)
            .add_systems(Update, draw_orbit_paths);
    }
}
