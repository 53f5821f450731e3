//! Element catalog loading
//!
//! Bodies come from the built-in planet table, local JSON files and the NASA
//! NeoWs browse feed. External sources load on a worker thread; results are
//! tagged with the simulation generation they were requested under so a load
//! that finishes after a reload or teardown is dropped instead of applied.

use bevy::prelude::*;

pub mod cache;
pub mod fetcher;
pub mod parser;
pub mod systems;
pub mod types;

pub use systems::{apply_load_results_system, reload_catalog_system};
pub use types::CatalogState;

/// Plugin for catalog loading
pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CatalogState>()
            .add_systems(Startup, systems::setup_catalog_worker)
            .add_systems(
                Update,
                (reload_catalog_system, apply_load_results_system).chain(),
            );
    }
}
