//! Body rendering module
//!
//! Mirrors the simulation's tracked bodies into the ECS: one sphere entity per
//! body, moved every frame and despawned once the body is no longer tracked.

use bevy::prelude::*;

pub mod components;
pub mod resources;
pub mod systems;

pub use resources::BodyEntities;
pub use systems::{
    despawn_untracked_body_entities_system, spawn_missing_body_entities_system,
    sync_body_transforms_system,
};

use crate::orbital::drive_simulation_system;

/// Plugin for body entities
pub struct BodyPlugin;

impl Plugin for BodyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BodyEntities>().add_systems(
            Update,
            (
                despawn_untracked_body_entities_system,
                spawn_missing_body_entities_system,
                sync_body_transforms_system,
            )
                .chain()
                .after(drive_simulation_system),
        );
    }
}
