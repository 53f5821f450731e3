//! User interface module
//!
//! Keyboard controls for the simulation clock and catalog, plus a text HUD.

use bevy::prelude::*;

pub mod state;
pub mod systems;

pub use state::UIState;
pub use systems::{keyboard_controls_system, update_hud_system};

/// Marker for the main 3D camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for user interface management
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UIState>()
            .add_systems(Startup, systems::setup_hud)
            .add_systems(Update, (keyboard_controls_system, update_hud_system).chain());
    }
}
