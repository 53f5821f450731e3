//! UI state management

use bevy::prelude::*;

/// Main UI state resource
#[derive(Resource)]
pub struct UIState {
    pub show_hud: bool,
    pub show_help: bool,
}

impl Default for UIState {
    fn default() -> Self {
        Self {
            show_hud: true,
            show_help: false,
        }
    }
}

/// Marker for the HUD text node
#[derive(Component)]
pub struct HudText;
