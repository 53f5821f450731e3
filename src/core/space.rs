//! Canonical world position types.

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::core::coordinates::ecliptic_to_bevy_world;

/// Canonical body position: heliocentric ecliptic (AU, f64).
#[derive(Component, Copy, Clone, Debug, Default, Deref, DerefMut)]
pub struct WorldEclipticAu(pub DVec3);

impl WorldEclipticAu {
    /// Render-space translation for this position.
    pub fn to_bevy(self, au_to_world: f32) -> Vec3 {
        ecliptic_to_bevy_world(self.0, au_to_world)
    }
}
