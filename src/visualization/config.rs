//! Visualization configuration

use bevy::prelude::*;

use crate::orbital::BodyClass;

/// Physical radius mapped to `planet_radius` (Earth)
const REFERENCE_RADIUS_KM: f64 = 6371.0;

/// Body, orbit and sun rendering configuration resource
#[derive(Resource)]
pub struct VisualizationConfig {
    pub show_orbits: bool,
    pub planet_color: Color,
    pub dwarf_planet_color: Color,
    pub asteroid_color: Color,
    pub comet_color: Color,
    /// Orbit lines reuse the body color at this alpha
    pub orbit_alpha: f32,
    /// World-space radius of an Earth-sized planet
    pub planet_radius: f32,
    pub minor_body_radius: f32,
    pub sun_radius: f32,
    pub sun_color: Color,
    pub sun_intensity: f32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            show_orbits: true,
            planet_color: Color::srgb(0.45, 0.7, 1.0),
            dwarf_planet_color: Color::srgb(0.8, 0.75, 0.6),
            asteroid_color: Color::srgb(0.75, 0.75, 0.75),
            comet_color: Color::srgb(0.5, 1.0, 0.9),
            orbit_alpha: 0.35,
            planet_radius: 1.5,
            minor_body_radius: 0.4,
            sun_radius: 5.0,
            sun_color: Color::srgb(1.0, 0.9, 0.6),
            sun_intensity: 2.0e9,
        }
    }
}

impl VisualizationConfig {
    pub fn color_for(&self, class: BodyClass) -> Color {
        match class {
            BodyClass::Planet => self.planet_color,
            BodyClass::DwarfPlanet => self.dwarf_planet_color,
            BodyClass::Asteroid => self.asteroid_color,
            BodyClass::Comet => self.comet_color,
        }
    }

    pub fn orbit_color_for(&self, class: BodyClass) -> Color {
        self.color_for(class).with_alpha(self.orbit_alpha)
    }

    /// Display radius. Planets grow with the cube root of their physical
    /// radius so gas giants stay readable without swallowing inner orbits.
    pub fn body_radius(&self, class: BodyClass, radius_km: Option<f64>, scale: f32) -> f32 {
        let base = match class {
            BodyClass::Planet => {
                let ratio = radius_km.map_or(1.0, |r| (r / REFERENCE_RADIUS_KM).cbrt()) as f32;
                self.planet_radius * ratio.clamp(0.5, 3.0)
            }
            BodyClass::DwarfPlanet => self.minor_body_radius * 1.5,
            BodyClass::Asteroid | BodyClass::Comet => self.minor_body_radius,
        };
        base * scale.max(0.0)
    }
}
