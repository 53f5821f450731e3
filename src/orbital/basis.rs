//! Orbital-plane to ecliptic rotation.

use bevy::math::DVec3;

use crate::orbital::elements::OrbitalElements;

/// Rotation taking orbital-plane coordinates (x toward periapsis) into
/// heliocentric ecliptic coordinates. Stored as three row vectors.
///
/// Depends only on inclination, node and periapsis, so it is built once per
/// body and reused for every position query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformBasis {
    pub rows: [DVec3; 3],
}

impl TransformBasis {
    /// Build the basis from inclination `i`, longitude of ascending node
    /// `node` and argument of periapsis `peri`, all in radians.
    pub fn new(i: f64, node: f64, peri: f64) -> Self {
        let (sin_i, cos_i) = i.sin_cos();
        let (sin_node, cos_node) = node.sin_cos();
        let (sin_peri, cos_peri) = peri.sin_cos();

        Self {
            rows: [
                DVec3::new(
                    cos_peri * cos_node - cos_i * sin_peri * sin_node,
                    -cos_node * sin_peri - cos_i * cos_peri * sin_node,
                    sin_i * sin_node,
                ),
                DVec3::new(
                    cos_peri * sin_node + cos_i * cos_node * sin_peri,
                    -sin_peri * sin_node + cos_i * cos_peri * cos_node,
                    -sin_i * cos_node,
                ),
                DVec3::new(sin_i * sin_peri, sin_i * cos_peri, cos_i),
            ],
        }
    }

    pub fn from_elements(elements: &OrbitalElements) -> Self {
        Self::new(
            elements.inclination,
            elements.longitude_of_ascending_node,
            elements.argument_of_periapsis,
        )
    }

    /// Rotate a point lying in the orbital plane (z' = 0).
    pub fn apply_planar(&self, x: f64, y: f64) -> DVec3 {
        self.apply(DVec3::new(x, y, 0.0))
    }

    pub fn apply(&self, v: DVec3) -> DVec3 {
        DVec3::new(self.rows[0].dot(v), self.rows[1].dot(v), self.rows[2].dot(v))
    }
}
