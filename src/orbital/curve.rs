//! Static orbit path sampling.

use bevy::math::DVec3;
use std::f64::consts::TAU;

use crate::orbital::basis::TransformBasis;
use crate::orbital::error::OrbitError;
use crate::orbital::position::try_resolve_position;

pub const DEFAULT_CURVE_SAMPLES: usize = 192;

/// Closed polyline approximating a full orbit (AU). The closing segment is
/// implied; `closed_points` repeats the first sample at the end.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCurve {
    pub points: Vec<DVec3>,
}

impl OrbitCurve {
    /// Sample `samples` true anomalies uniformly over [0, 2π).
    ///
    /// All-or-nothing: a single non-finite sample fails the whole curve.
    pub fn generate(
        a: f64,
        e: f64,
        basis: &TransformBasis,
        samples: usize,
    ) -> Result<Self, OrbitError> {
        let samples = samples.max(3);
        let points = (0..samples)
            .map(|k| {
                let nu = k as f64 * TAU / samples as f64;
                try_resolve_position(a, e, nu, basis).ok_or(OrbitError::DegenerateOrbit {
                    name: String::new(),
                    sample: k,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { points })
    }

    pub fn closed_points(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.points.iter().chain(self.points.first()).copied()
    }
}
