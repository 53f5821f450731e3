//! Position resolver: (a, e, ν, basis) → heliocentric ecliptic position (AU).

use bevy::math::DVec3;

use crate::orbital::basis::TransformBasis;

/// Focus distance r = a(1 - e²) / (1 + e cos ν).
pub fn radius_at(a: f64, e: f64, true_anomaly: f64) -> f64 {
    a * (1.0 - e * e) / (1.0 + e * true_anomaly.cos())
}

/// Position without any guard. `None` when an input or the result is not finite.
pub fn try_resolve_position(
    a: f64,
    e: f64,
    true_anomaly: f64,
    basis: &TransformBasis,
) -> Option<DVec3> {
    if !(a.is_finite() && e.is_finite() && true_anomaly.is_finite() && basis.is_finite()) {
        return None;
    }
    let r = radius_at(a, e, true_anomaly);
    let (sin_nu, cos_nu) = true_anomaly.sin_cos();
    let p = basis.apply_planar(r * cos_nu, r * sin_nu);
    p.is_finite().then_some(p)
}

/// Position, failing closed to the origin so one bad body can never push NaN
/// into the scene bounds or camera math.
pub fn resolve_position(a: f64, e: f64, true_anomaly: f64, basis: &TransformBasis) -> DVec3 {
    try_resolve_position(a, e, true_anomaly, basis).unwrap_or(DVec3::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbital::elements::ECCENTRICITY_CLAMP;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_unit_circle_at_periapsis() {
        let basis = TransformBasis::new(0.0, 0.0, 0.0);
        let p = resolve_position(1.0, 0.0, 0.0, &basis);
        assert!((p - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-12, "p = {:?}", p);
    }

    #[test]
    fn test_mars_like_aphelion_distance() {
        let basis = TransformBasis::new(1.85_f64.to_radians(), 0.865, 5.0);
        let (a, e) = (1.523, 0.0934);
        let p = resolve_position(a, e, PI, &basis);
        assert!((p.length() - a * (1.0 + e)).abs() < 1e-9);
        assert!((p.length() - 1.665).abs() < 1e-3, "|p| = {}", p.length());
    }

    #[test]
    fn test_distance_stays_between_apsides() {
        let basis = TransformBasis::new(0.7, 2.0, 4.0);
        for &(a, e) in &[(1.0, 0.0), (0.387, 0.2056), (2.77, 0.5), (30.0, 0.95)] {
            for k in 0..360 {
                let nu = k as f64 * TAU / 360.0;
                let r = resolve_position(a, e, nu, &basis).length();
                let lo = a * (1.0 - e);
                let hi = a * (1.0 + e);
                assert!(
                    r >= lo - 1e-9 && r <= hi + 1e-9,
                    "a={} e={} nu={} r={} outside [{}, {}]",
                    a,
                    e,
                    nu,
                    r,
                    lo,
                    hi
                );
            }
        }
    }

    #[test]
    fn test_circular_radius_constant() {
        let basis = TransformBasis::new(0.3, 1.0, 2.0);
        for k in 0..100 {
            let nu = k as f64 * TAU / 100.0;
            let r = resolve_position(5.2, 0.0, nu, &basis).length();
            assert!((r - 5.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clamped_eccentricity_stays_finite() {
        let basis = TransformBasis::new(0.1, 0.2, 0.3);
        for k in 0..720 {
            let nu = k as f64 * TAU / 720.0;
            let r = radius_at(3.0, ECCENTRICITY_CLAMP, nu);
            assert!(r.is_finite() && r > 0.0, "nu={} r={}", nu, r);
            assert!(try_resolve_position(3.0, ECCENTRICITY_CLAMP, nu, &basis).is_some());
        }
    }

    #[test]
    fn test_non_finite_input_fails_to_origin() {
        let basis = TransformBasis::new(0.0, 0.0, 0.0);
        assert_eq!(resolve_position(f64::NAN, 0.1, 0.0, &basis), DVec3::ZERO);
        assert_eq!(resolve_position(1.0, 0.1, f64::INFINITY, &basis), DVec3::ZERO);
        assert!(try_resolve_position(1.0, f64::NAN, 0.0, &basis).is_none());

        let broken = TransformBasis::new(f64::NAN, 0.0, 0.0);
        assert_eq!(resolve_position(1.0, 0.1, 0.0, &broken), DVec3::ZERO);
    }
}
