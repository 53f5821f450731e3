//! Two-body propagation: time → mean → eccentric → true anomaly.

use std::f64::consts::{PI, TAU};

use crate::orbital::elements::OrbitalElements;
use crate::orbital::error::OrbitError;

/// Sidereal year in days; Kepler's third law for heliocentric orbits with
/// `a` in AU gives P = SIDEREAL_YEAR_DAYS * a^1.5.
pub const SIDEREAL_YEAR_DAYS: f64 = 365.256_363_004;

pub const DEFAULT_KEPLER_TOLERANCE: f64 = 1e-6;
pub const DEFAULT_KEPLER_MAX_ITERATIONS: u32 = 30;

/// Orbital period (days): explicit when the record carries one, otherwise
/// from the semi-major axis.
pub fn orbital_period_days(elements: &OrbitalElements) -> f64 {
    elements
        .orbital_period_days
        .unwrap_or_else(|| SIDEREAL_YEAR_DAYS * elements.semi_major_axis.powf(1.5))
}

/// Mean motion (radians per day).
pub fn mean_motion(elements: &OrbitalElements) -> f64 {
    TAU / orbital_period_days(elements)
}

/// Mean anomaly at time `t`, normalized to [0, 2π).
///
/// `t` must be on the same scale as the element epoch.
pub fn mean_anomaly_at(elements: &OrbitalElements, t: f64) -> f64 {
    normalize_angle(elements.mean_anomaly_at_epoch + mean_motion(elements) * (t - elements.epoch))
}

/// True anomaly from eccentric anomaly, normalized to [0, 2π).
pub fn true_anomaly_from_eccentric(eccentric_anomaly: f64, e: f64) -> f64 {
    let half = eccentric_anomaly / 2.0;
    normalize_angle(
        2.0 * ((1.0 + e).sqrt() * half.sin()).atan2((1.0 - e).sqrt() * half.cos()),
    )
}

fn normalize_angle(a: f64) -> f64 {
    let r = a.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if r >= TAU { 0.0 } else { r }
}

/// The three anomalies for one instant, each in [0, 2π).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnomalySolution {
    pub mean_anomaly: f64,
    pub eccentric_anomaly: f64,
    pub true_anomaly: f64,
    pub iterations: u32,
    /// False when the iteration cap was hit; the estimate is still returned.
    pub converged: bool,
}

/// Newton-Raphson solver for Kepler's equation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeplerSolver {
    /// Stop once a Newton step is smaller than this (radians)
    pub tolerance: f64,
    /// Hard cap so a pathological input can never spin
    pub max_iterations: u32,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_KEPLER_TOLERANCE,
            max_iterations: DEFAULT_KEPLER_MAX_ITERATIONS,
        }
    }
}

impl KeplerSolver {
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Solve M = E - e sin E for E. Returns the best estimate together with
    /// the iteration count and whether the tolerance was reached.
    pub fn eccentric_anomaly(&self, mean_anomaly: f64, e: f64) -> (f64, u32, bool) {
        // Starting at π keeps Newton stable for highly eccentric orbits
        let mut ecc_anomaly = if e > 0.8 { PI } else { mean_anomaly };
        for iteration in 1..=self.max_iterations {
            let f = ecc_anomaly - e * ecc_anomaly.sin() - mean_anomaly;
            let f_prime = 1.0 - e * ecc_anomaly.cos();
            let step = f / f_prime;
            ecc_anomaly -= step;
            if step.abs() < self.tolerance {
                return (ecc_anomaly, iteration, true);
            }
        }
        (ecc_anomaly, self.max_iterations, false)
    }

    /// Full pipeline for time `t` (same scale as the element epoch).
    pub fn solve(&self, elements: &OrbitalElements, t: f64) -> Result<AnomalySolution, OrbitError> {
        if !t.is_finite() {
            return Err(OrbitError::anomaly("", format!("time {t} is not finite")));
        }
        let e = elements.eccentricity;
        let mean_anomaly = mean_anomaly_at(elements, t);
        if !mean_anomaly.is_finite() {
            return Err(OrbitError::anomaly("", "mean anomaly is not finite"));
        }

        let (ecc_anomaly, iterations, converged) = self.eccentric_anomaly(mean_anomaly, e);
        if !ecc_anomaly.is_finite() {
            return Err(OrbitError::anomaly(
                "",
                format!("eccentric anomaly diverged after {iterations} iterations"),
            ));
        }

        let true_anomaly = true_anomaly_from_eccentric(ecc_anomaly, e);
        if !true_anomaly.is_finite() {
            return Err(OrbitError::anomaly("", "true anomaly is not finite"));
        }

        Ok(AnomalySolution {
            mean_anomaly,
            eccentric_anomaly: normalize_angle(ecc_anomaly),
            true_anomaly,
            iterations,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbital::elements::EpochScale;

    fn eccentric_from_true_anomaly(true_anomaly: f64, e: f64) -> f64 {
        let half = true_anomaly / 2.0;
        normalize_angle(
            2.0 * ((1.0 - e).sqrt() * half.sin()).atan2((1.0 + e).sqrt() * half.cos()),
        )
    }

    /// Kepler's equation, M = E - e sin E.
    fn mean_from_eccentric_anomaly(eccentric_anomaly: f64, e: f64) -> f64 {
        normalize_angle(eccentric_anomaly - e * eccentric_anomaly.sin())
    }

    #[test]
    fn test_period_from_third_law() {
        let earth = OrbitalElements::new(1.0, 0.0167, 0.0, 0.0, 0.0);
        assert!((orbital_period_days(&earth) - SIDEREAL_YEAR_DAYS).abs() < 1e-9);

        let mars = OrbitalElements::new(1.523679, 0.0934, 0.0, 0.0, 0.0);
        assert!((orbital_period_days(&mars) - 686.98).abs() < 0.1);
    }

    #[test]
    fn test_explicit_period_wins() {
        let comet = OrbitalElements::new(17.8, 0.967, 0.0, 0.0, 0.0).with_period(27_510.0);
        assert_eq!(orbital_period_days(&comet), 27_510.0);
    }

    #[test]
    fn test_mean_anomaly_advances_one_period() {
        let el = OrbitalElements::new(1.0, 0.2, 0.0, 0.0, 0.0).with_mean_anomaly(
            1.0,
            2_451_545.0,
            EpochScale::Julian,
        );
        let m = mean_anomaly_at(&el, 2_451_545.0 + SIDEREAL_YEAR_DAYS);
        assert!((m - 1.0).abs() < 1e-9, "m = {}", m);

        let half = mean_anomaly_at(&el, 2_451_545.0 + SIDEREAL_YEAR_DAYS / 2.0);
        assert!((half - (1.0 + PI)).abs() < 1e-9, "half = {}", half);
    }

    #[test]
    fn test_mean_anomaly_normalized_backwards_in_time() {
        let el = OrbitalElements::new(1.0, 0.2, 0.0, 0.0, 0.0);
        let m = mean_anomaly_at(&el, 2_451_545.0 - 10.0);
        assert!((0.0..TAU).contains(&m), "m = {}", m);
    }

    #[test]
    fn test_circular_orbit_anomalies_coincide() {
        let solver = KeplerSolver::default();
        for m in [0.0, 0.5, 2.0, 4.0, 6.0] {
            let (e_anom, _, converged) = solver.eccentric_anomaly(m, 0.0);
            assert!(converged);
            assert!((e_anom - m).abs() < 1e-9);
            assert!((true_anomaly_from_eccentric(e_anom, 0.0) - m).abs() < 1e-9);
        }
    }

    #[test]
    fn test_kepler_roundtrip_across_true_anomalies() {
        let solver = KeplerSolver::default();
        for &e in &[0.0, 0.0934, 0.5, 0.9, 0.999] {
            for k in 0..72 {
                let nu = k as f64 * TAU / 72.0;
                let ecc = eccentric_from_true_anomaly(nu, e);
                let m = mean_from_eccentric_anomaly(ecc, e);
                let (solved, _, _) = solver.eccentric_anomaly(m, e);
                let back = mean_from_eccentric_anomaly(solved, e);
                let diff = (back - m).abs().min(TAU - (back - m).abs());
                assert!(
                    diff <= solver.tolerance,
                    "e={} nu={} reconstructed M off by {}",
                    e,
                    nu,
                    diff
                );
            }
        }
    }

    #[test]
    fn test_iteration_cap_returns_estimate() {
        let solver = KeplerSolver::new(0.0, 3);
        let (e_anom, iterations, converged) = solver.eccentric_anomaly(1.0, 0.999);
        assert!(e_anom.is_finite());
        assert_eq!(iterations, 3);
        assert!(!converged);
    }

    #[test]
    fn test_solve_rejects_non_finite_time() {
        let solver = KeplerSolver::default();
        let el = OrbitalElements::new(1.0, 0.1, 0.0, 0.0, 0.0);
        for t in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                solver.solve(&el, t),
                Err(OrbitError::AnomalyComputation { .. })
            ));
        }
    }

    #[test]
    fn test_solve_outputs_are_normalized() {
        let solver = KeplerSolver::default();
        let el = OrbitalElements::new(2.7, 0.6, 0.2, 1.0, 3.0).with_mean_anomaly(
            5.9,
            60_000.0,
            EpochScale::ModifiedJulian,
        );
        for dt in [-5000.0, -1.0, 0.0, 13.7, 90_000.0] {
            let s = solver.solve(&el, 60_000.0 + dt).unwrap();
            for angle in [s.mean_anomaly, s.eccentric_anomaly, s.true_anomaly] {
                assert!((0.0..TAU).contains(&angle), "angle {} out of range", angle);
            }
            assert!(s.converged);
        }
    }

    #[test]
    fn test_true_anomaly_at_periapsis_and_apoapsis() {
        assert!(true_anomaly_from_eccentric(0.0, 0.5).abs() < 1e-12);
        assert!((true_anomaly_from_eccentric(PI, 0.5) - PI).abs() < 1e-12);
    }
}
