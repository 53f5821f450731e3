//! Per-body failure taxonomy for the orbital engine.
//!
//! Every variant is local to one body: callers skip that body (or its curve,
//! or its update for one tick) and carry on with the rest of the scene.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    /// The record can never produce a body. Skip it, do not render it.
    #[error("invalid orbital elements for {name}: {reason}")]
    InvalidOrbitalElements { name: String, reason: String },

    /// Recoverable. Hold the last known position for this tick.
    #[error("anomaly computation failed for {name}: {reason}")]
    AnomalyComputation { name: String, reason: String },

    /// The static orbit path could not be sampled. Skip the curve only.
    #[error("degenerate orbit for {name}: sample {sample} is not finite")]
    DegenerateOrbit { name: String, sample: usize },
}

impl OrbitError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidOrbitalElements {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn anomaly(name: &str, reason: impl Into<String>) -> Self {
        Self::AnomalyComputation {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach a body name to an error raised by a name-agnostic helper.
    pub(crate) fn with_name(self, name: &str) -> Self {
        match self {
            Self::InvalidOrbitalElements { reason, .. } => Self::invalid(name, reason),
            Self::AnomalyComputation { reason, .. } => Self::anomaly(name, reason),
            Self::DegenerateOrbit { sample, .. } => Self::DegenerateOrbit {
                name: name.to_string(),
                sample,
            },
        }
    }
}

/// Why `Simulation::add_record` did not track a record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AddRecordError {
    #[error(transparent)]
    Rejected(#[from] OrbitError),

    /// The record may be fine; the simulation no longer accepts bodies.
    #[error("simulation torn down, {name} not added")]
    TornDown { name: String },
}
