//! Simulation state: the single owner of the clock and the tracked bodies
//!
//! Everything that mutates bodies or time goes through `Simulation`: loaders
//! hand it raw records, the UI hands it `ClockCommand`s, and the frame driver
//! calls `tick` once per frame. Within a tick every body is resolved against
//! one captured Julian Date.

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::config::OrreryConfig;
use crate::core::coordinates::julian_date_now;
use crate::orbital::basis::TransformBasis;
use crate::orbital::curve::{DEFAULT_CURVE_SAMPLES, OrbitCurve};
use crate::orbital::elements::{
    BodyClass, BodyMetadata, OrbitalElements, RawElementRecord, ValidatedRecord, validate,
};
use crate::orbital::error::{AddRecordError, OrbitError};
use crate::orbital::position::resolve_position;
use crate::orbital::propagation::KeplerSolver;
use crate::orbital::time::{ClockCommand, SimulationClock, TickOutcome};

/// Stable identity of a tracked body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// One tracked body. Owns its elements and the basis derived from them.
#[derive(Clone, Debug)]
pub struct Body {
    id: BodyId,
    name: String,
    class: BodyClass,
    metadata: BodyMetadata,
    elements: OrbitalElements,
    basis: TransformBasis,
    curve: Option<OrbitCurve>,
    position: DVec3,
    /// Last update failed; `position` is the previous good value
    stale: bool,
    /// At least one update has succeeded, so `position` is real
    resolved: bool,
    /// Bumped whenever the record is replaced
    revision: u64,
}

impl Body {
    pub(crate) fn new(id: BodyId, record: ValidatedRecord, curve_samples: usize) -> Self {
        let basis = TransformBasis::from_elements(&record.elements);
        let mut body = Self {
            id,
            name: record.name,
            class: record.class,
            metadata: record.metadata,
            elements: record.elements,
            basis,
            curve: None,
            position: DVec3::ZERO,
            stale: true,
            resolved: false,
            revision: 0,
        };
        body.rebuild_curve(curve_samples);
        body
    }

    fn rebuild_curve(&mut self, samples: usize) {
        self.curve = match OrbitCurve::generate(
            self.elements.semi_major_axis,
            self.elements.eccentricity,
            &self.basis,
            samples,
        ) {
            Ok(curve) => Some(curve),
            Err(err) => {
                warn!("Skipping orbit path: {}", err.with_name(&self.name));
                None
            }
        };
    }

    /// Swap in a newer record for the same body. Class, metadata and elements
    /// are replaced; the id, name and last position are kept.
    pub fn replace_record(&mut self, record: ValidatedRecord, curve_samples: usize) {
        self.class = record.class;
        self.metadata = record.metadata;
        self.elements = record.elements;
        self.basis = TransformBasis::from_elements(&self.elements);
        self.rebuild_curve(curve_samples);
        self.stale = true;
        self.revision += 1;
    }

    /// Re-resolve the position at Julian Date `jd`. On failure the previous
    /// position is kept and the body is marked stale.
    pub fn update(&mut self, solver: &KeplerSolver, jd: f64) -> Result<DVec3, OrbitError> {
        let t = self.elements.epoch_scale.from_julian(jd);
        match solver.solve(&self.elements, t) {
            Ok(solution) => {
                self.position = resolve_position(
                    self.elements.semi_major_axis,
                    self.elements.eccentricity,
                    solution.true_anomaly,
                    &self.basis,
                );
                self.stale = false;
                self.resolved = true;
                Ok(self.position)
            }
            Err(err) => {
                self.stale = true;
                Err(err.with_name(&self.name))
            }
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> BodyClass {
        self.class
    }

    pub fn metadata(&self) -> &BodyMetadata {
        &self.metadata
    }

    #[cfg(test)]
    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    #[cfg(test)]
    pub fn basis(&self) -> &TransformBasis {
        &self.basis
    }

    pub fn curve(&self) -> Option<&OrbitCurve> {
        self.curve.as_ref()
    }

    /// Heliocentric ecliptic position (AU)
    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// False until the first successful update; such bodies have no position to show.
    pub fn has_position(&self) -> bool {
        self.resolved
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// What one driver invocation did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    /// Julian Date every body was resolved against
    pub julian_date: f64,
    pub updated: usize,
    /// Bodies whose anomaly failed and kept their previous position
    pub held: usize,
}

/// Counts from applying one loader batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub added: usize,
    /// Records that superseded an already tracked body of the same name
    pub replaced: usize,
    pub rejected: usize,
    /// Records arriving after teardown
    pub discarded: usize,
}

/// How an accepted record was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added(BodyId),
    Replaced(BodyId),
}

impl AddOutcome {
    pub fn id(self) -> BodyId {
        match self {
            Self::Added(id) | Self::Replaced(id) => id,
        }
    }
}

#[derive(Resource, Debug)]
pub struct Simulation {
    clock: SimulationClock,
    solver: KeplerSolver,
    curve_samples: usize,
    bodies: Vec<Body>,
    next_id: u64,
    /// Bumped on teardown/reload; loads tagged with an older value are stale
    generation: u64,
    torn_down: bool,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(
            SimulationClock::new(julian_date_now()),
            KeplerSolver::default(),
            DEFAULT_CURVE_SAMPLES,
        )
    }
}

impl Simulation {
    pub fn new(clock: SimulationClock, solver: KeplerSolver, curve_samples: usize) -> Self {
        Self {
            clock,
            solver,
            curve_samples,
            bodies: Vec::new(),
            next_id: 0,
            generation: 0,
            torn_down: false,
        }
    }

    pub fn from_config(config: &OrreryConfig) -> Self {
        let clock = SimulationClock::new(julian_date_now())
            .with_speed_index(config.initial_speed_index)
            .with_min_frame_interval(config.min_frame_interval_secs)
            .with_single_step_days(config.single_step_days);
        let solver = KeplerSolver::new(config.kepler_tolerance, config.kepler_max_iterations);
        Self::new(clock, solver, config.curve_samples)
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[cfg(test)]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// True when results of a load started under `generation` may be applied.
    pub fn accepts_generation(&self, generation: u64) -> bool {
        !self.torn_down && generation == self.generation
    }

    /// Validate a record and start tracking it. Rejected records are logged
    /// and never become bodies.
    pub fn add_record(&mut self, raw: &RawElementRecord) -> Result<BodyId, AddRecordError> {
        self.insert_record(raw).map(AddOutcome::id)
    }

    fn insert_record(&mut self, raw: &RawElementRecord) -> Result<AddOutcome, AddRecordError> {
        if self.torn_down {
            return Err(AddRecordError::TornDown { name: raw.name() });
        }
        let mut record = validate(raw).inspect_err(|err| warn!("Skipping body: {}", err))?;
        if record.eccentricity_clamped {
            info!(
                "{}: eccentricity >= 1 clamped to {} (drawn as an ellipse)",
                record.name, record.elements.eccentricity
            );
        }

        let jd = self.clock.julian_date();
        let solver = self.solver;

        // A later record for an already tracked name supersedes it
        if record.named
            && let Some(body) = self.bodies.iter_mut().find(|b| b.name == record.name)
        {
            debug!("Updating record of {}", body.name);
            body.replace_record(record, self.curve_samples);
            if let Err(err) = body.update(&solver, jd) {
                debug!("Holding position: {}", err);
            }
            return Ok(AddOutcome::Replaced(body.id));
        }

        let id = BodyId(self.next_id);
        self.next_id += 1;
        if !record.named {
            record.name = format!("{} #{}", record.name, id.0);
        }

        let mut body = Body::new(id, record, self.curve_samples);
        if let Err(err) = body.update(&solver, jd) {
            debug!("Initial position unavailable: {}", err);
        }
        self.bodies.push(body);
        Ok(AddOutcome::Added(id))
    }

    pub fn add_records<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a RawElementRecord>,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for raw in records {
            match self.insert_record(raw) {
                Ok(AddOutcome::Added(_)) => summary.added += 1,
                Ok(AddOutcome::Replaced(_)) => summary.replaced += 1,
                Err(AddRecordError::Rejected(_)) => summary.rejected += 1,
                Err(AddRecordError::TornDown { .. }) => summary.discarded += 1,
            }
        }
        summary
    }

    /// Stop tracking every body not matching `keep`.
    pub fn retain_bodies(&mut self, mut keep: impl FnMut(&Body) -> bool) {
        self.bodies.retain(|b| keep(b));
    }

    /// Bodies currently holding a stale position.
    pub fn stale_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_stale()).count()
    }

    /// Apply a clock command; bodies are re-resolved when time jumps.
    pub fn apply(&mut self, command: ClockCommand) {
        if self.torn_down {
            return;
        }
        if self.clock.apply(command, julian_date_now()) {
            self.update_bodies();
        }
    }

    /// Frame driver. `None` once the simulation has been torn down.
    pub fn tick(&mut self, wall_delta_secs: f64) -> Option<TickReport> {
        if self.torn_down {
            return None;
        }
        let outcome = self.clock.tick(wall_delta_secs);
        let (updated, held) = match outcome {
            TickOutcome::Advanced { .. } => self.update_bodies(),
            _ => (0, 0),
        };
        Some(TickReport {
            outcome,
            julian_date: self.clock.julian_date(),
            updated,
            held,
        })
    }

    fn update_bodies(&mut self) -> (usize, usize) {
        let jd = self.clock.julian_date();
        let solver = self.solver;
        let mut updated = 0;
        let mut held = 0;
        for body in &mut self.bodies {
            match body.update(&solver, jd) {
                Ok(_) => updated += 1,
                Err(err) => {
                    debug!("Holding position: {}", err);
                    held += 1;
                }
            }
        }
        (updated, held)
    }

    /// Drop every body and invalidate in-flight loads, keeping the clock.
    pub fn reload(&mut self) {
        self.bodies.clear();
        self.generation += 1;
    }

    /// Final teardown: no further ticks, commands or loads are accepted.
    pub fn teardown(&mut self) {
        self.reload();
        self.torn_down = true;
    }
}
