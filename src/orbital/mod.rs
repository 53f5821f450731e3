//! Orbital mechanics module
//!
//! This module handles element validation, two-body propagation, orbit path
//! sampling and simulation time for heliocentric bodies.

use bevy::app::AppExit;
use bevy::prelude::*;

use crate::config::OrreryConfig;

pub mod basis;
pub mod curve;
pub mod elements;
pub mod error;
pub mod position;
pub mod propagation;
pub mod simulation;
pub mod time;

pub use elements::{BodyClass, RawElementRecord};
pub use simulation::{BodyId, Simulation};
pub use time::{ClockCommand, TickOutcome, speed_label};

/// Plugin for orbital propagation and simulation time
pub struct OrbitalPlugin;

impl Plugin for OrbitalPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<OrreryConfig>()
            .cloned()
            .unwrap_or_default();
        app.insert_resource(Simulation::from_config(&config))
            .add_systems(Update, (drive_simulation_system, teardown_on_exit_system));
    }
}

/// Advance the clock by this frame's wall time and re-resolve every body.
pub fn drive_simulation_system(time: Res<Time>, mut sim: ResMut<Simulation>) {
    let Some(report) = sim.tick(time.delta_secs_f64()) else {
        return;
    };
    if let TickOutcome::Advanced { delta_days } = report.outcome
        && report.held > 0
    {
        debug!(
            "JD {:.5} ({:+.6} d): {} bodies updated, {} held",
            report.julian_date, delta_days, report.updated, report.held
        );
    }
}

fn teardown_on_exit_system(mut exits: MessageReader<AppExit>, mut sim: ResMut<Simulation>) {
    if exits.read().next().is_some() && !sim.is_torn_down() {
        sim.teardown();
        info!("Simulation torn down");
    }
}
