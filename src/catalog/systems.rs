//! Catalog systems (queue loads + apply results).

use crate::catalog::fetcher::start_loader_worker;
use crate::catalog::parser::builtin_planet_records;
use crate::catalog::types::{CatalogState, LoadCommand, LoadResultMsg, LoaderChannels};
use crate::config::OrreryConfig;
use crate::orbital::Simulation;
use bevy::prelude::*;

pub fn setup_catalog_worker(
    mut commands: Commands,
    config: Res<OrreryConfig>,
    mut sim: ResMut<Simulation>,
    mut state: ResMut<CatalogState>,
) {
    let channels = start_loader_worker();
    info!("Catalog loader started");
    load_catalog(&config, &mut sim, &mut state, &channels);
    commands.insert_resource(channels);
}

/// Add the built-in bodies and queue every configured external load under
/// the simulation's current generation.
pub fn load_catalog(
    config: &OrreryConfig,
    sim: &mut Simulation,
    state: &mut CatalogState,
    channels: &LoaderChannels,
) {
    if config.include_builtin_planets {
        let summary = sim.add_records(&builtin_planet_records());
        state.bodies_added += summary.added;
        state.records_rejected += summary.rejected;
        info!("Built-in planets: {} added", summary.added);
    }

    let generation = sim.generation();
    let mut queue = |cmd: LoadCommand| match channels.cmd_tx.send(cmd) {
        Ok(()) => state.pending += 1,
        Err(err) => state.last_error = Some(format!("Failed to queue load: {}", err)),
    };

    for path in &config.catalog_files {
        queue(LoadCommand::File {
            path: path.clone(),
            generation,
        });
    }
    if let Some(feed) = &config.neo_feed {
        for page in 0..feed.pages {
            queue(LoadCommand::NeoFeed {
                feed: feed.clone(),
                page,
                generation,
            });
        }
    }
}

/// Drain worker results. Batches from an older generation are dropped whole.
pub fn apply_load_results_system(
    mut sim: ResMut<Simulation>,
    mut state: ResMut<CatalogState>,
    channels: Option<Res<LoaderChannels>>,
) {
    let Some(channels) = channels else { return };
    let Ok(guard) = channels.res_rx.lock() else {
        return;
    };

    while let Ok(msg) = guard.try_recv() {
        apply_load_result(msg, &mut sim, &mut state);
    }
}

pub fn apply_load_result(msg: LoadResultMsg, sim: &mut Simulation, state: &mut CatalogState) {
    match msg {
        LoadResultMsg::Batch {
            source,
            generation,
            records,
        } => {
            if !sim.accepts_generation(generation) {
                info!(
                    "Discarding {} records from {} (generation {} is stale)",
                    records.len(),
                    source,
                    generation
                );
                state.batches_discarded += 1;
                return;
            }
            state.pending = state.pending.saturating_sub(1);
            let summary = sim.add_records(&records);
            state.bodies_added += summary.added;
            state.bodies_replaced += summary.replaced;
            state.records_rejected += summary.rejected;
            info!(
                "Loaded {}: {} bodies added, {} updated, {} rejected",
                source, summary.added, summary.replaced, summary.rejected
            );
        }
        LoadResultMsg::Failure {
            source,
            generation,
            error,
        } => {
            if !sim.accepts_generation(generation) {
                state.batches_discarded += 1;
                return;
            }
            state.pending = state.pending.saturating_sub(1);
            state.last_error = Some(format!("{}: {}", source, error));
        }
    }
}

/// Reload on request: drop every body, invalidate in-flight loads, load again.
pub fn reload_catalog_system(
    config: Res<OrreryConfig>,
    mut sim: ResMut<Simulation>,
    mut state: ResMut<CatalogState>,
    channels: Option<Res<LoaderChannels>>,
) {
    if !state.reload_requested {
        return;
    }
    state.reload_requested = false;
    let Some(channels) = channels else { return };
    if sim.is_torn_down() {
        return;
    }

    sim.reload();
    *state = CatalogState::default();
    info!("Reloading catalog (generation {})", sim.generation());
    load_catalog(&config, &mut sim, &mut state, &channels);
}
