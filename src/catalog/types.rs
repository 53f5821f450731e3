//! Catalog loader types and communication structures

use bevy::prelude::*;
use std::fmt;
use std::path::PathBuf;
use std::sync::{
    Arc, Mutex,
    mpsc::{Receiver, Sender},
};

use crate::config::NeoFeedConfig;
use crate::orbital::RawElementRecord;

/// Commands for the loader worker thread. Each carries the simulation
/// generation it was issued under.
#[derive(Debug)]
pub enum LoadCommand {
    File {
        path: PathBuf,
        generation: u64,
    },
    NeoFeed {
        feed: NeoFeedConfig,
        page: u32,
        generation: u64,
    },
}

/// Where a batch came from, for logs and the HUD.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadSource {
    File(PathBuf),
    NeoFeed { page: u32 },
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::NeoFeed { page } => write!(f, "NeoWs page {}", page),
        }
    }
}

/// Results from the loader worker thread
#[derive(Debug)]
pub enum LoadResultMsg {
    Batch {
        source: LoadSource,
        generation: u64,
        records: Vec<RawElementRecord>,
    },
    Failure {
        source: LoadSource,
        generation: u64,
        error: String,
    },
}

/// Resource containing channels for communicating with the loader thread
#[derive(Resource)]
pub struct LoaderChannels {
    pub cmd_tx: Sender<LoadCommand>,
    pub res_rx: Arc<Mutex<Receiver<LoadResultMsg>>>,
}

/// Loader bookkeeping shown in the HUD.
#[derive(Resource, Debug, Default)]
pub struct CatalogState {
    /// Loads queued and not yet answered
    pub pending: usize,
    pub bodies_added: usize,
    /// Records that superseded an already tracked body
    pub bodies_replaced: usize,
    pub records_rejected: usize,
    pub batches_discarded: usize,
    pub last_error: Option<String>,
    /// Drop every body and load the catalog again on the next update
    pub reload_requested: bool,
}
