//! Central engine loop.
//!
//! This task owns the `HotelEngine` instance and processes all
//! `EngineRequest`s coming from admin sessions and the in-process
//! kiosk path, one at a time. Being the only writer is what makes each
//! allocation and each lifecycle transition atomic: no other request
//! can observe the store between its availability check and its commit.
//!
//! After every successful mutating command the store is snapshotted
//! (if a data file is configured) before the caller gets its answer.
//! A mutation whose caller stopped waiting is undone, so a caller that
//! saw `StoreUnavailable` can retry without booking twice.

use hotel_core::{HotelEngine, InventoryStore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::handle::EngineHandle;
use crate::snapshot::SnapshotFile;
use crate::types::{EngineRequest, EngineRx};

/// Build the engine from the configured snapshot, or provision a fresh
/// inventory when there is none.
pub async fn load_engine(config: &Config) -> anyhow::Result<HotelEngine> {
    let snapshot = config.data_file.as_ref().map(SnapshotFile::new);

    let store = match &snapshot {
        Some(file) => file.load().await?,
        None => None,
    };

    let store = match store {
        Some(store) => {
            info!(
                rooms = store.rooms().count(),
                reservations = store.reservations().count(),
                "Loaded inventory snapshot"
            );
            store
        }
        None => {
            let mut store = InventoryStore::new();
            for entry in &config.inventory {
                store.provision(entry.room_type, entry.count);
            }
            info!(rooms = store.rooms().count(), "Provisioned fresh inventory");
            store
        }
    };

    Ok(HotelEngine::new(store, config.tax_rate_bp))
}

/// Spawn the engine task and return a handle for submitting commands.
///
/// The task ends once every `EngineHandle` clone has been dropped.
pub fn spawn_engine(
    engine: HotelEngine,
    snapshot: Option<SnapshotFile>,
    config: &Config,
) -> (EngineHandle, JoinHandle<()>) {
    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_engine_loop(engine, engine_rx, snapshot));
    (EngineHandle::new(engine_tx, config.store_timeout()), task)
}

/// Run the central engine processing loop.
///
/// - `engine_rx`: receives requests from every front end.
/// - `snapshot`: where to persist the store after mutations, if anywhere.
pub async fn run_engine_loop(
    mut engine: HotelEngine,
    mut engine_rx: EngineRx,
    snapshot: Option<SnapshotFile>,
) {
    while let Some(req) = engine_rx.recv().await {
        let EngineRequest {
            origin,
            command,
            reply_tx,
        } = req;

        // The caller timed out or went away; do not commit on its behalf.
        if reply_tx.is_closed() {
            warn!(%origin, ?command, "Dropping request abandoned by caller");
            continue;
        }

        let before = command.is_mutating().then(|| engine.store().clone());
        debug!(%origin, ?command, "Processing command");
        let result = engine.process_command(command);

        let committed = match &result {
            Ok(_) => before,
            Err(e) => {
                debug!(%origin, "Command rejected: {}", e);
                None
            }
        };
        if committed.is_some() {
            save_snapshot(&snapshot, &engine).await;
        }

        if reply_tx.send(result).is_err() {
            match committed {
                Some(before) => {
                    warn!(%origin, "Requester gone before reply; rolling back");
                    *engine.store_mut() = before;
                    save_snapshot(&snapshot, &engine).await;
                }
                None => debug!(%origin, "Requester gone before reply"),
            }
        }
    }

    info!("Engine loop shutting down (engine_rx closed)");
}

async fn save_snapshot(snapshot: &Option<SnapshotFile>, engine: &HotelEngine) {
    if let Some(file) = snapshot {
        if let Err(e) = file.save(engine.store()).await {
            error!(path = %file.path().display(), "Snapshot write failed: {:#}", e);
        }
    }
}
