//! hotel-server
//!
//! Multi-client async TCP admin console for the hotel reservation
//! engine, plus the in-process [`EngineHandle`] used by the kiosk
//! booking path. Both front ends funnel into one engine task.

pub mod config;
pub mod engine_task;
pub mod handle;
pub mod server;
pub mod session;
pub mod snapshot;
pub mod types;

pub use config::Config;
pub use engine_task::{load_engine, spawn_engine};
pub use handle::EngineHandle;
pub use server::Server;

use tokio::sync::watch;

/// Resolves once the shutdown flag is set. Never resolves if the
/// sender is dropped without signalling.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
