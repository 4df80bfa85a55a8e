//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections and assigns each a `SessionId`.
//! - Serves at most `max_clients` sessions at once. Further connections
//!   wait in a bounded queue (told `SERVER_BUSY`) until a slot frees up;
//!   past `max_queued` they are told `SERVER_FULL` and closed.
//! - On shutdown, stops accepting, lets open sessions finish for the
//!   grace period, then aborts what is left.
//!
//! The per-session protocol lives in `session`, the engine loop in
//! `engine_task`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hotel_protocol::wire_types::{SERVER_BUSY, SERVER_FULL, SERVER_SHUTTING_DOWN};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::handle::EngineHandle;
use crate::session;
use crate::types::SessionId;
use crate::wait_for_shutdown;

/// Bound listener, ready to serve admin sessions.
pub struct Server {
    listener: TcpListener,
    engine: EngineHandle,
    config: Arc<Config>,
    next_session_id: u64,
}

impl Server {
    pub async fn bind(config: Config, engine: EngineHandle) -> anyhow::Result<Self> {
        let addr = config.socket_addr_string();
        let listener = TcpListener::bind(&addr).await?;
        info!(
            addr = %listener.local_addr()?,
            max_clients = config.max_clients,
            max_queued = config.max_queued,
            "Listening"
        );
        Ok(Server {
            listener,
            engine,
            config: Arc::new(config),
            next_session_id: 1,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    fn next_session_id(&mut self) -> SessionId {
        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        id
    }

    /// Accept connections until `shutdown` flips to `true`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let max_clients = self.config.max_clients.max(1);
        let slots = Arc::new(Semaphore::new(max_clients));
        let queued = Arc::new(AtomicUsize::new(0));
        let mut sessions: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => break,

                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            error!("Session task panicked: {}", e);
                        }
                    }
                }

                accepted = self.listener.accept() => {
                    let (stream, peer_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!("Accept failed: {}", e);
                            continue;
                        }
                    };
                    let session_id = self.next_session_id();
                    let ctx = SessionContext {
                        session_id,
                        engine: self.engine.clone(),
                        config: self.config.clone(),
                        shutdown: shutdown.clone(),
                    };

                    match slots.clone().try_acquire_owned() {
                        Ok(permit) => {
                            info!(session = %session_id, peer = %peer_addr, "Accepted connection");
                            sessions.spawn(ctx.serve(stream, permit));
                        }
                        Err(_) if queued.load(Ordering::SeqCst) >= self.config.max_queued => {
                            warn!(
                                peer = %peer_addr,
                                max_clients,
                                max_queued = self.config.max_queued,
                                "Rejecting connection: server full"
                            );
                            sessions.spawn(reject(stream));
                        }
                        Err(_) => {
                            let waiting = queued.fetch_add(1, Ordering::SeqCst) + 1;
                            info!(session = %session_id, peer = %peer_addr, waiting, "Connection queued");
                            sessions.spawn(ctx.wait_then_serve(stream, slots.clone(), queued.clone()));
                        }
                    }
                }
            }
        }

        drop(self.listener);
        let grace = self.config.shutdown_grace();
        info!(open = sessions.len(), ?grace, "Shutting down, draining sessions");

        let drained = tokio::time::timeout(grace, async {
            while sessions.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(open = sessions.len(), "Grace period elapsed, aborting sessions");
            sessions.abort_all();
            while sessions.join_next().await.is_some() {}
        }

        info!("Listener stopped");
        Ok(())
    }
}

/// Everything one session task needs besides its socket.
struct SessionContext {
    session_id: SessionId,
    engine: EngineHandle,
    config: Arc<Config>,
    shutdown: watch::Receiver<bool>,
}

impl SessionContext {
    /// Serve while holding a slot; the slot frees when this returns.
    async fn serve(self, stream: TcpStream, _permit: OwnedSemaphorePermit) {
        let id = self.session_id;
        match session::serve_tcp(id, stream, self.engine, self.config, self.shutdown).await {
            Ok(()) => info!(session = %id, "Session closed"),
            Err(e) => warn!(session = %id, "Session ended with error: {:#}", e),
        }
    }

    async fn wait_then_serve(
        mut self,
        mut stream: TcpStream,
        slots: Arc<Semaphore>,
        queued: Arc<AtomicUsize>,
    ) {
        let id = self.session_id;
        if let Err(e) = write_line(&mut stream, SERVER_BUSY).await {
            queued.fetch_sub(1, Ordering::SeqCst);
            debug!(session = %id, "Queued client went away: {}", e);
            return;
        }

        let permit = tokio::select! {
            permit = slots.acquire_owned() => permit.ok(),
            _ = wait_for_shutdown(&mut self.shutdown) => None,
        };
        queued.fetch_sub(1, Ordering::SeqCst);

        match permit {
            Some(permit) => {
                info!(session = %id, "Queued connection admitted");
                self.serve(stream, permit).await;
            }
            None => {
                write_line(&mut stream, SERVER_SHUTTING_DOWN).await.ok();
                stream.shutdown().await.ok();
            }
        }
    }
}

async fn reject(mut stream: TcpStream) {
    write_line(&mut stream, SERVER_FULL).await.ok();
    stream.shutdown().await.ok();
}

async fn write_line(stream: &mut TcpStream, line: &str) -> std::io::Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await
}
