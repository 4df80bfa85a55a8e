//! Shared types for the admin console server.
//!
//! This module defines:
//! - `SessionId`: a lightweight handle for connected admin sessions
//! - `Origin`: who submitted an engine request
//! - `EngineRequest`: messages flowing into the engine task
//! - channel aliases between callers and the engine task

use std::fmt;

use hotel_core::{Command, HotelResult, Reply};
use tokio::sync::{mpsc, oneshot};

/// Identifier for a connected admin session.
///
/// This is intentionally opaque; we just guarantee uniqueness
/// over the lifetime of one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Front end that submitted a request; only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// In-process kiosk booking path.
    Kiosk,
    /// Admin console session.
    Session(SessionId),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Kiosk => f.write_str("kiosk"),
            Origin::Session(id) => write!(f, "session-{}", id),
        }
    }
}

/// One-shot channel carrying the engine's answer back to the caller.
pub type ReplyTx = oneshot::Sender<HotelResult<Reply>>;

/// Message flowing from a caller into the engine task.
#[derive(Debug)]
pub struct EngineRequest {
    pub origin: Origin,
    pub command: Command,
    pub reply_tx: ReplyTx,
}

/// Channel from callers → engine task.
pub type EngineTx = mpsc::UnboundedSender<EngineRequest>;
pub type EngineRx = mpsc::UnboundedReceiver<EngineRequest>;
