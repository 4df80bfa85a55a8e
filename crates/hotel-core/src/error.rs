//! Error types for the reservation engine.
//!
//! Every engine operation returns a typed [`HotelError`]; none of them
//! is used for normal control flow. Only
//! [`HotelError::StoreUnavailable`] is safe to retry blindly, because
//! no operation ever commits partially.

use thiserror::Error;

use crate::room_type::RoomType;
use crate::status::ReservationStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotelError {
    /// Malformed input, rejected before touching the store.
    #[error("validation error: {0}")]
    Validation(String),

    /// A requested room type cannot supply the requested quantity.
    #[error("insufficient inventory for {room_type}: requested {requested}, available {available}")]
    InsufficientInventory {
        room_type: RoomType,
        requested: u32,
        available: u32,
    },

    /// Reservation lifecycle violation.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// The store did not answer in time, or is gone.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl HotelError {
    pub fn validation(message: impl Into<String>) -> Self {
        HotelError::Validation(message.into())
    }

    /// Whether repeating the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HotelError::StoreUnavailable(_))
    }
}

/// Convenience alias used across the engine.
pub type HotelResult<T> = Result<T, HotelError>;
