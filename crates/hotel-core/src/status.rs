//! Reservation lifecycle state machine.
//!
//! ```text
//! Pending ──> Confirmed ──> CheckedIn ──> CheckedOut
//!    │            │
//!    └────────────┴──> Cancelled
//! ```
//!
//! `CheckedOut` and `Cancelled` are terminal. A reservation holds its
//! rooms only while it is *active* (Pending, Confirmed or CheckedIn),
//! so moving into a terminal state is what releases them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HotelError, HotelResult};

/// Status of a reservation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl ReservationStatus {
    /// States reachable in one step from `self`.
    pub fn allowed_transitions(self) -> &'static [ReservationStatus] {
        use ReservationStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[CheckedIn, Cancelled],
            CheckedIn => &[CheckedOut],
            CheckedOut | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, to: ReservationStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Validate a transition, returning the new state.
    pub fn transition(self, to: ReservationStatus) -> HotelResult<ReservationStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(HotelError::InvalidTransition { from: self, to })
        }
    }

    /// Whether a reservation in this state occupies its rooms.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ReservationStatus::Pending | ReservationStatus::Confirmed | ReservationStatus::CheckedIn
        )
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::CheckedIn => "CheckedIn",
            ReservationStatus::CheckedOut => "CheckedOut",
            ReservationStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
