//! Command types consumed by the engine.
//!
//! These are **transport-agnostic** logical messages:
//! - [`Command`]: what the engine consumes.
//! - [`Reply`]: what the engine produces on success.
//!
//! Errors travel separately as [`HotelError`](crate::error::HotelError).
//! The line protocol lives in the `hotel-protocol` crate; this module
//! is purely logical.

use chrono::NaiveDate;

use crate::allocation::{Allocation, AllocationRequest};
use crate::ids::{GuestId, ReservationId, RoomId};
use crate::model::{Bill, Guest, NewGuest, Reservation, Room};
use crate::report::OccupancyReport;
use crate::status::ReservationStatus;
use crate::stay::StayRange;

/// A request into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RegisterGuest(NewGuest),

    /// Look a guest up by numeric id or by name substring.
    SearchGuests { query: String },

    RecordFeedback { guest_id: GuestId, feedback: String },

    /// All reservations, or those of one guest.
    ListReservations { guest_id: Option<GuestId> },

    GetReservation(ReservationId),

    /// Allocate rooms and create a reservation.
    Book(AllocationRequest),

    Confirm(ReservationId),

    /// `today` is supplied by the caller so the engine stays clock-free.
    CheckIn {
        reservation_id: ReservationId,
        today: NaiveDate,
    },

    CheckOut(ReservationId),

    Cancel(ReservationId),

    /// Move a Pending/Confirmed reservation to new dates, keeping its rooms.
    ModifyStay {
        reservation_id: ReservationId,
        stay: StayRange,
    },

    /// Subtract `discount` cents from the reservation's open bill.
    ApplyDiscount {
        reservation_id: ReservationId,
        discount: u64,
    },

    SettleBill(ReservationId),

    ListRooms,

    SetRoomPrice { room_id: RoomId, price: u64 },

    SetRoomAvailability { room_id: RoomId, available: bool },

    /// Occupancy report for the night of `date`.
    Report { date: NaiveDate },
}

impl Command {
    /// Whether processing this command can change the store.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Command::SearchGuests { .. }
                | Command::ListReservations { .. }
                | Command::GetReservation(_)
                | Command::ListRooms
                | Command::Report { .. }
        )
    }
}

/// A successful engine result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    GuestRegistered(GuestId),

    Guests(Vec<Guest>),

    Reservations(Vec<Reservation>),

    Reservation(Reservation),

    Booked(Allocation),

    StatusChanged {
        reservation_id: ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    },

    /// Check-out moved the reservation to `CheckedOut` and produced a bill.
    CheckedOut {
        reservation_id: ReservationId,
        bill: Bill,
    },

    Bill(Bill),

    Rooms(Vec<Room>),

    Report(OccupancyReport),

    /// Mutation with nothing to report back.
    Done,
}
