//! Durable records held by the inventory store.
//!
//! All prices are integer cents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BillId, GuestId, LinkId, ReservationId, RoomId};
use crate::room_type::RoomType;
use crate::status::ReservationStatus;
use crate::stay::StayRange;

/// A physical room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub room_type: RoomType,

    /// Current nightly price; may diverge from `room_type.base_price()`.
    pub price: u64,

    pub floor: u16,

    /// `false` when the room is administratively out of service,
    /// independent of any booking.
    pub structurally_available: bool,
}

/// Association of one reservation with one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRoom {
    pub id: LinkId,
    pub reservation_id: ReservationId,
    pub room_id: RoomId,
    pub guests_in_room: u32,

    /// Room price captured at booking time, so later price changes do
    /// not alter historical bills.
    pub price_per_night: u64,
}

/// A reservation and its room links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub guest_id: GuestId,
    pub stay: StayRange,
    pub party_size: u32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub rooms: Vec<ReservationRoom>,
}

impl Reservation {
    pub fn room_ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.iter().map(|link| link.room_id)
    }

    /// Whether this reservation currently holds `room_id` for a stay
    /// overlapping `stay`.
    pub fn holds(&self, room_id: RoomId, stay: &StayRange) -> bool {
        self.status.is_active()
            && self.stay.overlaps(stay)
            && self.rooms.iter().any(|link| link.room_id == room_id)
    }

    /// Sum of the captured nightly prices over all linked rooms.
    pub fn nightly_total(&self) -> u64 {
        self.rooms.iter().map(|link| link.price_per_night).sum()
    }
}

/// Booking request as submitted by a front end, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub guest_id: GuestId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub party_size: u32,

    /// `Pending` or `Confirmed`.
    pub status: ReservationStatus,
}

/// A registered guest. Contact fields are stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: GuestId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub feedback: Option<String>,
}

impl Guest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive substring match on first, last or full name.
    pub fn name_matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        self.full_name().to_lowercase().contains(&query)
    }
}

/// Guest registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Bill produced at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub reservation_id: ReservationId,
    pub subtotal: u64,
    pub tax: u64,
    pub discount: u64,

    /// `subtotal + tax - discount`, floored at zero.
    pub amount: u64,

    pub paid: bool,
}
