//! In-memory inventory store.
//!
//! Sole owner of durable state: rooms, reservations (with their room
//! links), guests and bills. Every table is a `BTreeMap` keyed by id,
//! so iteration is in ascending id order, which the allocation engine
//! relies on for deterministic room selection.
//!
//! The store itself does no locking. It is owned by exactly one
//! [`HotelEngine`](crate::hotel_engine::HotelEngine), and callers that
//! share it across tasks must funnel access through a single writer.
//! The whole store derives `Serialize`/`Deserialize` so the server can
//! snapshot it to disk.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HotelError, HotelResult};
use crate::ids::{BillId, GuestId, LinkId, ReservationId, RoomId};
use crate::model::{Bill, Guest, NewGuest, Reservation, ReservationRoom, Room};
use crate::room_type::RoomType;
use crate::status::ReservationStatus;
use crate::stay::StayRange;

/// A room chosen for a reservation, ready to be linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDraft {
    pub room_id: RoomId,
    pub guests_in_room: u32,
    pub price_per_night: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IdCounters {
    room: u64,
    reservation: u64,
    guest: u64,
    link: u64,
    bill: u64,
}

fn bump(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Rooms, reservations, guests and bills.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryStore {
    rooms: BTreeMap<RoomId, Room>,
    reservations: BTreeMap<ReservationId, Reservation>,
    guests: BTreeMap<GuestId, Guest>,
    bills: BTreeMap<BillId, Bill>,
    next_ids: IdCounters,
}

impl InventoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        InventoryStore::default()
    }

    // -------------------------------------------------------------------------
    // Rooms
    // -------------------------------------------------------------------------

    /// Add a single room and return its id.
    pub fn add_room(&mut self, room_type: RoomType, price: u64, floor: u16) -> RoomId {
        let id = RoomId(bump(&mut self.next_ids.room));
        self.rooms.insert(
            id,
            Room {
                id,
                room_type,
                price,
                floor,
                structurally_available: true,
            },
        );
        id
    }

    /// Provision `count` rooms of `room_type` at base price on the
    /// type's default floor.
    pub fn provision(&mut self, room_type: RoomType, count: u32) -> Vec<RoomId> {
        (0..count)
            .map(|_| self.add_room(room_type, room_type.base_price(), room_type.default_floor()))
            .collect()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    /// All rooms in ascending id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Rooms of one type in ascending id order.
    pub fn rooms_of_type(&self, room_type: RoomType) -> impl Iterator<Item = &Room> {
        self.rooms.values().filter(move |r| r.room_type == room_type)
    }

    pub fn set_room_price(&mut self, id: RoomId, price: u64) -> HotelResult<()> {
        if price == 0 {
            return Err(HotelError::validation("room price must be positive"));
        }
        self.room_mut(id)?.price = price;
        Ok(())
    }

    pub fn set_room_available(&mut self, id: RoomId, available: bool) -> HotelResult<()> {
        self.room_mut(id)?.structurally_available = available;
        Ok(())
    }

    fn room_mut(&mut self, id: RoomId) -> HotelResult<&mut Room> {
        self.rooms
            .get_mut(&id)
            .ok_or(HotelError::NotFound {
                entity: "room",
                id: id.0,
            })
    }

    // -------------------------------------------------------------------------
    // Guests
    // -------------------------------------------------------------------------

    pub fn add_guest(&mut self, guest: NewGuest) -> GuestId {
        let id = GuestId(bump(&mut self.next_ids.guest));
        self.guests.insert(
            id,
            Guest {
                id,
                first_name: guest.first_name,
                last_name: guest.last_name,
                email: guest.email,
                phone: guest.phone,
                feedback: None,
            },
        );
        id
    }

    pub fn guest(&self, id: GuestId) -> Option<&Guest> {
        self.guests.get(&id)
    }

    pub fn guests(&self) -> impl Iterator<Item = &Guest> {
        self.guests.values()
    }

    pub fn set_guest_feedback(&mut self, id: GuestId, feedback: String) -> HotelResult<()> {
        let guest = self.guests.get_mut(&id).ok_or(HotelError::NotFound {
            entity: "guest",
            id: id.0,
        })?;
        guest.feedback = Some(feedback);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reservations
    // -------------------------------------------------------------------------

    pub fn reservation(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations.get(&id)
    }

    /// Like [`reservation`](Self::reservation) but maps a miss to
    /// `HotelError::NotFound`.
    pub fn require_reservation(&self, id: ReservationId) -> HotelResult<&Reservation> {
        self.reservations.get(&id).ok_or(HotelError::NotFound {
            entity: "reservation",
            id: id.0,
        })
    }

    pub(crate) fn reservation_mut(&mut self, id: ReservationId) -> HotelResult<&mut Reservation> {
        self.reservations.get_mut(&id).ok_or(HotelError::NotFound {
            entity: "reservation",
            id: id.0,
        })
    }

    /// All reservations in ascending id order.
    pub fn reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.values()
    }

    /// Insert a reservation together with one link per drafted room.
    ///
    /// This is the commit step of an allocation; the caller has
    /// already verified that every drafted room is free.
    pub(crate) fn insert_reservation(
        &mut self,
        guest_id: GuestId,
        stay: StayRange,
        party_size: u32,
        status: ReservationStatus,
        created_at: DateTime<Utc>,
        drafts: &[LinkDraft],
    ) -> ReservationId {
        let id = ReservationId(bump(&mut self.next_ids.reservation));
        let rooms = drafts
            .iter()
            .map(|draft| ReservationRoom {
                id: LinkId(bump(&mut self.next_ids.link)),
                reservation_id: id,
                room_id: draft.room_id,
                guests_in_room: draft.guests_in_room,
                price_per_night: draft.price_per_night,
            })
            .collect();

        self.reservations.insert(
            id,
            Reservation {
                id,
                guest_id,
                stay,
                party_size,
                status,
                created_at,
                rooms,
            },
        );
        id
    }

    /// Total number of room links across every reservation.
    pub fn link_count(&self) -> usize {
        self.reservations.values().map(|r| r.rooms.len()).sum()
    }

    // -------------------------------------------------------------------------
    // Bills
    // -------------------------------------------------------------------------

    pub(crate) fn insert_bill(
        &mut self,
        reservation_id: ReservationId,
        subtotal: u64,
        tax: u64,
        discount: u64,
    ) -> Bill {
        let id = BillId(bump(&mut self.next_ids.bill));
        let bill = Bill {
            id,
            reservation_id,
            subtotal,
            tax,
            discount,
            amount: crate::billing::amount_due(subtotal, tax, discount),
            paid: false,
        };
        self.bills.insert(id, bill.clone());
        bill
    }

    pub fn bill_for(&self, reservation_id: ReservationId) -> Option<&Bill> {
        self.bills
            .values()
            .find(|b| b.reservation_id == reservation_id)
    }

    pub(crate) fn bill_for_mut(&mut self, reservation_id: ReservationId) -> HotelResult<&mut Bill> {
        self.bills
            .values_mut()
            .find(|b| b.reservation_id == reservation_id)
            .ok_or(HotelError::NotFound {
                entity: "bill for reservation",
                id: reservation_id.0,
            })
    }

    pub fn bills(&self) -> impl Iterator<Item = &Bill> {
        self.bills.values()
    }
}
