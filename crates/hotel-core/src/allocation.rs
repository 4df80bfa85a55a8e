//! Allocation engine.
//!
//! Turns a booking request (date range + room types and quantities +
//! party size) into concrete rooms and commits the reservation.
//!
//! Selection policy:
//! - room types are served in `RoomType` declaration order;
//! - within a type, the first N structurally available rooms that the
//!   overlap checker reports free, in ascending room id order.
//!
//! The whole request is checked before anything is written: if any
//! type is short, the call fails with `InsufficientInventory` and the
//! store is untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{HotelError, HotelResult};
use crate::ids::{GuestId, ReservationId, RoomId};
use crate::model::NewReservation;
use crate::overlap::free_rooms;
use crate::room_type::RoomType;
use crate::status::ReservationStatus;
use crate::stay::StayRange;
use crate::store::{InventoryStore, LinkDraft};

/// Which rooms a booking asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomRequest {
    /// `quantity` rooms of one type.
    Single { room_type: RoomType, quantity: u32 },

    /// Several types at once, e.g. `{Double: 1, Single: 2}`.
    Mixed(BTreeMap<RoomType, u32>),
}

impl RoomRequest {
    /// Requested quantity per type.
    pub fn quantities(&self) -> BTreeMap<RoomType, u32> {
        match self {
            RoomRequest::Single {
                room_type,
                quantity,
            } => BTreeMap::from([(*room_type, *quantity)]),
            RoomRequest::Mixed(map) => map.clone(),
        }
    }

    /// Total guests the requested rooms can hold, or `None` when the
    /// quantities are too large to count.
    pub fn capacity(&self) -> Option<u32> {
        self.quantities()
            .iter()
            .try_fold(0u32, |total, (t, q)| {
                t.max_occupancy().checked_mul(*q)?.checked_add(total)
            })
    }
}

/// A validated-at-commit booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRequest {
    pub guest_id: GuestId,
    pub stay: StayRange,
    pub rooms: RoomRequest,
    pub party_size: u32,

    /// Status the reservation is created in: `Pending` or `Confirmed`.
    pub initial_status: ReservationStatus,
}

impl AllocationRequest {
    /// Build a request from a front-end booking, validating the dates.
    pub fn from_new(new: &NewReservation, rooms: RoomRequest) -> HotelResult<Self> {
        Ok(AllocationRequest {
            guest_id: new.guest_id,
            stay: StayRange::new(new.check_in, new.check_out)?,
            rooms,
            party_size: new.party_size,
            initial_status: new.status,
        })
    }
}

/// One room handed out by a successful allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatedRoom {
    pub room_id: RoomId,
    pub room_type: RoomType,
    pub guests: u32,
    pub price_per_night: u64,
}

/// Result of a committed allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub reservation_id: ReservationId,
    pub rooms: Vec<AllocatedRoom>,
}

/// Check and commit a booking in one step.
///
/// On success the reservation and all of its room links exist in the
/// store; on any error nothing has been written.
pub fn allocate(
    store: &mut InventoryStore,
    request: &AllocationRequest,
    now: DateTime<Utc>,
) -> HotelResult<Allocation> {
    let quantities = validate(store, request)?;
    let selected = select_rooms(store, &quantities, &request.stay)?;

    let capacities: Vec<u32> = selected.iter().map(|r| r.room_type.max_occupancy()).collect();
    let guests = distribute_guests(request.party_size, &capacities)?;

    let rooms: Vec<AllocatedRoom> = selected
        .into_iter()
        .zip(guests)
        .map(|(room, guests)| AllocatedRoom { guests, ..room })
        .collect();

    let drafts: Vec<LinkDraft> = rooms
        .iter()
        .map(|r| LinkDraft {
            room_id: r.room_id,
            guests_in_room: r.guests,
            price_per_night: r.price_per_night,
        })
        .collect();

    let reservation_id = store.insert_reservation(
        request.guest_id,
        request.stay,
        request.party_size,
        request.initial_status,
        now,
        &drafts,
    );

    Ok(Allocation {
        reservation_id,
        rooms,
    })
}

/// Input checks that need no availability information.
fn validate(
    store: &InventoryStore,
    request: &AllocationRequest,
) -> HotelResult<BTreeMap<RoomType, u32>> {
    if request.party_size == 0 {
        return Err(HotelError::validation("party size must be positive"));
    }

    if !matches!(
        request.initial_status,
        ReservationStatus::Pending | ReservationStatus::Confirmed
    ) {
        return Err(HotelError::validation(format!(
            "a new reservation cannot start as {}",
            request.initial_status
        )));
    }

    let quantities = request.rooms.quantities();
    if quantities.is_empty() {
        return Err(HotelError::validation("at least one room must be requested"));
    }
    if let Some((room_type, _)) = quantities.iter().find(|(_, q)| **q == 0) {
        return Err(HotelError::validation(format!(
            "quantity for {} must be positive",
            room_type
        )));
    }

    let capacity = request
        .rooms
        .capacity()
        .ok_or_else(|| HotelError::validation("requested room quantities are too large"))?;
    if capacity < request.party_size {
        return Err(HotelError::validation(format!(
            "party of {} exceeds capacity {} of the requested rooms",
            request.party_size, capacity
        )));
    }

    if store.guest(request.guest_id).is_none() {
        return Err(HotelError::NotFound {
            entity: "guest",
            id: request.guest_id.0,
        });
    }

    Ok(quantities)
}

/// Pick concrete rooms for every requested type, or fail without
/// selecting any.
fn select_rooms(
    store: &InventoryStore,
    quantities: &BTreeMap<RoomType, u32>,
    stay: &StayRange,
) -> HotelResult<Vec<AllocatedRoom>> {
    let mut selected = Vec::new();

    for (&room_type, &requested) in quantities {
        let free = free_rooms(store, room_type, stay);
        if (free.len() as u32) < requested {
            return Err(HotelError::InsufficientInventory {
                room_type,
                requested,
                available: free.len() as u32,
            });
        }

        for room_id in free.into_iter().take(requested as usize) {
            let price_per_night = store.room(room_id).map(|r| r.price).unwrap_or_default();
            selected.push(AllocatedRoom {
                room_id,
                room_type,
                guests: 0,
                price_per_night,
            });
        }
    }

    Ok(selected)
}

/// Spread `party_size` guests over rooms with the given capacities.
///
/// Each room first gets `party_size / rooms` guests (capped at its
/// capacity); the rest are handed out in allocation order, filling
/// each room's remaining headroom before moving on.
pub fn distribute_guests(party_size: u32, capacities: &[u32]) -> HotelResult<Vec<u32>> {
    if capacities.is_empty() {
        return Err(HotelError::validation("no rooms to distribute guests over"));
    }
    let total = capacities
        .iter()
        .try_fold(0u32, |total, &cap| total.checked_add(cap))
        .unwrap_or(u32::MAX);
    if total < party_size {
        return Err(HotelError::validation(format!(
            "party of {} exceeds capacity {}",
            party_size, total
        )));
    }

    let base = party_size / capacities.len() as u32;
    let mut guests: Vec<u32> = capacities.iter().map(|&cap| base.min(cap)).collect();

    let mut left = party_size - guests.iter().sum::<u32>();
    for (assigned, &cap) in guests.iter_mut().zip(capacities) {
        if left == 0 {
            break;
        }
        let extra = (cap - *assigned).min(left);
        *assigned += extra;
        left -= extra;
    }

    Ok(guests)
}
