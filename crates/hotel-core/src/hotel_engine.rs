//! Reservation engine orchestrator.
//!
//! Owns the [`InventoryStore`] and processes one [`Command`] at a time:
//! - routes bookings to the allocation engine,
//! - runs lifecycle transitions through the state machine,
//! - produces bills at checkout,
//! - answers read-only queries.
//!
//! Every method takes `&mut self` for the full check-then-write
//! sequence, so whoever owns the engine serializes all allocations and
//! transitions. A method that returns an error has not modified the
//! store.

use chrono::{NaiveDate, Utc};

use crate::allocation::{self, Allocation, AllocationRequest, RoomRequest};
use crate::billing;
use crate::error::{HotelError, HotelResult};
use crate::ids::{GuestId, ReservationId, RoomId};
use crate::messages::{Command, Reply};
use crate::model::{Bill, Guest, NewGuest, NewReservation, Reservation};
use crate::overlap::is_room_free;
use crate::report::{self, OccupancyReport};
use crate::room_type::RoomType;
use crate::status::ReservationStatus;
use crate::stay::StayRange;
use crate::store::InventoryStore;

/// Default tax rate: 10 %.
pub const DEFAULT_TAX_RATE_BP: u32 = 1_000;

/// Single-owner reservation engine.
#[derive(Debug, Clone)]
pub struct HotelEngine {
    store: InventoryStore,

    /// Tax rate applied to bills, in basis points.
    tax_rate_bp: u32,
}

impl Default for HotelEngine {
    fn default() -> Self {
        HotelEngine::new(InventoryStore::new(), DEFAULT_TAX_RATE_BP)
    }
}

impl HotelEngine {
    pub fn new(store: InventoryStore, tax_rate_bp: u32) -> Self {
        HotelEngine { store, tax_rate_bp }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    /// Administrative access for provisioning.
    pub fn store_mut(&mut self) -> &mut InventoryStore {
        &mut self.store
    }

    pub fn tax_rate_bp(&self) -> u32 {
        self.tax_rate_bp
    }

    /// Process a single command.
    pub fn process_command(&mut self, cmd: Command) -> HotelResult<Reply> {
        match cmd {
            Command::RegisterGuest(guest) => Ok(Reply::GuestRegistered(self.register_guest(guest))),
            Command::SearchGuests { query } => Ok(Reply::Guests(self.search_guests(&query))),
            Command::RecordFeedback { guest_id, feedback } => {
                self.store.set_guest_feedback(guest_id, feedback)?;
                Ok(Reply::Done)
            }
            Command::ListReservations { guest_id } => {
                Ok(Reply::Reservations(self.list_reservations(guest_id)))
            }
            Command::GetReservation(id) => {
                Ok(Reply::Reservation(self.store.require_reservation(id)?.clone()))
            }
            Command::Book(request) => self.book(&request).map(Reply::Booked),
            Command::Confirm(id) => self.status_reply(id, ReservationStatus::Confirmed, |e| {
                e.confirm(id)
            }),
            Command::CheckIn {
                reservation_id,
                today,
            } => self.status_reply(reservation_id, ReservationStatus::CheckedIn, |e| {
                e.check_in(reservation_id, today)
            }),
            Command::CheckOut(id) => {
                let bill = self.check_out(id)?;
                Ok(Reply::CheckedOut {
                    reservation_id: id,
                    bill,
                })
            }
            Command::Cancel(id) => {
                self.status_reply(id, ReservationStatus::Cancelled, |e| e.cancel(id))
            }
            Command::ModifyStay {
                reservation_id,
                stay,
            } => {
                self.modify_stay(reservation_id, stay)?;
                Ok(Reply::Reservation(
                    self.store.require_reservation(reservation_id)?.clone(),
                ))
            }
            Command::ApplyDiscount {
                reservation_id,
                discount,
            } => self.apply_discount(reservation_id, discount).map(Reply::Bill),
            Command::SettleBill(id) => self.settle_bill(id).map(Reply::Bill),
            Command::ListRooms => Ok(Reply::Rooms(self.store.rooms().cloned().collect())),
            Command::SetRoomPrice { room_id, price } => {
                self.store.set_room_price(room_id, price)?;
                Ok(Reply::Done)
            }
            Command::SetRoomAvailability { room_id, available } => {
                self.store.set_room_available(room_id, available)?;
                Ok(Reply::Done)
            }
            Command::Report { date } => self.report(date).map(Reply::Report),
        }
    }

    // -------------------------------------------------------------------------
    // Guests
    // -------------------------------------------------------------------------

    pub fn register_guest(&mut self, guest: NewGuest) -> GuestId {
        self.store.add_guest(guest)
    }

    /// Guests matching `query`: an exact id if it parses as one,
    /// otherwise a case-insensitive name substring.
    pub fn search_guests(&self, query: &str) -> Vec<Guest> {
        if let Ok(id) = query.trim().parse::<u64>() {
            return self.store.guest(GuestId(id)).cloned().into_iter().collect();
        }
        self.store
            .guests()
            .filter(|g| g.name_matches(query))
            .cloned()
            .collect()
    }

    // -------------------------------------------------------------------------
    // Reservations
    // -------------------------------------------------------------------------

    pub fn list_reservations(&self, guest_id: Option<GuestId>) -> Vec<Reservation> {
        self.store
            .reservations()
            .filter(|r| guest_id.map_or(true, |g| r.guest_id == g))
            .cloned()
            .collect()
    }

    /// Allocate rooms and create the reservation atomically.
    pub fn book(&mut self, request: &AllocationRequest) -> HotelResult<Allocation> {
        allocation::allocate(&mut self.store, request, Utc::now())
    }

    /// Kiosk entry point: one room of `room_type`.
    pub fn create_reservation(
        &mut self,
        reservation: &NewReservation,
        room_type: RoomType,
    ) -> HotelResult<ReservationId> {
        let request = AllocationRequest::from_new(
            reservation,
            RoomRequest::Single {
                room_type,
                quantity: 1,
            },
        )?;
        Ok(self.book(&request)?.reservation_id)
    }

    /// Kiosk entry point: several rooms, possibly of different types.
    pub fn create_reservation_with_rooms(
        &mut self,
        reservation: &NewReservation,
        room_requests: std::collections::BTreeMap<RoomType, u32>,
    ) -> HotelResult<ReservationId> {
        let request = AllocationRequest::from_new(reservation, RoomRequest::Mixed(room_requests))?;
        Ok(self.book(&request)?.reservation_id)
    }

    pub fn confirm(&mut self, id: ReservationId) -> HotelResult<ReservationStatus> {
        self.transition(id, ReservationStatus::Confirmed)
    }

    /// Check a confirmed reservation in. The stay must have started
    /// (`check_in <= today`).
    pub fn check_in(&mut self, id: ReservationId, today: NaiveDate) -> HotelResult<ReservationStatus> {
        let reservation = self.store.require_reservation(id)?;
        reservation
            .status
            .transition(ReservationStatus::CheckedIn)?;
        if reservation.stay.check_in() > today {
            return Err(HotelError::validation(format!(
                "reservation {} cannot check in before {}",
                id,
                reservation.stay.check_in()
            )));
        }
        self.transition(id, ReservationStatus::CheckedIn)
    }

    /// Check out, releasing the rooms and producing the bill.
    pub fn check_out(&mut self, id: ReservationId) -> HotelResult<Bill> {
        let reservation = self.store.require_reservation(id)?;
        reservation
            .status
            .transition(ReservationStatus::CheckedOut)?;
        let amounts = billing::compute(reservation, self.tax_rate_bp);

        self.transition(id, ReservationStatus::CheckedOut)?;
        Ok(self.store.insert_bill(id, amounts.subtotal, amounts.tax, 0))
    }

    /// Cancel a Pending or Confirmed reservation, releasing its rooms.
    pub fn cancel(&mut self, id: ReservationId) -> HotelResult<ReservationStatus> {
        self.transition(id, ReservationStatus::Cancelled)
    }

    /// Validate and write a status change. Returns the previous status.
    fn transition(&mut self, id: ReservationId, to: ReservationStatus) -> HotelResult<ReservationStatus> {
        let reservation = self.store.reservation_mut(id)?;
        let from = reservation.status;
        reservation.status = from.transition(to)?;
        Ok(from)
    }

    fn status_reply<F>(&mut self, id: ReservationId, to: ReservationStatus, op: F) -> HotelResult<Reply>
    where
        F: FnOnce(&mut Self) -> HotelResult<ReservationStatus>,
    {
        let from = op(self)?;
        Ok(Reply::StatusChanged {
            reservation_id: id,
            from,
            to,
        })
    }

    /// Move an active, not yet checked-in reservation to new dates.
    ///
    /// Every linked room must be free for the new stay, ignoring the
    /// reservation itself; otherwise nothing changes.
    pub fn modify_stay(&mut self, id: ReservationId, stay: StayRange) -> HotelResult<()> {
        let reservation = self.store.require_reservation(id)?;
        if !matches!(
            reservation.status,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        ) {
            return Err(HotelError::validation(format!(
                "reservation {} is {} and can no longer change dates",
                id, reservation.status
            )));
        }

        let blocked: Vec<RoomId> = reservation
            .room_ids()
            .filter(|room_id| !is_room_free(&self.store, *room_id, &stay, Some(id)))
            .collect();
        if let Some(room_id) = blocked.first() {
            let room_type = self
                .store
                .room(*room_id)
                .map(|r| r.room_type)
                .unwrap_or(RoomType::Single);
            return Err(HotelError::InsufficientInventory {
                room_type,
                requested: 1,
                available: 0,
            });
        }

        self.store.reservation_mut(id)?.stay = stay;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Bills
    // -------------------------------------------------------------------------

    /// Add `discount` cents to the open bill of a checked-out reservation.
    pub fn apply_discount(&mut self, id: ReservationId, discount: u64) -> HotelResult<Bill> {
        if discount == 0 {
            return Err(HotelError::validation("discount must be positive"));
        }
        self.store.require_reservation(id)?;
        let bill = self.store.bill_for_mut(id)?;
        if bill.paid {
            return Err(HotelError::validation(format!(
                "bill for reservation {} is already paid",
                id
            )));
        }
        bill.discount = bill.discount.saturating_add(discount);
        bill.amount = billing::amount_due(bill.subtotal, bill.tax, bill.discount);
        Ok(bill.clone())
    }

    pub fn settle_bill(&mut self, id: ReservationId) -> HotelResult<Bill> {
        let bill = self.store.bill_for_mut(id)?;
        if bill.paid {
            return Err(HotelError::validation(format!(
                "bill for reservation {} is already paid",
                id
            )));
        }
        bill.paid = true;
        Ok(bill.clone())
    }

    pub fn report(&self, date: NaiveDate) -> HotelResult<OccupancyReport> {
        report::occupancy_report(&self.store, date)
    }
}
