//! Caller side of the engine task.
//!
//! [`EngineHandle`] is the in-process entry point shared by admin
//! sessions and the kiosk booking flow. Every call is queued on the
//! same channel, so both front ends observe the same serialization.
//! Calls are bounded by the configured store timeout and fail with the
//! retryable `HotelError::StoreUnavailable` instead of hanging. A call
//! that times out never leaves its command committed.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use hotel_core::{
    Bill, Command, GuestId, HotelError, HotelResult, NewGuest, NewReservation, OccupancyReport,
    Reply, Reservation, ReservationId, ReservationStatus, RoomType,
};
use tokio::sync::oneshot;

use crate::types::{EngineRequest, EngineTx, Origin, SessionId};

/// Cloneable handle to the engine task.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: EngineTx,
    timeout: Duration,
    origin: Origin,
}

impl EngineHandle {
    pub fn new(tx: EngineTx, timeout: Duration) -> Self {
        EngineHandle {
            tx,
            timeout,
            origin: Origin::Kiosk,
        }
    }

    /// Same engine, tagged with a session for logging.
    pub fn for_session(&self, session_id: SessionId) -> Self {
        EngineHandle {
            origin: Origin::Session(session_id),
            ..self.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submit one command and wait for its result.
    pub async fn execute(&self, command: Command) -> HotelResult<Reply> {
        let (reply_tx, mut reply_rx) = oneshot::channel();
        let request = EngineRequest {
            origin: self.origin,
            command,
            reply_tx,
        };

        self.tx
            .send(request)
            .map_err(|_| HotelError::StoreUnavailable("engine task is not running".to_string()))?;

        tokio::select! {
            biased;
            reply = &mut reply_rx => reply.unwrap_or_else(|_| {
                Err(HotelError::StoreUnavailable(
                    "engine task dropped the request".to_string(),
                ))
            }),
            _ = tokio::time::sleep(self.timeout) => {
                // Closing decides the race with the engine: either its reply
                // is already here, or its send fails and it rolls back.
                reply_rx.close();
                reply_rx.try_recv().unwrap_or_else(|_| {
                    Err(HotelError::StoreUnavailable(format!(
                        "no answer within {} ms",
                        self.timeout.as_millis()
                    )))
                })
            }
        }
    }

    // -------------------------------------------------------------------------
    // Typed wrappers (kiosk booking flow)
    // -------------------------------------------------------------------------

    pub async fn register_guest(&self, guest: NewGuest) -> HotelResult<GuestId> {
        match self.execute(Command::RegisterGuest(guest)).await? {
            Reply::GuestRegistered(id) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    /// Book one room of `room_type`.
    pub async fn create_reservation(
        &self,
        reservation: &NewReservation,
        room_type: RoomType,
    ) -> HotelResult<ReservationId> {
        let mut rooms = BTreeMap::new();
        rooms.insert(room_type, 1);
        self.create_reservation_with_rooms(reservation, rooms).await
    }

    /// Book several rooms, all or nothing.
    pub async fn create_reservation_with_rooms(
        &self,
        reservation: &NewReservation,
        room_requests: BTreeMap<RoomType, u32>,
    ) -> HotelResult<ReservationId> {
        let request = hotel_core::AllocationRequest::from_new(
            reservation,
            hotel_core::RoomRequest::Mixed(room_requests),
        )?;
        match self.execute(Command::Book(request)).await? {
            Reply::Booked(allocation) => Ok(allocation.reservation_id),
            other => Err(unexpected(other)),
        }
    }

    pub async fn reservation(&self, id: ReservationId) -> HotelResult<Reservation> {
        match self.execute(Command::GetReservation(id)).await? {
            Reply::Reservation(r) => Ok(r),
            other => Err(unexpected(other)),
        }
    }

    pub async fn confirm(&self, id: ReservationId) -> HotelResult<ReservationStatus> {
        self.status_change(Command::Confirm(id)).await
    }

    pub async fn check_in(&self, id: ReservationId, today: NaiveDate) -> HotelResult<ReservationStatus> {
        self.status_change(Command::CheckIn {
            reservation_id: id,
            today,
        })
        .await
    }

    pub async fn cancel(&self, id: ReservationId) -> HotelResult<ReservationStatus> {
        self.status_change(Command::Cancel(id)).await
    }

    pub async fn check_out(&self, id: ReservationId) -> HotelResult<Bill> {
        match self.execute(Command::CheckOut(id)).await? {
            Reply::CheckedOut { bill, .. } => Ok(bill),
            other => Err(unexpected(other)),
        }
    }

    pub async fn report(&self, date: NaiveDate) -> HotelResult<OccupancyReport> {
        match self.execute(Command::Report { date }).await? {
            Reply::Report(report) => Ok(report),
            other => Err(unexpected(other)),
        }
    }

    /// Returns the new status.
    async fn status_change(&self, command: Command) -> HotelResult<ReservationStatus> {
        match self.execute(command).await? {
            Reply::StatusChanged { to, .. } => Ok(to),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: Reply) -> HotelError {
    HotelError::StoreUnavailable(format!("unexpected engine reply: {:?}", reply))
}
