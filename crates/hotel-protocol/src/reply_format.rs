//! Formatting of engine replies as console lines.
//!
//! Formats (one record per line):
//!
//! - Guest:        `Guest #1: Ada Lovelace <ada@example.com> 555-0100`
//! - Reservation:  `Reservation #3: guest 1, 2024-06-01..2024-06-05, party 2, Confirmed, rooms [4 x2 @150.00]`
//! - Allocation:   `Booked reservation #3: room 4 (Double) x2 @150.00`
//! - Status:       `Reservation #3: Pending -> Confirmed`
//! - Bill:         `Bill #1 for reservation #3: subtotal 600.00, tax 60.00, discount 0.00, total 660.00, unpaid`
//!
//! Money is printed as currency units with two decimals.

use hotel_core::{
    Allocation, Bill, Guest, HotelError, OccupancyReport, Reply, Reservation, Room,
};

use crate::wire_types::{MenuChoice, TRY_AGAIN};

/// `12345` cents → `"123.45"`.
pub fn format_money(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// The numbered menu, one entry per line.
pub fn format_menu() -> Vec<String> {
    let mut lines = vec!["--- Menu ---".to_string()];
    lines.extend(
        MenuChoice::ALL
            .iter()
            .map(|c| format!("{}. {}", c.number(), c.label())),
    );
    lines
}

pub fn format_guest(guest: &Guest) -> String {
    let mut line = format!(
        "Guest #{}: {} <{}> {}",
        guest.id,
        guest.full_name(),
        guest.email,
        guest.phone
    );
    if let Some(feedback) = &guest.feedback {
        line.push_str(&format!(" | feedback: {}", feedback));
    }
    line
}

pub fn format_reservation(reservation: &Reservation) -> String {
    let rooms = reservation
        .rooms
        .iter()
        .map(|link| {
            format!(
                "{} x{} @{}",
                link.room_id,
                link.guests_in_room,
                format_money(link.price_per_night)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Reservation #{}: guest {}, {}, party {}, {}, rooms [{}]",
        reservation.id,
        reservation.guest_id,
        reservation.stay,
        reservation.party_size,
        reservation.status,
        rooms
    )
}

pub fn format_allocation(allocation: &Allocation) -> Vec<String> {
    let mut lines = vec![format!("Booked reservation #{}", allocation.reservation_id)];
    lines.extend(allocation.rooms.iter().map(|r| {
        format!(
            "  room {} ({}) x{} @{}",
            r.room_id,
            r.room_type,
            r.guests,
            format_money(r.price_per_night)
        )
    }));
    lines
}

pub fn format_bill(bill: &Bill) -> String {
    format!(
        "Bill #{} for reservation #{}: subtotal {}, tax {}, discount {}, total {}, {}",
        bill.id,
        bill.reservation_id,
        format_money(bill.subtotal),
        format_money(bill.tax),
        format_money(bill.discount),
        format_money(bill.amount),
        if bill.paid { "paid" } else { "unpaid" }
    )
}

pub fn format_room(room: &Room) -> String {
    format!(
        "Room {}: {} floor {} @{}{}",
        room.id,
        room.room_type,
        room.floor,
        format_money(room.price),
        if room.structurally_available {
            ""
        } else {
            " (out of service)"
        }
    )
}

pub fn format_report(report: &OccupancyReport) -> Vec<String> {
    let mut lines = vec![format!("Occupancy report for {}", report.date)];
    for row in &report.by_type {
        lines.push(format!(
            "  {}: {} rooms, {} occupied, {} free, {} out of service",
            row.room_type, row.total, row.occupied, row.free, row.out_of_service
        ));
    }
    lines.push(format!("  Total occupied: {}", report.total_occupied()));

    let statuses = report
        .reservations_by_status
        .iter()
        .map(|(status, count)| format!("{} {}", status, count))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!(
        "  Reservations: {}",
        if statuses.is_empty() { "none".to_string() } else { statuses }
    ));
    lines.push(format!(
        "  Billed: {} paid, {} outstanding",
        format_money(report.billed_paid),
        format_money(report.billed_outstanding)
    ));
    lines
}

/// Render any successful engine reply.
pub fn format_reply(reply: &Reply) -> Vec<String> {
    match reply {
        Reply::GuestRegistered(id) => vec![format!("Registered guest #{}", id)],
        Reply::Guests(guests) if guests.is_empty() => vec!["No matching guests.".to_string()],
        Reply::Guests(guests) => guests.iter().map(format_guest).collect(),
        Reply::Reservations(list) if list.is_empty() => vec!["No reservations.".to_string()],
        Reply::Reservations(list) => list.iter().map(format_reservation).collect(),
        Reply::Reservation(r) => vec![format_reservation(r)],
        Reply::Booked(allocation) => format_allocation(allocation),
        Reply::StatusChanged {
            reservation_id,
            from,
            to,
        } => vec![format!("Reservation #{}: {} -> {}", reservation_id, from, to)],
        Reply::CheckedOut {
            reservation_id,
            bill,
        } => vec![
            format!("Reservation #{}: CheckedIn -> CheckedOut", reservation_id),
            format_bill(bill),
        ],
        Reply::Bill(bill) => vec![format_bill(bill)],
        Reply::Rooms(rooms) => rooms.iter().map(format_room).collect(),
        Reply::Report(report) => format_report(report),
        Reply::Done => vec!["OK".to_string()],
    }
}

/// Render an engine error. Retryable errors get the generic
/// "try again" line instead of internal details.
pub fn format_error(err: &HotelError) -> String {
    if err.is_retryable() {
        TRY_AGAIN.to_string()
    } else {
        format!("Error: {}", err)
    }
}
