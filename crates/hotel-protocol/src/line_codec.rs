// crates/hotel-protocol/src/line_codec.rs

//! Parsers for single input lines of the admin console.
//!
//! Every prompt reads exactly one line, and each line carries exactly
//! one field:
//!
//! - Menu choice:     `3`
//! - Ids:             `42`
//! - Dates:           `2024-06-01` (ISO 8601)
//! - Amounts:         `25` or `25.50` (currency units, two decimals max)
//! - Room requests:   `Double:1, Single:2` (a bare `Double` means one room)
//!
//! Parsers trim surrounding whitespace (including a trailing `\r`) and
//! never touch the engine; semantic checks (positive party size, stay
//! ordering) stay in `hotel-core`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use hotel_core::{GuestId, ReservationId, RoomType};

use crate::wire_types::MenuChoice;

/// Errors for a line that cannot be parsed into the expected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A required field was blank.
    Empty(&'static str),
    /// Not a menu number.
    InvalidChoice(String),
    /// Not a non-negative integer.
    InvalidNumber { field: &'static str, value: String },
    /// Not a `YYYY-MM-DD` date.
    InvalidDate(String),
    /// Not a currency amount.
    InvalidAmount(String),
    /// Malformed room request list.
    InvalidRoomRequest(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Empty(field) => write!(f, "{} is required", field),
            ProtocolError::InvalidChoice(v) => write!(f, "Invalid choice: '{}'", v),
            ProtocolError::InvalidNumber { field, value } => {
                write!(f, "Invalid {}: '{}'", field, value)
            }
            ProtocolError::InvalidDate(v) => {
                write!(f, "Invalid date: '{}' (expected YYYY-MM-DD)", v)
            }
            ProtocolError::InvalidAmount(v) => write!(f, "Invalid amount: '{}'", v),
            ProtocolError::InvalidRoomRequest(v) => {
                write!(f, "Invalid room request: '{}' (expected Type:count,...)", v)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Parse a menu selection line.
pub fn parse_menu_choice(line: &str) -> Result<MenuChoice, ProtocolError> {
    let trimmed = line.trim();
    trimmed
        .parse::<u8>()
        .ok()
        .and_then(MenuChoice::from_u8)
        .ok_or_else(|| ProtocolError::InvalidChoice(trimmed.to_string()))
}

pub fn parse_reservation_id(line: &str) -> Result<ReservationId, ProtocolError> {
    parse_u64(line, "reservation id").map(ReservationId)
}

pub fn parse_guest_id(line: &str) -> Result<GuestId, ProtocolError> {
    parse_u64(line, "guest id").map(GuestId)
}

/// Blank means "no filter".
pub fn parse_optional_guest_id(line: &str) -> Result<Option<GuestId>, ProtocolError> {
    if line.trim().is_empty() {
        Ok(None)
    } else {
        parse_guest_id(line).map(Some)
    }
}

pub fn parse_party_size(line: &str) -> Result<u32, ProtocolError> {
    let value = parse_u64(line, "party size")?;
    u32::try_from(value).map_err(|_| ProtocolError::InvalidNumber {
        field: "party size",
        value: line.trim().to_string(),
    })
}

pub fn parse_date(line: &str) -> Result<NaiveDate, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::Empty("date"));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ProtocolError::InvalidDate(trimmed.to_string()))
}

/// Blank means "use the default" (the caller picks today).
pub fn parse_optional_date(line: &str) -> Result<Option<NaiveDate>, ProtocolError> {
    if line.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(line).map(Some)
    }
}

/// Parse a currency amount into cents.
pub fn parse_amount(line: &str) -> Result<u64, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::Empty("amount"));
    }
    let invalid = || ProtocolError::InvalidAmount(trimmed.to_string());

    let (units, fraction) = match trimmed.split_once('.') {
        Some((u, f)) => (u, f),
        None => (trimmed, ""),
    };
    if units.is_empty() || fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let units: u64 = units.parse().map_err(|_| invalid())?;
    let cents: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse::<u64>().map_err(|_| invalid())?,
    };

    units
        .checked_mul(100)
        .and_then(|c| c.checked_add(cents))
        .ok_or_else(invalid)
}

/// Parse `Type:count` pairs separated by commas.
///
/// Repeated types are summed. Zero counts are kept so the engine can
/// report them as a validation error.
pub fn parse_room_requests(line: &str) -> Result<BTreeMap<RoomType, u32>, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::Empty("room request"));
    }
    let invalid = || ProtocolError::InvalidRoomRequest(trimmed.to_string());

    let mut requests = BTreeMap::new();
    for token in split_and_trim(trimmed, ',') {
        if token.is_empty() {
            return Err(invalid());
        }
        let (name, count) = match token.split_once(':') {
            Some((name, count)) => (name.trim(), count.trim()),
            None => (token.as_str(), "1"),
        };
        let room_type = RoomType::from_name(name).ok_or_else(invalid)?;
        let count: u32 = count.parse().map_err(|_| invalid())?;
        let total = requests.entry(room_type).or_insert(0u32);
        *total = total.checked_add(count).ok_or_else(invalid)?;
    }

    Ok(requests)
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn split_and_trim(s: &str, delimiter: char) -> Vec<String> {
    s.split(delimiter)
        .map(|tok| tok.trim().to_string())
        .collect()
}

fn parse_u64(line: &str, field: &'static str) -> Result<u64, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::Empty(field));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| ProtocolError::InvalidNumber {
            field,
            value: trimmed.to_string(),
        })
}
