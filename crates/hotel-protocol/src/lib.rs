//! hotel-protocol
//!
//! Text protocol for the hotel administration console.
//!
//! This crate is responsible for turning console lines into typed
//! fields and engine replies (`hotel_core::Reply` / `HotelError`) back
//! into lines.
//!
//! - [`wire_types`]   : banner, prompts, menu numbering
//! - [`line_codec`]   : one-field-per-line parsers
//! - [`reply_format`] : reply and error formatting

pub mod wire_types;
pub mod line_codec;
pub mod reply_format;

pub use wire_types::MenuChoice;

pub use line_codec::{
    ProtocolError,
    parse_amount,
    parse_date,
    parse_guest_id,
    parse_menu_choice,
    parse_reservation_id,
    parse_room_requests,
};

pub use reply_format::{format_error, format_menu, format_money, format_reply};
