//! Fixed protocol text and menu numbering.
//!
//! This module defines:
//! - the banner, login prompts and status lines sent by the server;
//! - the authenticated menu (`MenuChoice`) and its numbering;
//! - per-operation input prompts.
//!
//! Prompts end in `": "` and are written without a trailing newline;
//! every other line is newline terminated by the writer.

/// Sent once when a connection is accepted.
pub const BANNER: &str = "=== Hotel Administration Console ===";

pub const USERNAME_PROMPT: &str = "Username: ";
pub const PASSWORD_PROMPT: &str = "Password: ";
pub const LOGIN_SUCCESS_PREFIX: &str = "Login successful.";
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const LOGGED_OUT: &str = "Logged out.";
pub const GOODBYE: &str = "Goodbye.";

pub const CHOICE_PROMPT: &str = "Choice: ";
pub const INVALID_CHOICE: &str = "Invalid choice. Enter a number from the menu.";

/// Longest accepted input line in bytes, terminator included.
pub const MAX_LINE_LEN: usize = 1024;
pub const INVALID_ENCODING: &str = "Invalid input: lines must be UTF-8 text.";
pub const LINE_TOO_LONG: &str = "Invalid input: line too long.";

/// Sent for retryable failures; the session stays open.
pub const TRY_AGAIN: &str = "Service temporarily unavailable, please try again.";

/// Sent while a connection waits for a free session slot.
pub const SERVER_BUSY: &str = "Server busy, waiting for a free slot...";
/// Sent right before closing a connection the wait queue cannot hold.
pub const SERVER_FULL: &str = "Server is full, please try again later.";
/// Sent to open sessions when the server shuts down.
pub const SERVER_SHUTTING_DOWN: &str = "Server is shutting down.";

pub const GUEST_QUERY_PROMPT: &str = "Guest name or ID: ";
pub const GUEST_FILTER_PROMPT: &str = "Guest ID (blank for all): ";
pub const GUEST_ID_PROMPT: &str = "Guest ID: ";
pub const RESERVATION_ID_PROMPT: &str = "Reservation ID: ";
pub const DISCOUNT_PROMPT: &str = "Discount amount: ";
pub const REPORT_DATE_PROMPT: &str = "Report date (YYYY-MM-DD, blank for today): ";
pub const CHECK_IN_PROMPT: &str = "Check-in date: ";
pub const CHECK_OUT_PROMPT: &str = "Check-out date: ";
pub const PARTY_SIZE_PROMPT: &str = "Party size: ";
pub const ROOMS_PROMPT: &str = "Rooms (e.g. Double:1,Single:2): ";

/// Authenticated menu entries.
///
/// The numbering is part of the protocol: clients send the bare number.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    SearchGuest = 1,
    ListReservations = 2,
    CheckIn = 3,
    CheckOut = 4,
    Cancel = 5,
    ApplyDiscount = 6,
    GenerateReport = 7,
    Logout = 8,
    Exit = 9,
    Book = 10,
    Confirm = 11,
}

impl MenuChoice {
    /// Every entry, in menu order.
    pub const ALL: [MenuChoice; 11] = [
        MenuChoice::SearchGuest,
        MenuChoice::ListReservations,
        MenuChoice::CheckIn,
        MenuChoice::CheckOut,
        MenuChoice::Cancel,
        MenuChoice::ApplyDiscount,
        MenuChoice::GenerateReport,
        MenuChoice::Logout,
        MenuChoice::Exit,
        MenuChoice::Book,
        MenuChoice::Confirm,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        MenuChoice::ALL.into_iter().find(|c| c.number() == v)
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::SearchGuest => "Search guest",
            MenuChoice::ListReservations => "List reservations",
            MenuChoice::CheckIn => "Check-in",
            MenuChoice::CheckOut => "Check-out",
            MenuChoice::Cancel => "Cancel reservation",
            MenuChoice::ApplyDiscount => "Apply discount",
            MenuChoice::GenerateReport => "Generate report",
            MenuChoice::Logout => "Logout",
            MenuChoice::Exit => "Exit",
            MenuChoice::Book => "Book rooms",
            MenuChoice::Confirm => "Confirm reservation",
        }
    }
}
