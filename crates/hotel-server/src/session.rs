// crates/hotel-server/src/session.rs

//! Per-connection admin session.
//!
//! State machine: `Unauthenticated → Authenticated → Closed`, where
//! logout returns to `Unauthenticated`. Each prompt reads exactly one
//! line, and a command is answered completely before the next line is
//! read, so commands are processed strictly in arrival order.
//!
//! The session keeps nothing but the logged-in operator's name; every
//! operation re-reads from the engine, and every mutation goes through
//! the engine task.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use hotel_core::{AllocationRequest, Command, NewReservation, ReservationStatus, RoomRequest};
use hotel_protocol::line_codec::{
    parse_amount, parse_date, parse_guest_id, parse_menu_choice, parse_optional_date,
    parse_optional_guest_id, parse_party_size, parse_reservation_id, parse_room_requests,
    ProtocolError,
};
use hotel_protocol::reply_format::{format_error, format_menu, format_reply};
use hotel_protocol::wire_types::*;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::handle::EngineHandle;
use crate::types::SessionId;
use crate::wait_for_shutdown;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Unauthenticated,
    Authenticated { admin: String },
    Closed,
}

/// Serve one accepted TCP connection until the client exits,
/// disconnects, or the server shuts down.
pub async fn serve_tcp(
    session_id: SessionId,
    stream: TcpStream,
    engine: EngineHandle,
    config: Arc<Config>,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let (read_half, write_half) = stream.into_split();
    Session::new(
        session_id,
        BufReader::new(read_half),
        write_half,
        engine,
        config,
        shutdown,
    )
    .run()
    .await
}

/// Admin session over any line reader / byte writer pair.
pub struct Session<R, W> {
    id: SessionId,
    reader: R,
    writer: W,
    engine: EngineHandle,
    config: Arc<Config>,
    shutdown: watch::Receiver<bool>,
    state: SessionState,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        id: SessionId,
        reader: R,
        writer: W,
        engine: EngineHandle,
        config: Arc<Config>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Session {
            id,
            reader,
            writer,
            engine: engine.for_session(id),
            config,
            shutdown,
            state: SessionState::Unauthenticated,
        }
    }

    /// Run the session loop to completion.
    pub async fn run(mut self) -> anyhow::Result<()> {
        self.send_line(BANNER).await?;

        loop {
            match self.state {
                SessionState::Unauthenticated => self.login().await?,
                SessionState::Authenticated { .. } => self.menu_round().await?,
                SessionState::Closed => break,
            }
        }

        self.writer.shutdown().await.ok();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    async fn login(&mut self) -> anyhow::Result<()> {
        let Some(username) = self.prompt(USERNAME_PROMPT).await? else {
            return Ok(());
        };
        let Some(password) = self.prompt(PASSWORD_PROMPT).await? else {
            return Ok(());
        };
        let username = username.trim().to_string();

        if self.config.authenticate(&username, password.trim()) {
            info!(session = %self.id, admin = %username, "Admin logged in");
            self.send_line(&format!("{} Welcome, {}.", LOGIN_SUCCESS_PREFIX, username))
                .await?;
            self.state = SessionState::Authenticated { admin: username };
        } else {
            warn!(session = %self.id, admin = %username, "Failed login attempt");
            self.send_line(LOGIN_FAILED).await?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Menu
    // -------------------------------------------------------------------------

    async fn menu_round(&mut self) -> anyhow::Result<()> {
        for line in format_menu() {
            self.send_line(&line).await?;
        }
        let Some(line) = self.prompt(CHOICE_PROMPT).await? else {
            return Ok(());
        };

        let choice = match parse_menu_choice(&line) {
            Ok(choice) => choice,
            Err(_) => {
                self.send_line(INVALID_CHOICE).await?;
                return Ok(());
            }
        };
        debug!(session = %self.id, ?choice, "Menu choice");

        match choice {
            MenuChoice::SearchGuest => {
                let Some(query) = self.prompt(GUEST_QUERY_PROMPT).await? else {
                    return Ok(());
                };
                self.run_command(Command::SearchGuests { query }).await
            }
            MenuChoice::ListReservations => {
                let Some(guest_id) = self.ask(GUEST_FILTER_PROMPT, parse_optional_guest_id).await?
                else {
                    return Ok(());
                };
                self.run_command(Command::ListReservations { guest_id }).await
            }
            MenuChoice::CheckIn => {
                let Some(reservation_id) = self.ask_reservation_id().await? else {
                    return Ok(());
                };
                self.run_command(Command::CheckIn {
                    reservation_id,
                    today: today(),
                })
                .await
            }
            MenuChoice::CheckOut => {
                let Some(id) = self.ask_reservation_id().await? else {
                    return Ok(());
                };
                self.run_command(Command::CheckOut(id)).await
            }
            MenuChoice::Cancel => {
                let Some(id) = self.ask_reservation_id().await? else {
                    return Ok(());
                };
                self.run_command(Command::Cancel(id)).await
            }
            MenuChoice::Confirm => {
                let Some(id) = self.ask_reservation_id().await? else {
                    return Ok(());
                };
                self.run_command(Command::Confirm(id)).await
            }
            MenuChoice::ApplyDiscount => {
                let Some(reservation_id) = self.ask_reservation_id().await? else {
                    return Ok(());
                };
                let Some(discount) = self.ask(DISCOUNT_PROMPT, parse_amount).await? else {
                    return Ok(());
                };
                self.run_command(Command::ApplyDiscount {
                    reservation_id,
                    discount,
                })
                .await
            }
            MenuChoice::GenerateReport => {
                let Some(date) = self.ask(REPORT_DATE_PROMPT, parse_optional_date).await? else {
                    return Ok(());
                };
                self.run_command(Command::Report {
                    date: date.unwrap_or_else(today),
                })
                .await
            }
            MenuChoice::Book => self.book().await,
            MenuChoice::Logout => {
                if let SessionState::Authenticated { admin } = &self.state {
                    info!(session = %self.id, admin = %admin, "Admin logged out");
                }
                self.state = SessionState::Unauthenticated;
                self.send_line(LOGGED_OUT).await
            }
            MenuChoice::Exit => {
                self.send_line(GOODBYE).await?;
                self.state = SessionState::Closed;
                Ok(())
            }
        }
    }

    /// Collect booking fields, one prompt each, then submit.
    async fn book(&mut self) -> anyhow::Result<()> {
        let Some(guest_id) = self.ask(GUEST_ID_PROMPT, parse_guest_id).await? else {
            return Ok(());
        };
        let Some(check_in) = self.ask(CHECK_IN_PROMPT, parse_date).await? else {
            return Ok(());
        };
        let Some(check_out) = self.ask(CHECK_OUT_PROMPT, parse_date).await? else {
            return Ok(());
        };
        let Some(party_size) = self.ask(PARTY_SIZE_PROMPT, parse_party_size).await? else {
            return Ok(());
        };
        let Some(rooms) = self.ask(ROOMS_PROMPT, parse_room_requests).await? else {
            return Ok(());
        };

        let new = NewReservation {
            guest_id,
            check_in,
            check_out,
            party_size,
            status: ReservationStatus::Confirmed,
        };
        match AllocationRequest::from_new(&new, RoomRequest::Mixed(rooms)) {
            Ok(request) => self.run_command(Command::Book(request)).await,
            Err(e) => self.send_line(&format_error(&e)).await,
        }
    }

    /// Send a command to the engine and write the outcome.
    async fn run_command(&mut self, command: Command) -> anyhow::Result<()> {
        let mutating = command.is_mutating();
        match self.engine.execute(command).await {
            Ok(reply) => {
                if mutating {
                    info!(session = %self.id, ?reply, "Mutation committed");
                }
                for line in format_reply(&reply) {
                    self.send_line(&line).await?;
                }
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!(session = %self.id, "Engine unavailable: {}", e);
                }
                self.send_line(&format_error(&e)).await?;
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Line I/O
    // -------------------------------------------------------------------------

    async fn ask_reservation_id(&mut self) -> anyhow::Result<Option<hotel_core::ReservationId>> {
        self.ask(RESERVATION_ID_PROMPT, parse_reservation_id).await
    }

    /// Prompt for one field. `None` means the operation is abandoned,
    /// either because the input was invalid (already reported) or the
    /// session closed.
    async fn ask<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Result<T, ProtocolError>,
    ) -> anyhow::Result<Option<T>> {
        let Some(line) = self.prompt(prompt).await? else {
            return Ok(None);
        };
        match parse(&line) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.send_line(&e.to_string()).await?;
                Ok(None)
            }
        }
    }

    /// Write a prompt (no newline) and read the answer. `None` means
    /// the line was rejected (already reported) or the session closed.
    async fn prompt(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        self.writer.write_all(prompt.as_bytes()).await?;
        self.writer.flush().await?;
        self.read_line().await
    }

    async fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let raw = tokio::select! {
            raw = read_raw_line(&mut self.reader) => raw?,
            _ = wait_for_shutdown(&mut self.shutdown) => {
                self.send_line("").await?;
                self.send_line(SERVER_SHUTTING_DOWN).await?;
                RawLine::Eof
            }
        };

        let bytes = match raw {
            RawLine::Line(bytes) => bytes,
            RawLine::TooLong => {
                warn!(session = %self.id, limit = MAX_LINE_LEN, "Discarded oversized line");
                self.send_line(LINE_TOO_LONG).await?;
                return Ok(None);
            }
            RawLine::Eof => {
                self.state = SessionState::Closed;
                return Ok(None);
            }
        };

        match String::from_utf8(bytes) {
            Ok(line) => {
                debug!(session = %self.id, line = %redact(&self.state, &line), "Received line");
                Ok(Some(line))
            }
            Err(_) => {
                debug!(session = %self.id, "Received non UTF-8 line");
                self.send_line(INVALID_ENCODING).await?;
                Ok(None)
            }
        }
    }

    async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

enum RawLine {
    /// One line without its `\n` / `\r\n` terminator.
    Line(Vec<u8>),
    TooLong,
    Eof,
}

/// Read one line of at most `MAX_LINE_LEN` bytes. An oversized line is
/// consumed up to its newline and reported as `TooLong`.
async fn read_raw_line<R>(reader: &mut R) -> std::io::Result<RawLine>
where
    R: AsyncBufRead + Unpin,
{
    let limit = MAX_LINE_LEN as u64;
    let mut buf = Vec::new();
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(RawLine::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        return Ok(RawLine::Line(buf));
    }
    if n < MAX_LINE_LEN {
        // Final line without a terminator.
        return Ok(RawLine::Line(buf));
    }

    loop {
        buf.clear();
        let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
        if n == 0 || buf.last() == Some(&b'\n') {
            return Ok(RawLine::TooLong);
        }
    }
}

/// Keep passwords out of debug logs.
fn redact<'a>(state: &SessionState, line: &'a str) -> &'a str {
    match state {
        SessionState::Unauthenticated => "<login input>",
        _ => line,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
