// crates/hotel-server/tests/admin_session.rs
use std::net::SocketAddr;

use chrono::{Duration, Local};
use hotel_core::{NewGuest, RoomType};
use hotel_protocol::wire_types::*;
use hotel_server::config::InventoryEntry;
use hotel_server::{load_engine, spawn_engine, Config, EngineHandle, Server};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    engine: EngineHandle,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<anyhow::Result<()>>,
}

async fn start(max_clients: usize, max_queued: usize) -> TestServer {
    let config = Config {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        max_clients,
        max_queued,
        shutdown_grace_secs: 1,
        inventory: vec![InventoryEntry {
            room_type: RoomType::Single,
            count: 2,
        }],
        ..Config::default()
    };

    let engine = load_engine(&config).await.unwrap();
    let (handle, _engine_task) = spawn_engine(engine, None, &config);
    let server = Server::bind(config, handle.clone()).await.unwrap();
    let addr = server.local_addr().unwrap();

    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(server.run(shutdown_rx));

    TestServer {
        addr,
        engine: handle,
        shutdown,
        task,
    }
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Client {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Client {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    async fn line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line.trim_end_matches('\n').to_string()
    }

    /// Prompts carry no newline; read exactly their bytes.
    async fn prompt(&mut self, expected: &str) {
        let mut buf = vec![0u8; expected.len()];
        self.reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    async fn send(&mut self, line: &str) {
        self.send_raw(format!("{}\n", line).as_bytes()).await;
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    async fn answer(&mut self, prompt: &str, value: &str) {
        self.prompt(prompt).await;
        self.send(value).await;
    }

    async fn is_closed(&mut self) -> bool {
        let mut buf = [0u8; 1];
        matches!(self.reader.read(&mut buf).await, Ok(0) | Err(_))
    }

    async fn login(&mut self, username: &str, password: &str) -> String {
        self.answer(USERNAME_PROMPT, username).await;
        self.answer(PASSWORD_PROMPT, password).await;
        self.line().await
    }

    /// Read the menu up to and including the choice prompt.
    async fn menu(&mut self) {
        assert_eq!(self.line().await, "--- Menu ---");
        for _ in 0..MenuChoice::ALL.len() {
            self.line().await;
        }
        self.prompt(CHOICE_PROMPT).await;
    }

    async fn choose(&mut self, choice: &str) {
        self.menu().await;
        self.send(choice).await;
    }
}

#[tokio::test]
async fn admin_walks_a_reservation_through_its_lifecycle() {
    let server = start(4, 4).await;
    let guest_id = server
        .engine
        .register_guest(NewGuest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
        })
        .await
        .unwrap();

    let mut client = Client::connect(server.addr).await;
    assert_eq!(client.line().await, BANNER);

    assert_eq!(client.login("admin", "nope").await, LOGIN_FAILED);
    assert_eq!(
        client.login("admin", "admin").await,
        "Login successful. Welcome, admin."
    );

    client.choose("1").await;
    client.answer(GUEST_QUERY_PROMPT, "love").await;
    assert!(client.line().await.starts_with("Guest #1: Ada Lovelace"));

    let today = Local::now().date_naive();
    client.choose("10").await;
    client.answer(GUEST_ID_PROMPT, &guest_id.to_string()).await;
    client.answer(CHECK_IN_PROMPT, &today.to_string()).await;
    client
        .answer(CHECK_OUT_PROMPT, &(today + Duration::days(2)).to_string())
        .await;
    client.answer(PARTY_SIZE_PROMPT, "1").await;
    client.answer(ROOMS_PROMPT, "single:1").await;
    assert_eq!(client.line().await, "Booked reservation #1");
    assert_eq!(client.line().await, "  room 1 (Single) x1 @100.00");

    // Console bookings start out confirmed.
    client.choose("11").await;
    client.answer(RESERVATION_ID_PROMPT, "1").await;
    assert_eq!(
        client.line().await,
        "Error: invalid transition from Confirmed to Confirmed"
    );

    client.choose("3").await;
    client.answer(RESERVATION_ID_PROMPT, "1").await;
    assert_eq!(client.line().await, "Reservation #1: Confirmed -> CheckedIn");

    client.choose("4").await;
    client.answer(RESERVATION_ID_PROMPT, "1").await;
    assert_eq!(client.line().await, "Reservation #1: CheckedIn -> CheckedOut");
    assert_eq!(
        client.line().await,
        "Bill #1 for reservation #1: subtotal 200.00, tax 20.00, discount 0.00, total 220.00, unpaid"
    );

    client.choose("6").await;
    client.answer(RESERVATION_ID_PROMPT, "1").await;
    client.answer(DISCOUNT_PROMPT, "20").await;
    assert_eq!(
        client.line().await,
        "Bill #1 for reservation #1: subtotal 200.00, tax 20.00, discount 20.00, total 200.00, unpaid"
    );

    client.choose("5").await;
    client.answer(RESERVATION_ID_PROMPT, "1").await;
    assert_eq!(
        client.line().await,
        "Error: invalid transition from CheckedOut to Cancelled"
    );

    client.choose("2").await;
    client.answer(GUEST_FILTER_PROMPT, "").await;
    assert!(client.line().await.contains("CheckedOut"));

    client.choose("7").await;
    client.answer(REPORT_DATE_PROMPT, &today.to_string()).await;
    assert_eq!(client.line().await, format!("Occupancy report for {}", today));

    client.choose("9").await;
    assert_eq!(client.line().await, GOODBYE);
    assert!(client.is_closed().await);

    server.shutdown.send(true).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn bad_input_is_reported_and_the_session_continues() {
    let server = start(4, 4).await;
    let mut client = Client::connect(server.addr).await;
    assert_eq!(client.line().await, BANNER);
    client.login("admin", "admin").await;

    client.choose("42").await;
    assert_eq!(client.line().await, INVALID_CHOICE);

    client.choose("abc").await;
    assert_eq!(client.line().await, INVALID_CHOICE);

    client.choose("4").await;
    client.answer(RESERVATION_ID_PROMPT, "xyz").await;
    assert_eq!(client.line().await, "Invalid reservation id: 'xyz'");

    client.choose("5").await;
    client.answer(RESERVATION_ID_PROMPT, "77").await;
    assert_eq!(client.line().await, "Error: reservation 77 not found");

    client.choose("10").await;
    client.answer(GUEST_ID_PROMPT, "1").await;
    client.answer(CHECK_IN_PROMPT, "2024-06-05").await;
    client.answer(CHECK_OUT_PROMPT, "2024-06-01").await;
    client.answer(PARTY_SIZE_PROMPT, "1").await;
    client.answer(ROOMS_PROMPT, "Single").await;
    assert!(client.line().await.starts_with("Error: validation error"));

    // Logout returns to the login prompt.
    client.choose("8").await;
    assert_eq!(client.line().await, LOGGED_OUT);
    client.login("admin", "admin").await;
    client.choose("9").await;
    assert_eq!(client.line().await, GOODBYE);

    server.shutdown.send(true).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn undecodable_and_oversized_lines_are_rejected_inline() {
    let server = start(4, 4).await;
    let mut client = Client::connect(server.addr).await;
    assert_eq!(client.line().await, BANNER);

    client.prompt(USERNAME_PROMPT).await;
    let long = format!("{}\n", "a".repeat(MAX_LINE_LEN * 3));
    client.send_raw(long.as_bytes()).await;
    assert_eq!(client.line().await, LINE_TOO_LONG);
    assert_eq!(
        client.login("admin", "admin").await,
        "Login successful. Welcome, admin."
    );

    client.menu().await;
    client.send_raw(b"\xff\xfe\n").await;
    assert_eq!(client.line().await, INVALID_ENCODING);

    client.choose("9").await;
    assert_eq!(client.line().await, GOODBYE);
    assert!(client.is_closed().await);

    server.shutdown.send(true).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn extra_clients_wait_then_overflow_is_turned_away() {
    let server = start(1, 1).await;

    let mut first = Client::connect(server.addr).await;
    assert_eq!(first.line().await, BANNER);

    let mut second = Client::connect(server.addr).await;
    assert_eq!(second.line().await, SERVER_BUSY);

    let mut third = Client::connect(server.addr).await;
    assert_eq!(third.line().await, SERVER_FULL);
    assert!(third.is_closed().await);

    // Freeing the slot admits the queued client.
    drop(first);
    assert_eq!(second.line().await, BANNER);
    second.prompt(USERNAME_PROMPT).await;

    server.shutdown.send(true).unwrap();
    assert_eq!(second.line().await, "");
    assert_eq!(second.line().await, SERVER_SHUTTING_DOWN);
    assert!(second.is_closed().await);
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_closes_idle_sessions() {
    let server = start(2, 0).await;

    let mut client = Client::connect(server.addr).await;
    assert_eq!(client.line().await, BANNER);
    client.prompt(USERNAME_PROMPT).await;

    server.shutdown.send(true).unwrap();
    assert_eq!(client.line().await, "");
    assert_eq!(client.line().await, SERVER_SHUTTING_DOWN);
    assert!(client.is_closed().await);

    server.task.await.unwrap().unwrap();
    assert!(TcpStream::connect(server.addr).await.is_err());
}
