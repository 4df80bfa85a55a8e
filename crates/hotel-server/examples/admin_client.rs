//! Minimal line client for the admin console.
//!
//! Relays stdin lines to the server and prints everything the server
//! sends back, prompts included.
//!
//!     HOTEL_CLIENT_ADDR=127.0.0.1:9000 cargo run --example admin_client

use std::env;

use tokio::io::{self, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = env::var("HOTEL_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:9000".to_string());

    eprintln!("Connecting to {}...", addr);
    let stream = TcpStream::connect(&addr).await?;
    let (mut read_half, mut write_half) = stream.into_split();

    // Server → stdout. Raw bytes, since prompts have no trailing newline.
    let printer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        let mut buf = [0u8; 1024];
        loop {
            match read_half.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if stdout.write_all(&buf[..n]).await.is_err() {
                        break;
                    }
                    stdout.flush().await.ok();
                }
            }
        }
    });

    let mut stdin = BufReader::new(io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        if write_half.write_all(format!("{}\n", line).as_bytes()).await.is_err() {
            break;
        }
    }

    write_half.shutdown().await.ok();
    printer.await.ok();
    eprintln!("\nDisconnected.");
    Ok(())
}
