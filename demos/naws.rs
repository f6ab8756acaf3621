//! Window-size negotiation with a custom handler.
//!
//! Asks each client for NAWS (RFC 1073) on connect and decodes the
//! subnegotiation payload the client sends back. Everything else is
//! refused, like the line_server demo.
//!
//! Run with `cargo run --example naws`, then `telnet 127.0.0.1 2323` and
//! type `size`.

use std::sync::{Arc, Mutex};

use tokio::net::{TcpListener, TcpStream};

use telwire::wire::{self, opt};
use telwire::{Event, SessionConfig, TelnetSession, Verb};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let listener = TcpListener::bind("127.0.0.1:2323").await?;
    println!("listening on 127.0.0.1:2323");

    loop {
        let (socket, addr) = listener.accept().await?;
        tokio::spawn(async move {
            if let Err(e) = handle(socket).await {
                eprintln!("session {}: {}", addr, e);
            }
        });
    }
}

async fn handle(socket: TcpStream) -> telwire::Result<()> {
    let window = Arc::new(Mutex::new(None::<(u16, u16)>));

    let sink = Arc::clone(&window);
    let handler = move |event: Event| -> Option<Vec<u8>> {
        match event {
            // Client agreed to send its window size; the SB follows on its own.
            Event::Negotiate {
                verb: Verb::Will,
                option: opt::NAWS,
            } => None,
            Event::Negotiate { verb, option } => verb
                .refusal()
                .map(|answer| wire::negotiate(answer, option).to_vec()),
            Event::Subnegotiate {
                option: opt::NAWS,
                payload,
            } if payload.len() == 4 => {
                let width = u16::from_be_bytes([payload[0], payload[1]]);
                let height = u16::from_be_bytes([payload[2], payload[3]]);
                *sink.lock().unwrap() = Some((width, height));
                None
            }
            _ => None,
        }
    };

    let mut session =
        TelnetSession::with_handler(socket, SessionConfig::default(), Box::new(handler));

    session
        .writer()
        .send_raw(&wire::negotiate(Verb::Do, opt::NAWS))
        .await?;
    session
        .writer()
        .write_line("naws demo; type 'size' or 'quit'")
        .await?;

    while let Some(line) = session.reader().read_line().await? {
        let text = String::from_utf8_lossy(&line);
        match text.trim() {
            "quit" => break,
            "size" => {
                let reply = match *window.lock().unwrap() {
                    Some((w, h)) => format!("your terminal is {}x{}", w, h),
                    None => "client did not report a window size".to_string(),
                };
                session.writer().write_line(&reply).await?;
            }
            _ => {
                session.writer().write_line("commands: size, quit").await?;
            }
        }
    }

    session.shutdown().await
}
