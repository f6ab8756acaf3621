//! Minimal line-oriented telnet server.
//!
//! Demonstrates the two external collaborators telwire expects: an accept
//! loop that gives each connection its own task, and a line-interpreter
//! loop over the session's two streams. Options are refused across the
//! board, so any stock telnet client settles into plain NVT mode.
//!
//! Run with `cargo run --example line_server`, then `telnet 127.0.0.1 2323`.

use tokio::net::{TcpListener, TcpStream};

use telwire::{RefuseAll, SessionConfig, TelnetSession};

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
    let mut session =
        TelnetSession::with_handler(socket, SessionConfig::default(), Box::new(RefuseAll));

    session
        .writer()
        .write_line("telwire line server; type 'help'")
        .await?;

    while let Some(line) = session.reader().read_line().await? {
        let text = String::from_utf8_lossy(&line);
        match text.trim() {
            "" => {}
            "help" => {
                session
                    .writer()
                    .write_line("commands: help, echo <text>, quit")
                    .await?;
            }
            "quit" => {
                session.writer().write_line("bye").await?;
                break;
            }
            cmd if cmd.starts_with("echo ") => {
                session.writer().write_line(&cmd[5..]).await?;
            }
            other => {
                session
                    .writer()
                    .write_line(&format!("unknown command: {}", other))
                    .await?;
            }
        }
    }

    session.shutdown().await
}
