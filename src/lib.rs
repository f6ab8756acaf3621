//! # Telwire
//!
//! Async telnet (RFC 854) byte-stream transport for line-oriented servers.
//!
//! Telwire handles the hard part of hosting a telnet service: the in-band
//! control-byte protocol embedded in arbitrary binary traffic. It wraps any
//! ordered byte connection and exposes two clean streams to the
//! application: a cooked input stream with all control framing removed, and
//! an escaped output stream that can carry any byte safely.
//!
//! ## Features
//!
//! - IAC state machine tolerant of envelopes split across network reads
//! - Pull-based cooked reader: exact, best-effort, lookahead and line reads
//! - Outbound escaping with a zero-copy fast path for clean data
//! - Pluggable negotiation policy (`RefuseAll` included for option-free
//!   servers)
//! - One session per connection, splittable into independent read and write
//!   halves
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use telwire::{RefuseAll, SessionConfig, TelnetSession};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = TcpListener::bind("127.0.0.1:2323").await?;
//!     loop {
//!         let (socket, _) = listener.accept().await?;
//!         tokio::spawn(async move {
//!             let mut session = TelnetSession::with_handler(
//!                 socket,
//!                 SessionConfig::default(),
//!                 Box::new(RefuseAll),
//!             );
//!             while let Ok(Some(line)) = session.reader().read_line().await {
//!                 let text = String::from_utf8_lossy(&line);
//!                 let _ = session.writer().write_line(text.trim()).await;
//!             }
//!             let _ = session.shutdown().await;
//!         });
//!     }
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod session;
pub mod stream;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use protocol::{Event, Ignore, NegotiationHandler, RefuseAll, Verb, wire};
pub use session::{SessionConfig, TelnetSession};
pub use stream::{TelnetReader, TelnetWriter};
