//! Session adapter: one connection, one parser, two streams.
//!
//! A [`TelnetSession`] binds any `AsyncRead + AsyncWrite` transport to a
//! frame parser and exposes exactly two handles: a [`TelnetReader`] for the
//! cooked inbound stream and a [`TelnetWriter`] for the escaped outbound
//! stream. The accepting layer creates one session per connection, usually
//! inside its own task; nothing is shared between sessions.
//!
//! The two halves touch disjoint state (raw/cooked queues vs. the outbound
//! handle), so [`split`](TelnetSession::split) hands them to separate tasks
//! without extra locking. The outbound handle itself is behind a mutex
//! because the reader also uses it to flush negotiation replies.

mod config;

pub use config::SessionConfig;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::protocol::{Ignore, NegotiationHandler};
use crate::stream::{TelnetReader, TelnetWriter};

/// A bound telnet connection: cooked input stream plus escaped output
/// stream over one underlying transport.
///
/// # Example
///
/// ```rust,no_run
/// use telwire::{RefuseAll, SessionConfig, TelnetSession};
/// use tokio::net::TcpStream;
///
/// # async fn example(socket: TcpStream) -> telwire::Result<()> {
/// let mut session =
///     TelnetSession::with_handler(socket, SessionConfig::default(), Box::new(RefuseAll));
///
/// while let Some(line) = session.reader().read_line().await? {
///     let text = String::from_utf8_lossy(&line);
///     session.writer().write_line(text.trim()).await?;
/// }
/// session.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct TelnetSession<S> {
    reader: TelnetReader<ReadHalf<S>, WriteHalf<S>>,
    writer: TelnetWriter<WriteHalf<S>>,
    terminated: Arc<AtomicBool>,
}

impl<S> TelnetSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Bind a transport with default configuration and no negotiation
    /// policy (all control sequences are recognized and discarded).
    pub fn new(io: S) -> Self {
        Self::with_handler(io, SessionConfig::default(), Box::new(Ignore))
    }

    /// Bind a transport with explicit configuration.
    pub fn with_config(io: S, config: SessionConfig) -> Self {
        Self::with_handler(io, config, Box::new(Ignore))
    }

    /// Bind a transport with a negotiation handler.
    ///
    /// The handler sees every recognized control sequence; bytes it returns
    /// are sent to the peer before the triggering read completes.
    pub fn with_handler(
        io: S,
        config: SessionConfig,
        handler: Box<dyn NegotiationHandler>,
    ) -> Self {
        let (read_half, write_half) = tokio::io::split(io);
        let outbound = Arc::new(Mutex::new(write_half));
        let terminated = Arc::new(AtomicBool::new(false));

        let reader = TelnetReader::new(
            read_half,
            Arc::clone(&outbound),
            handler,
            Arc::clone(&terminated),
            config,
        );
        let writer = TelnetWriter::new(outbound, Arc::clone(&terminated));

        debug!("session bound");
        Self {
            reader,
            writer,
            terminated,
        }
    }

    /// The cooked input stream.
    pub fn reader(&mut self) -> &mut TelnetReader<ReadHalf<S>, WriteHalf<S>> {
        &mut self.reader
    }

    /// The escaped output stream.
    pub fn writer(&mut self) -> &mut TelnetWriter<WriteHalf<S>> {
        &mut self.writer
    }

    /// Split into independently owned reader and writer handles, for the
    /// one-reading-task, one-writing-task arrangement.
    pub fn split(
        self,
    ) -> (
        TelnetReader<ReadHalf<S>, WriteHalf<S>>,
        TelnetWriter<WriteHalf<S>>,
    ) {
        (self.reader, self.writer)
    }

    /// Tear the session down: close the outbound direction and mark the
    /// session terminated. Subsequent reads and writes fail fast with
    /// [`Error::Terminated`](crate::Error::Terminated) instead of blocking.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await
    }

    /// Whether [`shutdown`](Self::shutdown) has run.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }
}
