//! Push-based writer that escapes outbound data.
//!
//! Application bytes pass through [`wire::escape`] so a literal 0xFF can
//! never be mistaken for a control sequence by the peer. Each `write` call
//! holds the outbound mutex for exactly one escaped `write_all`, so two
//! concurrent writes on the same session never interleave.

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::protocol::wire;

/// Escaping writer for the outbound side of a session.
pub struct TelnetWriter<W> {
    /// Outbound half, shared with the reader's negotiation-reply path.
    outbound: Arc<Mutex<W>>,
    terminated: Arc<AtomicBool>,
}

impl<W> TelnetWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(outbound: Arc<Mutex<W>>, terminated: Arc<AtomicBool>) -> Self {
        Self {
            outbound,
            terminated,
        }
    }

    /// Write application data, doubling every IAC byte on the way out.
    ///
    /// The escaped sequence goes to the connection as a single write; a
    /// failure propagates immediately and is not retried.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_live()?;
        let escaped = wire::escape(data);
        trace!("write: {} bytes ({} escaped)", data.len(), escaped.len());

        let mut out = self.outbound.lock().await;
        match escaped {
            Cow::Borrowed(bytes) => out.write_all(bytes).await?,
            Cow::Owned(bytes) => out.write_all(&bytes).await?,
        }
        out.flush().await?;
        Ok(())
    }

    /// Write a text line with a CRLF terminator, the NVT line ending.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 2);
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b"\r\n");
        self.write(&buf).await
    }

    /// Write pre-framed control bytes verbatim, without escaping.
    ///
    /// For negotiation traffic built with [`wire::negotiate`] or
    /// [`wire::subnegotiate`]; the IAC bytes in it are intentional.
    pub async fn send_raw(&mut self, frame: &[u8]) -> Result<()> {
        self.ensure_live()?;
        let mut out = self.outbound.lock().await;
        out.write_all(frame).await?;
        out.flush().await?;
        Ok(())
    }

    /// Close the outbound direction and mark the session terminated.
    ///
    /// After this call every reader and writer operation on the session
    /// fails fast with [`Error::Terminated`].
    pub async fn shutdown(&mut self) -> Result<()> {
        self.terminated.store(true, Ordering::Release);
        debug!("session marked terminated");
        let mut out = self.outbound.lock().await;
        out.shutdown().await?;
        Ok(())
    }

    /// Whether the session has been torn down.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(Error::Terminated);
        }
        Ok(())
    }
}
