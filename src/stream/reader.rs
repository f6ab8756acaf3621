//! Pull-based reader over the cooked byte stream.
//!
//! `TelnetReader` owns the inbound half of the connection and the frame
//! parser, and is the only component that drains the cooked queue. Every
//! blocking operation follows the same fill-then-classify loop: read
//! whatever the socket has into the raw queue, run the parser, repeat until
//! the request is satisfiable or the peer has closed.
//!
//! Negotiation replies produced by the handler are flushed to the peer
//! through the shared outbound half before the triggering read returns, so
//! option traffic is answered even while the application only ever reads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use log::{debug, trace, warn};
use memchr::memchr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::protocol::{FrameParser, NegotiationHandler};
use crate::session::SessionConfig;

/// Buffered reader exposing the cooked (framing-free) side of a session.
pub struct TelnetReader<R, W> {
    inner: R,
    parser: FrameParser,
    handler: Box<dyn NegotiationHandler>,
    /// Outbound half, shared with the writer; used only for handler replies.
    outbound: Arc<Mutex<W>>,
    terminated: Arc<AtomicBool>,
    config: SessionConfig,
    /// Set once the peer closes or a fill fails; never cleared.
    eof: bool,
}

impl<R, W> TelnetReader<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(
        inner: R,
        outbound: Arc<Mutex<W>>,
        handler: Box<dyn NegotiationHandler>,
        terminated: Arc<AtomicBool>,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner,
            parser: FrameParser::new(),
            handler,
            outbound,
            terminated,
            config,
            eof: false,
        }
    }

    /// Read exactly `n` cooked bytes, blocking on the network as needed.
    ///
    /// Returns fewer than `n` bytes only if the peer closed first, and an
    /// empty buffer once both the connection and the cooked queue are
    /// exhausted. A short read is a documented partial result, not an error.
    pub async fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        self.ensure_live()?;
        self.classify_and_reply().await?;
        while self.parser.cooked_len() < n && !self.eof {
            self.fill().await?;
            self.classify_and_reply().await?;
        }
        let take = n.min(self.parser.cooked_len());
        Ok(self.parser.split_cooked(take))
    }

    /// Best-effort read: classify what has already been received, then
    /// return and consume everything currently cooked.
    ///
    /// Never fills from the network, so it never blocks waiting for the
    /// peer. Useful for interactive paths where latency beats completeness.
    pub async fn read_available(&mut self) -> Result<Bytes> {
        self.ensure_live()?;
        self.classify_and_reply().await?;
        Ok(self.parser.take_cooked())
    }

    /// Read until the peer closes, returning the entire remaining cooked
    /// content.
    pub async fn read_all(&mut self) -> Result<Bytes> {
        self.ensure_live()?;
        self.classify_and_reply().await?;
        while !self.eof {
            self.fill().await?;
            self.classify_and_reply().await?;
        }
        Ok(self.parser.take_cooked())
    }

    /// Like [`read_exact`](Self::read_exact) but without consuming:
    /// the returned bytes stay at the front of the cooked queue and the next
    /// read will yield them again.
    pub async fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.ensure_live()?;
        self.classify_and_reply().await?;
        while self.parser.cooked_len() < n && !self.eof {
            self.fill().await?;
            self.classify_and_reply().await?;
        }
        let len = n.min(self.parser.cooked_len());
        Ok(&self.parser.cooked()[..len])
    }

    /// The entire current cooked queue, without consuming it and without
    /// touching the network.
    pub fn peek_buffered(&self) -> &[u8] {
        self.parser.cooked()
    }

    /// Read one line, including its `\n` terminator.
    ///
    /// Blocks until a newline is cooked or the peer closes. At end of
    /// stream any unterminated trailing bytes are returned as a final line;
    /// `None` means a clean end of stream with nothing left.
    pub async fn read_line(&mut self) -> Result<Option<Bytes>> {
        self.ensure_live()?;
        self.classify_and_reply().await?;
        loop {
            if let Some(pos) = memchr(b'\n', self.parser.cooked()) {
                return Ok(Some(self.parser.split_cooked(pos + 1)));
            }
            if self.eof {
                if self.parser.cooked_len() == 0 {
                    return Ok(None);
                }
                return Ok(Some(self.parser.take_cooked()));
            }
            self.fill().await?;
            self.classify_and_reply().await?;
        }
    }

    /// Whether the peer has closed its sending direction.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// One network fill into the raw queue. The sole blocking point of the
    /// inbound path.
    async fn fill(&mut self) -> Result<()> {
        self.parser.raw_mut().reserve(self.config.fill_chunk);
        match self.inner.read_buf(self.parser.raw_mut()).await {
            Ok(0) => {
                debug!("peer closed inbound direction");
                self.eof = true;
                Ok(())
            }
            Ok(n) => {
                trace!("fill: {} raw bytes", n);
                Ok(())
            }
            Err(e) => {
                // A failed or cancelled fill terminates the stream; the
                // parser state is left as-is and no retry is attempted.
                warn!("fill failed, terminating stream: {}", e);
                self.eof = true;
                Err(Error::Connection(e))
            }
        }
    }

    /// Run the parser over pending raw bytes and send any handler replies.
    async fn classify_and_reply(&mut self) -> Result<()> {
        let Self {
            parser, handler, ..
        } = self;
        let mut replies = Vec::new();
        parser.classify(&mut |event| {
            debug!("control sequence: {:?}", event);
            if let Some(bytes) = handler.handle(event) {
                replies.extend_from_slice(&bytes);
            }
        });

        if !replies.is_empty() {
            trace!("sending {} reply bytes", replies.len());
            let mut out = self.outbound.lock().await;
            out.write_all(&replies).await?;
            out.flush().await?;
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(Error::Terminated);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Ignore;

    fn reader<R>(inner: R) -> TelnetReader<R, tokio_test::io::Mock>
    where
        R: AsyncRead + Unpin,
    {
        let outbound = Arc::new(Mutex::new(tokio_test::io::Builder::new().build()));
        TelnetReader::new(
            inner,
            outbound,
            Box::new(Ignore),
            Arc::new(AtomicBool::new(false)),
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn read_exact_spans_multiple_fills() {
        let mock = tokio_test::io::Builder::new()
            .read(b"ab")
            .read(b"cd")
            .read(b"ef")
            .build();
        let mut reader = reader(mock);

        let bytes = reader.read_exact(5).await.unwrap();
        assert_eq!(&bytes[..], b"abcde");
        assert_eq!(reader.peek_buffered(), b"f");
    }

    #[tokio::test]
    async fn read_exact_returns_short_at_eof() {
        let mock = tokio_test::io::Builder::new().read(b"xy").build();
        let mut reader = reader(mock);

        let bytes = reader.read_exact(10).await.unwrap();
        assert_eq!(&bytes[..], b"xy");
        assert!(reader.is_eof());

        // Exhausted on both fronts: empty result, no blocking.
        let bytes = reader.read_exact(10).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn read_line_waits_for_terminator() {
        let mock = tokio_test::io::Builder::new()
            .read(b"first li")
            .read(b"ne\nsecond\n")
            .build();
        let mut reader = reader(mock);

        let line = reader.read_line().await.unwrap().unwrap();
        assert_eq!(&line[..], b"first line\n");
        let line = reader.read_line().await.unwrap().unwrap();
        assert_eq!(&line[..], b"second\n");
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn read_line_returns_unterminated_tail_at_eof() {
        let mock = tokio_test::io::Builder::new().read(b"no newline").build();
        let mut reader = reader(mock);

        let line = reader.read_line().await.unwrap().unwrap();
        assert_eq!(&line[..], b"no newline");
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn peek_does_not_consume() {
        let mock = tokio_test::io::Builder::new().read(b"abcdef").build();
        let mut reader = reader(mock);

        let peeked = reader.peek(4).await.unwrap().to_vec();
        assert_eq!(peeked, b"abcd");
        assert_eq!(reader.peek_buffered().len(), 6);

        let read = reader.read_exact(4).await.unwrap();
        assert_eq!(&read[..], &peeked[..]);
        assert_eq!(reader.peek_buffered(), b"ef");
    }

    #[tokio::test]
    async fn read_all_collects_until_eof() {
        let mock = tokio_test::io::Builder::new()
            .read(b"one ")
            .read(b"two ")
            .read(b"three")
            .build();
        let mut reader = reader(mock);

        let all = reader.read_all().await.unwrap();
        assert_eq!(&all[..], b"one two three");
    }

    #[tokio::test]
    async fn failed_fill_terminates_stream_and_propagates() {
        let mock = tokio_test::io::Builder::new()
            .read(b"ab")
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
            .build();
        let mut reader = reader(mock);

        let err = reader.read_exact(5).await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(reader.is_eof());

        // Already-cooked bytes stay readable and nothing blocks afterwards.
        let bytes = reader.read_exact(5).await.unwrap();
        assert_eq!(&bytes[..], b"ab");
        let bytes = reader.read_exact(5).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn terminated_reader_fails_fast() {
        let mock = tokio_test::io::Builder::new().build();
        let mut reader = reader(mock);
        reader.terminated.store(true, Ordering::Release);

        assert!(matches!(reader.read_exact(1).await, Err(Error::Terminated)));
        assert!(matches!(reader.read_line().await, Err(Error::Terminated)));
    }
}
