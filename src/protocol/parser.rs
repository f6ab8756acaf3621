//! Inbound frame parser: raw wire bytes to cooked application data.
//!
//! The parser owns two queues. The raw queue holds bytes exactly as received
//! from the network, not yet scanned; the cooked queue holds bytes fully
//! classified as literal application data, with escape framing removed.
//! `classify` moves bytes from one to the other without ever touching the
//! network, so the reader can interleave fills and scans as it pleases.
//!
//! A control envelope may arrive split across any number of network fills.
//! The scan state is an explicit value kept on the parser between calls, so
//! a scan that runs out of bytes mid-envelope resumes exactly where it
//! stopped on the next call.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use memchr::memchr;

use super::wire::{self, Verb};

/// A recognized control sequence, forwarded to the negotiation handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A two-byte command: `IAC <cmd>` where `<cmd>` is not a verb or SB.
    ///
    /// Covers NOP, GA, AYT and friends, and also any byte this crate does
    /// not recognize: unknown commands are forwarded rather than treated as
    /// fatal, so a peer sending unsupported options cannot kill the session.
    Command(u8),

    /// A three-byte negotiation: `IAC <verb> <option>`.
    Negotiate { verb: Verb, option: u8 },

    /// A subnegotiation block: `IAC SB <option> <payload> IAC SE`.
    ///
    /// The payload has doubled-IAC escapes already collapsed.
    Subnegotiate { option: u8, payload: Vec<u8> },
}

/// Scan state, persisted across `classify` calls while an envelope is
/// incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Copying literal data.
    Normal,
    /// Saw IAC, awaiting the command byte.
    Command,
    /// Saw IAC + verb, awaiting the option code.
    Negotiate(Verb),
    /// Saw IAC SB, awaiting the option code.
    SubnegotiateOption,
    /// Accumulating a subnegotiation payload for this option.
    Subnegotiate(u8),
    /// Saw IAC inside a subnegotiation payload.
    SubnegotiateIac(u8),
}

/// State machine that strips RFC 854 control framing from a byte stream.
#[derive(Debug)]
pub struct FrameParser {
    raw: BytesMut,
    cooked: BytesMut,
    state: State,
    /// Payload accumulator for an in-flight subnegotiation.
    subneg: Vec<u8>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            raw: BytesMut::with_capacity(4096),
            cooked: BytesMut::with_capacity(4096),
            state: State::Normal,
            subneg: Vec::new(),
        }
    }

    /// Append received bytes to the raw queue.
    pub fn push(&mut self, bytes: &[u8]) {
        self.raw.extend_from_slice(bytes);
    }

    /// The raw queue, for the reader to fill directly from the socket.
    pub(crate) fn raw_mut(&mut self) -> &mut BytesMut {
        &mut self.raw
    }

    /// Scan the raw queue, moving literal bytes to the cooked queue and
    /// emitting an [`Event`] for each complete control envelope.
    ///
    /// Never blocks. Stops when the raw queue is exhausted or ends
    /// mid-envelope; in the latter case the scan state is preserved so the
    /// next call resumes correctly after more bytes are pushed.
    pub fn classify<F>(&mut self, sink: &mut F)
    where
        F: FnMut(Event),
    {
        loop {
            match self.state {
                State::Normal => {
                    if self.raw.is_empty() {
                        break;
                    }
                    match memchr(wire::IAC, &self.raw) {
                        Some(0) => {
                            self.raw.advance(1);
                            self.state = State::Command;
                        }
                        Some(i) => {
                            let run = self.raw.split_to(i);
                            self.cooked.extend_from_slice(&run);
                            self.raw.advance(1);
                            self.state = State::Command;
                        }
                        None => {
                            let run = self.raw.split_to(self.raw.len());
                            self.cooked.extend_from_slice(&run);
                            break;
                        }
                    }
                }
                State::Command => {
                    let Some(byte) = self.pop() else { break };
                    match byte {
                        // Doubled escape: one literal IAC in the data.
                        wire::IAC => {
                            self.cooked.put_u8(wire::IAC);
                            self.state = State::Normal;
                        }
                        wire::SB => self.state = State::SubnegotiateOption,
                        _ => match Verb::from_byte(byte) {
                            Some(verb) => self.state = State::Negotiate(verb),
                            None => {
                                sink(Event::Command(byte));
                                self.state = State::Normal;
                            }
                        },
                    }
                }
                State::Negotiate(verb) => {
                    let Some(option) = self.pop() else { break };
                    sink(Event::Negotiate { verb, option });
                    self.state = State::Normal;
                }
                State::SubnegotiateOption => {
                    let Some(option) = self.pop() else { break };
                    self.state = State::Subnegotiate(option);
                }
                State::Subnegotiate(option) => {
                    if self.raw.is_empty() {
                        break;
                    }
                    match memchr(wire::IAC, &self.raw) {
                        Some(i) => {
                            self.subneg.extend_from_slice(&self.raw[..i]);
                            self.raw.advance(i + 1);
                            self.state = State::SubnegotiateIac(option);
                        }
                        None => {
                            self.subneg.extend_from_slice(&self.raw);
                            self.raw.clear();
                            break;
                        }
                    }
                }
                State::SubnegotiateIac(option) => {
                    let Some(byte) = self.pop() else { break };
                    match byte {
                        wire::SE => {
                            sink(Event::Subnegotiate {
                                option,
                                payload: std::mem::take(&mut self.subneg),
                            });
                            self.state = State::Normal;
                        }
                        // Escaped literal IAC inside the payload.
                        wire::IAC => {
                            self.subneg.push(wire::IAC);
                            self.state = State::Subnegotiate(option);
                        }
                        // Anything else inside SB is not ours to interpret.
                        _ => self.state = State::Subnegotiate(option),
                    }
                }
            }
        }
    }

    /// Consume one byte from the front of the raw queue.
    fn pop(&mut self) -> Option<u8> {
        if self.raw.is_empty() {
            None
        } else {
            let byte = self.raw[0];
            self.raw.advance(1);
            Some(byte)
        }
    }

    /// The cooked queue contents, without consuming them.
    pub fn cooked(&self) -> &[u8] {
        &self.cooked
    }

    pub fn cooked_len(&self) -> usize {
        self.cooked.len()
    }

    /// Remove and return the first `n` cooked bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the cooked queue length.
    pub fn split_cooked(&mut self, n: usize) -> Bytes {
        self.cooked.split_to(n).freeze()
    }

    /// Remove and return the entire cooked queue.
    pub fn take_cooked(&mut self) -> Bytes {
        self.cooked.split().freeze()
    }

    /// Number of raw bytes not yet examined.
    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    /// True when the scanner is not in the middle of a control envelope.
    pub fn is_quiescent(&self) -> bool {
        self.state == State::Normal
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}
