//! Protocol layer: wire constants, inbound frame parsing, negotiation policy.
//!
//! Everything here is pure and I/O-free; the stream layer drives it against
//! the network.

mod handler;
mod parser;
pub mod wire;

pub use handler::{Ignore, NegotiationHandler, RefuseAll};
pub use parser::{Event, FrameParser};
pub use wire::Verb;
