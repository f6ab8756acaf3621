//! The two session-facing byte streams.
//!
//! [`TelnetReader`] pulls cooked data out of the connection;
//! [`TelnetWriter`] pushes escaped data into it. Both are normally obtained
//! from a [`TelnetSession`](crate::session::TelnetSession).

mod reader;
mod writer;

pub use reader::TelnetReader;
pub use writer::TelnetWriter;
