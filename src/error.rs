//! Error types for telwire.

use std::io;
use thiserror::Error;

/// Main error type for telwire operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying transport failure or reset.
    ///
    /// Surfaces immediately from a network fill or write, terminates the
    /// session, and is never retried internally. The caller is responsible
    /// for tearing the session down.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// An operation was invoked on a session that has been torn down.
    ///
    /// Always fails fast; a terminated session never blocks.
    #[error("session terminated")]
    Terminated,
}

/// Result type alias using telwire's Error.
pub type Result<T> = std::result::Result<T, Error>;
