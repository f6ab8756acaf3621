//! Session configuration.

/// Tuning knobs for a [`TelnetSession`](super::TelnetSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How many bytes to request from the connection per network fill.
    pub fill_chunk: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { fill_chunk: 4096 }
    }
}
