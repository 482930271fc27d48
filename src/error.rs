//! Error types for port operations.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// A specialized `Result` type for port operations.
pub type Result<T, E = PortError> = std::result::Result<T, E>;

/// Errors surfaced by port operations.
///
/// A read deadline expiring is not represented here: a read that times out
/// with no data returns `Ok(0)`. Only a write deadline expiring with data
/// still unsent is an error, and it reports how much was transferred.
#[derive(Debug, Error)]
pub enum PortError {
    /// The port is closed, was never opened, or holds an invalidated handle.
    /// Checked locally before any call reaches the OS.
    #[error("invalid or closed port")]
    InvalidHandle,

    /// The requested operation has no native implementation on this platform.
    #[error("not implemented on this platform")]
    NotSupported,

    /// The write-total deadline expired before the transmit buffer drained.
    #[error("write timed out after {limit:?}, {written} of the requested bytes transferred")]
    WriteTimeout {
        /// Bytes the driver accepted before the deadline.
        written: usize,
        /// The write-total constraint that expired.
        limit: Duration,
    },

    /// The open options cannot be encoded for the native driver.
    #[error("invalid port configuration: {0}")]
    InvalidConfig(String),

    /// The underlying system call failed. Passed through unmodified from the
    /// handle provider.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PortError {
    /// Create an `InvalidConfig` error from a message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Wrap the calling thread's last OS error.
    #[allow(dead_code)] // Only reachable from the native providers.
    pub(crate) fn last_os_error() -> Self {
        Self::Io(io::Error::last_os_error())
    }
}

impl From<PortError> for io::Error {
    fn from(err: PortError) -> Self {
        let message = err.to_string();
        match err {
            PortError::Io(e) => e,
            PortError::InvalidHandle => io::Error::new(io::ErrorKind::NotConnected, message),
            PortError::NotSupported => io::Error::new(io::ErrorKind::Unsupported, message),
            PortError::WriteTimeout { .. } => io::Error::new(io::ErrorKind::TimedOut, message),
            PortError::InvalidConfig(_) => io::Error::new(io::ErrorKind::InvalidInput, message),
        }
    }
}
