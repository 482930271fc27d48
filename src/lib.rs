//! Synchronous serial port I/O governed by an explicit timeout model.
//!
//! Timing on a port is described by [`Timeouts`], three independent
//! constraints: a read-intercharacter gap, a read-total deadline, and a
//! write-total deadline. Installing them translates the value into the
//! driver's five-field [`CommTimeouts`] representation; a separate legacy
//! derivation reproduces the numeric behavior of the historical open-time
//! options bit for bit.
//!
//! The resulting call semantics are deliberately simple and blocking:
//!
//! - a read returns early with whatever arrived once the intercharacter gap
//!   elapses, and returns `Ok(0)` — not an error — when the total deadline
//!   passes with no data;
//! - a write that cannot drain within its deadline fails with a timeout
//!   error reporting the partial count;
//! - closing the port is the only way to release a call blocked on another
//!   thread.
//!
//! # Modules
//!
//! - `timeouts`: the timeout model and both translations into driver form
//! - `options`: open-time line configuration
//! - `port`: the [`Port`] object, its operation contract, and [`MockHandle`]
//! - `sys`: build-selected native handle providers
//! - `error`: unified error handling
//!
//! # Platform support
//!
//! Native timeout enforcement exists on Windows, where the model maps
//! directly onto the driver's comm-timeout structure. Other platforms accept
//! timeout and purge configuration as silent no-ops and perform plain
//! blocking I/O with no per-call deadline; opening a native port there
//! reports [`PortError::NotSupported`].
//!
//! # Example
//!
//! ```
//! use comport::{MockHandle, Port, Timeouts};
//! use std::time::Duration;
//!
//! let handle = MockHandle::new("MOCK0");
//! handle.enqueue_read(b"ok");
//!
//! let port = Port::from_handle(handle);
//! let timeouts = Timeouts::default().with_read_total(Duration::from_millis(50));
//! let mut buf = [0u8; 16];
//! let n = port.read_with_timeouts(&mut buf, timeouts)?;
//! assert_eq!(&buf[..n], b"ok");
//! # Ok::<(), comport::PortError>(())
//! ```

pub mod error;
pub mod options;
pub mod port;
pub mod sys;
pub mod timeouts;

// Re-export commonly used types for convenience
pub use error::{PortError, Result};
pub use options::{DataBits, FlowControl, OpenOptions, Parity, StopBits};
pub use port::{MockHandle, Port, SerialHandle};
pub use sys::NativeHandle;
pub use timeouts::{CommTimeouts, Timeouts};
