//! The capability seam between the port object and the OS handle provider.

use crate::error::Result;
use crate::timeouts::CommTimeouts;
use std::fmt;

/// One configured OS serial handle.
///
/// [`Port`](super::Port) composes these primitives into the timeout-aware
/// operation contract; implementations only perform the raw system calls and
/// pass their errors through unmodified. Methods take `&self` because closing
/// the handle is the sole cancellation mechanism and must work while another
/// thread sits blocked inside `raw_read` or `raw_write` — providers keep the
/// handle slot behind interior mutability for exactly this reason.
pub trait SerialHandle: Send + Sync + fmt::Debug {
    /// Whether the handle is currently valid.
    fn is_open(&self) -> bool;

    /// One blocking read of up to `buf.len()` bytes, governed by whatever
    /// timeout configuration the driver currently holds. Zero bytes means
    /// the read deadline elapsed with nothing available.
    fn raw_read(&self, buf: &mut [u8]) -> Result<usize>;

    /// One blocking write of `buf`, governed by the current timeout
    /// configuration. May report fewer bytes than requested when the
    /// write-total deadline expires mid-transfer.
    fn raw_write(&self, buf: &[u8]) -> Result<usize>;

    /// Push a timeout configuration into the driver's per-handle slot.
    /// Providers without native timeout support accept the configuration
    /// silently and leave reads and writes as plain blocking calls.
    fn apply_timeouts(&self, timeouts: CommTimeouts) -> Result<()>;

    /// Discard bytes sitting in the driver's receive and/or transmit
    /// buffers, per the two independent flags.
    fn apply_purge(&self, clear_rx: bool, clear_tx: bool) -> Result<()>;

    /// Invalidate the handle. A call blocked on another thread observes
    /// either its completed result or a system error soon after, with
    /// driver-dependent latency; there is no cooperative cancellation.
    fn close(&self) -> Result<()>;
}
