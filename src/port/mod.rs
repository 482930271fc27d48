//! The port object and its timeout-aware operation contract.

pub mod handle;
pub mod mock;

pub use handle::SerialHandle;
pub use mock::MockHandle;

use crate::error::{PortError, Result};
use crate::options::OpenOptions;
use crate::sys::NativeHandle;
use crate::timeouts::{CommTimeouts, Timeouts};
use std::io;
use tracing::{debug, trace};

/// A serial port owning exactly one OS handle.
///
/// The port is generic over its [`SerialHandle`] so the same operation
/// contract runs against the build-selected native provider, or against a
/// [`MockHandle`] in tests. Handle lifetime equals port lifetime; after
/// [`Port::close`] every operation reports [`PortError::InvalidHandle`].
///
/// # Timeout state and concurrency
///
/// The driver holds a single timeout configuration per handle, not per call.
/// [`Port::read_with_timeouts`] and [`Port::write_with_timeouts`] install
/// their configuration and immediately issue the I/O as one logical step, but
/// no lock spans the pair: calling `set_timeouts` concurrently with an
/// in-flight read or write is a race over which configuration governs that
/// call, and the caller must avoid it. Closing the port is the only way to
/// release a blocked call.
#[derive(Debug)]
pub struct Port<H: SerialHandle = NativeHandle> {
    handle: H,
}

impl Port<NativeHandle> {
    /// Open `port_name` with the given line parameters.
    ///
    /// The driver starts out with the timeout configuration derived from the
    /// legacy fields of `options`; install a [`Timeouts`] value to replace it.
    ///
    /// # Example
    /// ```no_run
    /// use comport::{OpenOptions, Port};
    ///
    /// let port = Port::open("COM3", OpenOptions::default())?;
    /// # Ok::<(), comport::PortError>(())
    /// ```
    pub fn open(port_name: &str, options: OpenOptions) -> Result<Self> {
        let handle = NativeHandle::open(port_name, &options)?;
        debug!(port = port_name, baud = options.baud_rate, "opened serial port");
        Ok(Self { handle })
    }
}

impl<H: SerialHandle> Port<H> {
    /// Wrap an already-configured handle.
    pub fn from_handle(handle: H) -> Self {
        Self { handle }
    }

    /// Access the underlying handle, e.g. to inspect a mock in tests.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    fn ensure_open(&self) -> Result<()> {
        if self.handle.is_open() {
            Ok(())
        } else {
            Err(PortError::InvalidHandle)
        }
    }

    /// Install `timeouts` for subsequent I/O on this port.
    ///
    /// Idempotent and always safe to call before any I/O. On platforms
    /// without native timeout support the configuration is accepted silently
    /// and reads and writes remain plain blocking calls.
    pub fn set_timeouts(&self, timeouts: Timeouts) -> Result<()> {
        self.ensure_open()?;
        let cto = CommTimeouts::from(timeouts);
        trace!(?cto, "applying comm timeouts");
        self.handle.apply_timeouts(cto)
    }

    /// Install `timeouts`, then perform one read into `buf`.
    ///
    /// Returns the number of bytes placed in `buf`. `Ok(0)` means the
    /// read-total deadline elapsed with no data — a normal outcome, not
    /// end-of-stream and not an error. Bytes already buffered return
    /// immediately; while bytes trickle in, each one restarts the
    /// intercharacter timer, and the read completes on a full buffer, an
    /// intercharacter gap, or the total deadline, whichever comes first.
    pub fn read_with_timeouts(&self, buf: &mut [u8], timeouts: Timeouts) -> Result<usize> {
        self.set_timeouts(timeouts)?;
        self.handle.raw_read(buf)
    }

    /// Install `timeouts`, then perform one write of `buf`.
    ///
    /// If the transport cannot drain the write within the write-total
    /// deadline, fails with [`PortError::WriteTimeout`] reporting how many
    /// bytes the driver accepted before the deadline.
    pub fn write_with_timeouts(&self, buf: &[u8], timeouts: Timeouts) -> Result<usize> {
        self.set_timeouts(timeouts)?;
        let written = self.handle.raw_write(buf)?;
        if written < buf.len() {
            return Err(PortError::WriteTimeout {
                written,
                limit: timeouts.write_total,
            });
        }
        Ok(written)
    }

    /// One read under whatever timeout configuration the driver currently
    /// holds.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        self.handle.raw_read(buf)
    }

    /// One write under whatever timeout configuration the driver currently
    /// holds. Unlike [`Port::write_with_timeouts`], a partial count is
    /// returned as-is.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        self.handle.raw_write(buf)
    }

    /// Discard bytes buffered in the receive and/or transmit direction.
    ///
    /// Only driver-buffered data is affected; an operation already in flight
    /// on another thread keeps whatever it has collected.
    pub fn purge_buffers(&self, clear_rx: bool, clear_tx: bool) -> Result<()> {
        self.ensure_open()?;
        debug!(clear_rx, clear_tx, "purging port buffers");
        self.handle.apply_purge(clear_rx, clear_tx)
    }

    /// Invalidate the handle.
    ///
    /// A call blocked on another thread observes either its completed result
    /// (if it finished first) or a system error — no guarantee which. Closing
    /// an already-closed port reports [`PortError::InvalidHandle`].
    pub fn close(&self) -> Result<()> {
        self.ensure_open()?;
        debug!("closing serial port");
        self.handle.close()
    }
}

impl<H: SerialHandle> io::Read for Port<H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Port::read(self, buf).map_err(Into::into)
    }
}

impl<H: SerialHandle> io::Write for Port<H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Port::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        // The driver drains its transmit buffer on its own; per-call pacing
        // is the write-total deadline's job.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn mock_port() -> Port<MockHandle> {
        Port::from_handle(MockHandle::new("MOCK0"))
    }

    #[test]
    fn test_set_timeouts_pushes_translated_configuration() {
        let port = mock_port();
        let timeouts = Timeouts::default().with_read_total(Duration::from_millis(250));

        port.set_timeouts(timeouts).unwrap();

        let applied = port.handle().applied_timeouts();
        assert_eq!(applied, vec![CommTimeouts::from(timeouts)]);
    }

    #[test]
    fn test_read_with_timeouts_applies_before_reading() {
        let port = mock_port();
        port.handle().enqueue_read(b"abc");

        let timeouts = Timeouts::default();
        let mut buf = [0u8; 8];
        let n = port.read_with_timeouts(&mut buf, timeouts).unwrap();

        assert_eq!(&buf[..n], b"abc");
        // The configuration must land in the driver before the raw read runs.
        let log = port.handle().operation_log();
        assert_eq!(log, vec!["apply_timeouts".to_string(), "read".to_string()]);
    }

    #[test]
    fn test_read_returns_zero_on_deadline_without_error() {
        let port = mock_port();
        let timeouts = Timeouts::default().with_read_total(Duration::from_millis(20));

        let mut buf = [0u8; 4];
        let n = port.read_with_timeouts(&mut buf, timeouts).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_write_timeout_is_an_error_reporting_partial_count() {
        let port = mock_port();
        port.handle().set_write_capacity(3);

        let timeouts = Timeouts::default().with_write_total(Duration::from_millis(20));
        let result = port.write_with_timeouts(b"hello", timeouts);

        match result {
            Err(PortError::WriteTimeout { written, limit }) => {
                assert_eq!(written, 3);
                assert_eq!(limit, Duration::from_millis(20));
            }
            other => panic!("expected WriteTimeout, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_write_reports_full_count() {
        let port = mock_port();
        let n = port
            .write_with_timeouts(b"ping", Timeouts::default())
            .unwrap();
        assert_eq!(n, 4);
        assert_eq!(port.handle().write_log(), vec![b"ping".to_vec()]);
    }

    #[test]
    fn test_purge_forwards_both_flags() {
        let port = mock_port();
        port.handle().enqueue_read(b"stale");

        port.purge_buffers(true, false).unwrap();
        port.purge_buffers(false, true).unwrap();

        assert_eq!(port.handle().purge_log(), vec![(true, false), (false, true)]);
        // The rx flag is what empties the receive queue.
        assert_eq!(port.handle().available_bytes(), 0);
    }

    #[test]
    fn test_operations_after_close_report_invalid_handle() {
        let port = mock_port();
        port.close().unwrap();

        let mut buf = [0u8; 1];
        assert!(matches!(port.read(&mut buf), Err(PortError::InvalidHandle)));
        assert!(matches!(port.write(b"x"), Err(PortError::InvalidHandle)));
        assert!(matches!(
            port.set_timeouts(Timeouts::default()),
            Err(PortError::InvalidHandle)
        ));
        assert!(matches!(
            port.purge_buffers(true, true),
            Err(PortError::InvalidHandle)
        ));
    }

    #[test]
    fn test_double_close_is_an_error_not_a_crash() {
        let port = mock_port();
        port.close().unwrap();
        assert!(matches!(port.close(), Err(PortError::InvalidHandle)));
    }

    #[test]
    fn test_io_trait_impls() {
        use std::io::{Read, Write};

        let mut port = mock_port();
        port.handle().enqueue_read(b"io");

        let mut buf = [0u8; 2];
        port.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"io");

        port.write_all(b"out").unwrap();
        port.flush().unwrap();
        assert_eq!(port.handle().write_log(), vec![b"out".to_vec()]);
    }
}
