//! Mock handle implementation for testing.
//!
//! Provides a [`MockHandle`] that honors the installed [`CommTimeouts`]
//! semantics in miniature, so the port-level timeout contract is testable
//! without hardware: reads drain a queue and otherwise wait out the
//! configured deadlines, writes can be capped to force the write-total path,
//! and every applied configuration and purge is recorded for inspection.
//! Clones share state, which lets a test feed bytes into a read that is
//! blocked on another thread, or close the handle out from under it.

use super::handle::SerialHandle;
use crate::error::{PortError, Result};
use crate::timeouts::CommTimeouts;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Polling granularity for the simulated blocking wait.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Default)]
struct MockState {
    closed: bool,
    read_queue: VecDeque<u8>,
    write_log: Vec<Vec<u8>>,
    write_capacity: Option<usize>,
    applied_timeouts: Vec<CommTimeouts>,
    purge_log: Vec<(bool, bool)>,
    operation_log: Vec<String>,
}

impl MockState {
    fn current_timeouts(&self) -> CommTimeouts {
        self.applied_timeouts
            .last()
            .copied()
            .unwrap_or_else(CommTimeouts::baseline)
    }
}

/// Mock serial handle for testing.
///
/// # Example
/// ```
/// use comport::{MockHandle, Port, Timeouts};
///
/// let handle = MockHandle::new("MOCK0");
/// handle.enqueue_read(b"Hello");
///
/// let port = Port::from_handle(handle);
/// let mut buf = [0u8; 16];
/// let n = port.read_with_timeouts(&mut buf, Timeouts::default())?;
/// assert_eq!(&buf[..n], b"Hello");
/// # Ok::<(), comport::PortError>(())
/// ```
#[derive(Clone)]
pub struct MockHandle {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    /// Create an open mock handle with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// The handle name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append bytes to the receive queue. May be called from another thread
    /// (via a clone) while a read is blocked, to simulate trickling input.
    pub fn enqueue_read(&self, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.read_queue.extend(data);
    }

    /// Cap how many bytes a single write accepts, forcing the write-total
    /// timeout path for anything longer.
    pub fn set_write_capacity(&self, capacity: usize) {
        let mut state = self.state.lock().unwrap();
        state.write_capacity = Some(capacity);
    }

    /// Bytes currently waiting in the receive queue.
    pub fn available_bytes(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.read_queue.len()
    }

    /// Every chunk written so far, in order.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.write_log.clone()
    }

    /// Every timeout configuration applied so far, in order.
    pub fn applied_timeouts(&self) -> Vec<CommTimeouts> {
        let state = self.state.lock().unwrap();
        state.applied_timeouts.clone()
    }

    /// Every purge issued so far, as `(clear_rx, clear_tx)` pairs.
    pub fn purge_log(&self) -> Vec<(bool, bool)> {
        let state = self.state.lock().unwrap();
        state.purge_log.clone()
    }

    /// Names of all operations issued so far, in order. Useful for asserting
    /// that a timeout configuration lands before its I/O call.
    pub fn operation_log(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.operation_log.clone()
    }

    fn closed_error() -> PortError {
        PortError::Io(io::Error::new(
            io::ErrorKind::NotConnected,
            "handle invalidated",
        ))
    }
}

impl SerialHandle for MockHandle {
    fn is_open(&self) -> bool {
        !self.state.lock().unwrap().closed
    }

    fn raw_read(&self, buf: &mut [u8]) -> Result<usize> {
        let timeouts = {
            let mut state = self.state.lock().unwrap();
            if state.closed {
                return Err(Self::closed_error());
            }
            state.operation_log.push("read".to_string());
            state.current_timeouts()
        };

        if buf.is_empty() {
            return Ok(0);
        }

        let total = u64::from(timeouts.read_total_timeout_constant);
        let interval = timeouts.read_interval_timeout;
        let started = Instant::now();
        let mut last_progress = started;
        let mut collected = 0;

        loop {
            {
                let mut state = self.state.lock().unwrap();
                if state.closed {
                    // A close landed while we were blocked; surface it the
                    // way the driver would, as a system error.
                    return Err(Self::closed_error());
                }
                while collected < buf.len() {
                    match state.read_queue.pop_front() {
                        Some(byte) => {
                            buf[collected] = byte;
                            collected += 1;
                            last_progress = Instant::now();
                        }
                        None => break,
                    }
                }
            }

            if collected == buf.len() {
                return Ok(collected);
            }
            if collected > 0 {
                // The infinite-interval sentinel means "return whatever is
                // buffered without waiting for more".
                if interval == CommTimeouts::INFINITE {
                    return Ok(collected);
                }
                if interval > 0
                    && last_progress.elapsed() >= Duration::from_millis(u64::from(interval))
                {
                    return Ok(collected);
                }
            }
            if total > 0 && started.elapsed() >= Duration::from_millis(total) {
                return Ok(collected);
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    fn raw_write(&self, buf: &[u8]) -> Result<usize> {
        let (accepted, stall) = {
            let mut state = self.state.lock().unwrap();
            if state.closed {
                return Err(Self::closed_error());
            }
            state.operation_log.push("write".to_string());

            let accepted = state.write_capacity.map_or(buf.len(), |cap| cap.min(buf.len()));
            state.write_log.push(buf[..accepted].to_vec());

            let stall = if accepted < buf.len() {
                // A short write only returns once the write-total deadline
                // has elapsed, as on a real port with a full peer buffer.
                Duration::from_millis(u64::from(
                    state.current_timeouts().write_total_timeout_constant,
                ))
            } else {
                Duration::ZERO
            };
            (accepted, stall)
        };

        if !stall.is_zero() {
            thread::sleep(stall);
        }
        Ok(accepted)
    }

    fn apply_timeouts(&self, timeouts: CommTimeouts) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(Self::closed_error());
        }
        state.operation_log.push("apply_timeouts".to_string());
        state.applied_timeouts.push(timeouts);
        Ok(())
    }

    fn apply_purge(&self, clear_rx: bool, clear_tx: bool) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(Self::closed_error());
        }
        state.operation_log.push("purge".to_string());
        state.purge_log.push((clear_rx, clear_tx));
        if clear_rx {
            state.read_queue.clear();
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(PortError::InvalidHandle);
        }
        state.operation_log.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}

impl std::fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHandle")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
