//! Stub provider for platforms without a native implementation.
//!
//! Opening a port fails outright here. The remaining bodies mirror the
//! documented fallback semantics for handles without native timeout support:
//! timeout and purge application succeed as silent no-ops, which leaves reads
//! and writes as plain blocking calls with no per-call deadline, and the raw
//! I/O primitives themselves report [`PortError::NotSupported`].

use crate::error::{PortError, Result};
use crate::options::OpenOptions;
use crate::port::SerialHandle;
use crate::timeouts::CommTimeouts;

/// Placeholder handle; [`NativeHandle::open`] never hands one out.
#[derive(Debug)]
pub struct NativeHandle {
    _private: (),
}

impl NativeHandle {
    pub(crate) fn open(_port_name: &str, _options: &OpenOptions) -> Result<Self> {
        Err(PortError::NotSupported)
    }
}

impl SerialHandle for NativeHandle {
    fn is_open(&self) -> bool {
        true
    }

    fn raw_read(&self, _buf: &mut [u8]) -> Result<usize> {
        Err(PortError::NotSupported)
    }

    fn raw_write(&self, _buf: &[u8]) -> Result<usize> {
        Err(PortError::NotSupported)
    }

    fn apply_timeouts(&self, _timeouts: CommTimeouts) -> Result<()> {
        // No native timeout support; the configuration is accepted silently.
        Ok(())
    }

    fn apply_purge(&self, _clear_rx: bool, _clear_tx: bool) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Err(PortError::NotSupported)
    }
}
