//! Windows handle provider backed by the kernel32 comm API.

use crate::error::{PortError, Result};
use crate::options::{FlowControl, OpenOptions, Parity};
use crate::port::SerialHandle;
use crate::timeouts::CommTimeouts;
use std::ffi::OsStr;
use std::mem;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use winapi::shared::minwindef::DWORD;
use winapi::um::commapi::{PurgeComm, SetCommState, SetCommTimeouts, SetupComm};
use winapi::um::fileapi::{CreateFileW, ReadFile, WriteFile, OPEN_EXISTING};
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::winbase::{
    COMMTIMEOUTS, DCB, DTR_CONTROL_ENABLE, PURGE_RXCLEAR, PURGE_TXCLEAR, RTS_CONTROL_HANDSHAKE,
};
use winapi::um::winnt::{FILE_ATTRIBUTE_NORMAL, GENERIC_READ, GENERIC_WRITE, HANDLE};

/// Driver-side rx/tx buffer sizes requested at open time.
const COMM_BUFFER_SIZE: DWORD = 64;

/// A Windows serial handle.
///
/// The handle value lives in an atomic slot so `close` can invalidate it
/// while another thread sits blocked inside `ReadFile`/`WriteFile`; the
/// kernel then fails the blocked call with a system error. That is the only
/// cancellation mechanism this type offers.
#[derive(Debug)]
pub struct NativeHandle {
    handle: AtomicUsize,
}

impl NativeHandle {
    pub(crate) fn open(port_name: &str, options: &OpenOptions) -> Result<Self> {
        let path = device_path(port_name);
        if path.contains('\0') {
            return Err(PortError::invalid_config(format!(
                "port name contains a NUL byte: {port_name:?}"
            )));
        }
        let wide: Vec<u16> = OsStr::new(&path).encode_wide().chain(Some(0)).collect();

        let raw = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                0,
                ptr::null_mut(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                ptr::null_mut(),
            )
        };
        if raw == INVALID_HANDLE_VALUE {
            return Err(PortError::last_os_error());
        }

        // From here on a failure drops `handle`, which closes the raw handle.
        let handle = Self {
            handle: AtomicUsize::new(raw as usize),
        };
        handle.set_comm_state(options)?;
        handle.setup_comm(COMM_BUFFER_SIZE, COMM_BUFFER_SIZE)?;
        handle.apply_timeouts(CommTimeouts::from_legacy_options(
            options.inter_character_timeout_ms,
            options.minimum_read_size,
        ))?;

        debug!(port = path.as_str(), "acquired comm handle");
        Ok(handle)
    }

    fn get(&self) -> Result<HANDLE> {
        let raw = self.handle.load(Ordering::SeqCst) as HANDLE;
        if raw.is_null() || raw == INVALID_HANDLE_VALUE {
            Err(PortError::InvalidHandle)
        } else {
            Ok(raw)
        }
    }

    fn set_comm_state(&self, options: &OpenOptions) -> Result<()> {
        let handle = self.get()?;

        let mut dcb: DCB = unsafe { mem::zeroed() };
        dcb.DCBlength = mem::size_of::<DCB>() as DWORD;
        dcb.set_fBinary(1);
        dcb.set_fDtrControl(DTR_CONTROL_ENABLE);

        dcb.BaudRate = options.baud_rate;
        dcb.ByteSize = options.data_bits.into();
        dcb.StopBits = options.stop_bits.into();
        if options.parity != Parity::None {
            dcb.set_fParity(1);
            dcb.Parity = options.parity.into();
        }
        if options.flow_control == FlowControl::Hardware {
            dcb.set_fOutxCtsFlow(1);
            dcb.set_fRtsControl(RTS_CONTROL_HANDSHAKE);
        }

        if unsafe { SetCommState(handle, &mut dcb) } == 0 {
            return Err(PortError::last_os_error());
        }
        Ok(())
    }

    fn setup_comm(&self, rx_size: DWORD, tx_size: DWORD) -> Result<()> {
        let handle = self.get()?;
        if unsafe { SetupComm(handle, rx_size, tx_size) } == 0 {
            return Err(PortError::last_os_error());
        }
        Ok(())
    }
}

impl SerialHandle for NativeHandle {
    fn is_open(&self) -> bool {
        self.get().is_ok()
    }

    fn raw_read(&self, buf: &mut [u8]) -> Result<usize> {
        let handle = self.get()?;
        let mut transferred: DWORD = 0;
        let ok = unsafe {
            ReadFile(
                handle,
                buf.as_mut_ptr().cast(),
                buf.len() as DWORD,
                &mut transferred,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(PortError::last_os_error());
        }
        Ok(transferred as usize)
    }

    fn raw_write(&self, buf: &[u8]) -> Result<usize> {
        let handle = self.get()?;
        let mut transferred: DWORD = 0;
        let ok = unsafe {
            WriteFile(
                handle,
                buf.as_ptr().cast(),
                buf.len() as DWORD,
                &mut transferred,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(PortError::last_os_error());
        }
        Ok(transferred as usize)
    }

    fn apply_timeouts(&self, timeouts: CommTimeouts) -> Result<()> {
        let handle = self.get()?;
        let mut cto = COMMTIMEOUTS {
            ReadIntervalTimeout: timeouts.read_interval_timeout,
            ReadTotalTimeoutMultiplier: timeouts.read_total_timeout_multiplier,
            ReadTotalTimeoutConstant: timeouts.read_total_timeout_constant,
            WriteTotalTimeoutMultiplier: timeouts.write_total_timeout_multiplier,
            WriteTotalTimeoutConstant: timeouts.write_total_timeout_constant,
        };
        if unsafe { SetCommTimeouts(handle, &mut cto) } == 0 {
            return Err(PortError::last_os_error());
        }
        Ok(())
    }

    fn apply_purge(&self, clear_rx: bool, clear_tx: bool) -> Result<()> {
        let handle = self.get()?;
        let mut flags: DWORD = 0;
        if clear_rx {
            flags |= PURGE_RXCLEAR;
        }
        if clear_tx {
            flags |= PURGE_TXCLEAR;
        }
        if unsafe { PurgeComm(handle, flags) } == 0 {
            return Err(PortError::last_os_error());
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let raw = self.handle.swap(INVALID_HANDLE_VALUE as usize, Ordering::SeqCst) as HANDLE;
        if raw.is_null() || raw == INVALID_HANDLE_VALUE {
            return Err(PortError::InvalidHandle);
        }
        if unsafe { CloseHandle(raw) } == 0 {
            return Err(PortError::last_os_error());
        }
        Ok(())
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        let raw = self.handle.swap(INVALID_HANDLE_VALUE as usize, Ordering::SeqCst) as HANDLE;
        if !raw.is_null() && raw != INVALID_HANDLE_VALUE {
            unsafe { CloseHandle(raw) };
        }
    }
}

/// Bare port names need the device-namespace prefix; anything already
/// starting with a backslash is passed through untouched.
fn device_path(port_name: &str) -> String {
    if port_name.starts_with('\\') {
        port_name.to_string()
    } else {
        format!(r"\\.\{port_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_device_path_prefixes_bare_names() {
        assert_eq!(device_path("COM3"), r"\\.\COM3");
        assert_eq!(device_path("COM22"), r"\\.\COM22");
    }

    #[test]
    fn test_device_path_keeps_explicit_paths() {
        assert_eq!(device_path(r"\\.\COM42"), r"\\.\COM42");
    }

    #[test]
    fn test_open_missing_port_is_a_system_error() {
        let result = NativeHandle::open("COM254", &OpenOptions::default());
        assert!(matches!(result, Err(PortError::Io(_))));
    }
}
