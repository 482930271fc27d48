//! Platform handle providers.
//!
//! Exactly one `NativeHandle` implementation is selected at build time, so
//! callers stay portable against an identical interface. Only Windows has a
//! native implementation of the timeout model; the stub used everywhere else
//! documents its divergence instead of hiding it.

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::NativeHandle;

#[cfg(not(windows))]
mod unsupported;
#[cfg(not(windows))]
pub use unsupported::NativeHandle;
