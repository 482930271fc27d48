//! The timeout model and its translation into driver timeout parameters.
//!
//! Callers describe timing with [`Timeouts`], a portable three-field value.
//! The driver consumes [`CommTimeouts`], the five-field millisecond layout of
//! the native comm-timeout structure. The [`From`] conversion between the two
//! is the only derivation new code should use; [`CommTimeouts::from_legacy_options`]
//! reproduces the numeric behavior of the historical open-time derivation and
//! exists purely so older configurations keep working unchanged.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call timing constraints for port I/O.
///
/// Each field is independently optional: a zero duration removes that
/// constraint entirely. The configuration lives driver-side, one slot per
/// handle, so installing a `Timeouts` affects every subsequent call on the
/// port until it is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Longest idle gap allowed between two received bytes before a read
    /// completes with whatever it has collected so far.
    pub read_intercharacter: Duration,

    /// Upper bound on the total duration of one read call. A read that hits
    /// this deadline with nothing received returns zero bytes, which is a
    /// normal outcome rather than an error.
    pub read_total: Duration,

    /// Upper bound on the total duration of one write call. A write that
    /// cannot drain within this bound fails with a timeout error.
    pub write_total: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read_intercharacter: Duration::from_millis(1),
            read_total: Duration::from_millis(100),
            write_total: Duration::from_millis(100),
        }
    }
}

impl Timeouts {
    /// Replace the read-intercharacter constraint.
    pub fn with_read_intercharacter(mut self, gap: Duration) -> Self {
        self.read_intercharacter = gap;
        self
    }

    /// Replace the read-total constraint.
    pub fn with_read_total(mut self, total: Duration) -> Self {
        self.read_total = total;
        self
    }

    /// Replace the write-total constraint.
    pub fn with_write_total(mut self, total: Duration) -> Self {
        self.write_total = total;
        self
    }
}

/// Native comm-timeout parameters, in milliseconds.
///
/// Field order and meaning mirror the driver structure verbatim; this layout
/// and the numbers produced for it are a compatibility contract. The driver
/// computes each deadline as `multiplier * transfer_size + constant`, with
/// [`CommTimeouts::INFINITE`] in the interval and read multiplier fields
/// selecting the special "return buffered data immediately, otherwise wait up
/// to the constant" mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommTimeouts {
    pub read_interval_timeout: u32,
    pub read_total_timeout_multiplier: u32,
    pub read_total_timeout_constant: u32,
    pub write_total_timeout_multiplier: u32,
    pub write_total_timeout_constant: u32,
}

impl CommTimeouts {
    /// Sentinel the driver reads as "infinite / disable this dimension".
    pub const INFINITE: u32 = u32::MAX;

    /// Baseline configuration installed on a freshly opened port: a 1ms
    /// intercharacter gap, 100ms total deadlines, multipliers unused.
    pub const fn baseline() -> Self {
        Self {
            read_interval_timeout: 1,
            read_total_timeout_multiplier: 0,
            read_total_timeout_constant: 100,
            write_total_timeout_multiplier: 0,
            write_total_timeout_constant: 100,
        }
    }

    /// Derive driver parameters from the historical open-time options.
    ///
    /// Kept bit-for-bit compatible with the original derivation: the
    /// inter-character option is interpreted in units of 100ms (the quotient
    /// is rounded half-up), and the choice between modes is made on that
    /// rounded value, not on the raw input. The three branches are mutually
    /// exclusive and must keep this precedence:
    ///
    /// 1. rounded constant > 0 and no minimum read size: non-blocking mode —
    ///    return buffered bytes immediately, otherwise wait up to the
    ///    constant for the first byte;
    /// 2. minimum read size set: block until input arrives;
    /// 3. neither: wait almost forever. The original intent behind this
    ///    fallback is unknown; its numbers are preserved, not rationalized.
    ///
    /// New code should install a [`Timeouts`] value instead.
    pub fn from_legacy_options(inter_character_timeout_ms: u32, minimum_read_size: u32) -> Self {
        let constant = round_half_up(f64::from(inter_character_timeout_ms) / 100.0);

        let mut cto = Self {
            read_interval_timeout: 0,
            read_total_timeout_multiplier: 0,
            read_total_timeout_constant: 0,
            write_total_timeout_multiplier: 0,
            write_total_timeout_constant: 0,
        };

        if constant > 0 && minimum_read_size == 0 {
            cto.read_interval_timeout = Self::INFINITE;
            cto.read_total_timeout_multiplier = Self::INFINITE;
            cto.read_total_timeout_constant = constant;
        } else if minimum_read_size > 0 {
            cto.read_interval_timeout = minimum_read_size;
            cto.read_total_timeout_multiplier = 1;
            cto.read_total_timeout_constant = 1;
        } else {
            cto.read_interval_timeout = Self::INFINITE;
            cto.read_total_timeout_multiplier = Self::INFINITE;
            cto.read_total_timeout_constant = Self::INFINITE - 1;
        }

        cto
    }
}

impl From<Timeouts> for CommTimeouts {
    /// Translate the portable timeout model onto the driver fields, starting
    /// from [`CommTimeouts::baseline`]. Only the constant, per-call deadlines
    /// are modeled; both multipliers stay zero.
    fn from(timeouts: Timeouts) -> Self {
        let mut cto = Self::baseline();
        cto.read_interval_timeout = as_millis_u32(timeouts.read_intercharacter);
        cto.read_total_timeout_constant = as_millis_u32(timeouts.read_total);
        cto.write_total_timeout_constant = as_millis_u32(timeouts.write_total);
        cto
    }
}

/// Millisecond truncation into the driver's 32-bit field.
fn as_millis_u32(duration: Duration) -> u32 {
    duration.as_millis() as u32
}

/// Round-half-up on the already-divided quotient. The legacy derivation
/// depends on this exact rounding, so it is not `f64::round` (which rounds
/// half away from zero; equal here, but the floor form is the contract).
fn round_half_up(quotient: f64) -> u32 {
    (quotient + 0.5).floor() as u32
}
