//! Open-time port configuration.
//!
//! These options describe line parameters the driver needs once, when the
//! handle is created. The two legacy timing fields feed
//! [`CommTimeouts::from_legacy_options`](crate::timeouts::CommTimeouts::from_legacy_options)
//! to produce the timeout configuration initially installed on the handle;
//! code written against the current model replaces it with
//! [`Port::set_timeouts`](crate::port::Port::set_timeouts) before doing I/O.

use serde::{Deserialize, Serialize};

/// Line and timing parameters applied when a port is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOptions {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Number of data bits per character.
    pub data_bits: DataBits,

    /// Parity checking mode.
    pub parity: Parity,

    /// Number of stop bits.
    pub stop_bits: StopBits,

    /// Flow control mode.
    pub flow_control: FlowControl,

    /// Legacy inter-character timeout in milliseconds. Together with
    /// `minimum_read_size` it selects the timeout configuration the handle
    /// starts out with; see the legacy derivation for the exact semantics.
    pub inter_character_timeout_ms: u32,

    /// Legacy minimum read size. Non-zero selects the block-until-input
    /// timeout configuration at open time.
    pub minimum_read_size: u32,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            inter_character_timeout_ms: 100,
            minimum_read_size: 0,
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for u8 {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for u8 {
    /// The driver's parity encoding (none = 0, odd = 1, even = 2).
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => 0,
            Parity::Odd => 1,
            Parity::Even => 2,
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for u8 {
    /// The driver's stop-bit encoding (one = 0, two = 2).
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => 0,
            StopBits::Two => 2,
        }
    }
}

/// Flow control modes. Only RTS/CTS hardware handshaking is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowControl {
    None,
    Hardware,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options() {
        let options = OpenOptions::default();
        assert_eq!(options.baud_rate, 9600);
        assert_eq!(options.data_bits, DataBits::Eight);
        assert_eq!(options.parity, Parity::None);
        assert_eq!(options.stop_bits, StopBits::One);
        assert_eq!(options.flow_control, FlowControl::None);
        assert_eq!(options.inter_character_timeout_ms, 100);
        assert_eq!(options.minimum_read_size, 0);
    }

    #[test]
    fn test_driver_encodings() {
        assert_eq!(u8::from(DataBits::Seven), 7);
        assert_eq!(u8::from(Parity::Even), 2);
        assert_eq!(u8::from(StopBits::One), 0);
        assert_eq!(u8::from(StopBits::Two), 2);
    }

    #[test]
    fn test_serde_round_trip() {
        let options = OpenOptions {
            baud_rate: 115_200,
            parity: Parity::Odd,
            flow_control: FlowControl::Hardware,
            ..Default::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        let back: OpenOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
