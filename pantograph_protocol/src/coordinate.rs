//! # Pan/tilt coordinate encoding
//!
//! Positions are 16-bit two's-complement integers, but VISCA never puts a
//! whole byte of a coordinate on the wire. Each hex digit travels in the low
//! nibble of its own byte, and the high nibble is always `0`:
//!
//! ```text
//! value   = -2224 = 0xF750
//! digits  =  F  7  5  0
//! wire    = 0F 07 05 00
//! ```
//!
//! Written as the ASCII hex dump of a reply (which is what most camera manuals
//! show), that is `0F070500`: the characters at odd indices carry the value.
use crate::{Error, Result};

/// Number of wire bytes used by one coordinate.
pub const COORDINATE_LENGTH: usize = 4;

/// Converts a signed coordinate into its four hex digits, most significant
/// first. Each digit is in `0..=0xF`, ready to be written as its own byte.
pub fn encode_coordinate(value: i16) -> [u8; COORDINATE_LENGTH] {
    let v = value as u16;
    [
        ((v >> 12) & 0xf) as u8,
        ((v >> 8) & 0xf) as u8,
        ((v >> 4) & 0xf) as u8,
        (v & 0xf) as u8,
    ]
}

/// Converts four coordinate wire bytes back into a signed coordinate.
///
/// Only the low nibble of each byte is used.
pub fn decode_coordinate(wire: [u8; COORDINATE_LENGTH]) -> i16 {
    if wire.iter().any(|b| b & 0xf0 != 0) {
        debug!("coordinate has non-zero padding nibbles: {wire:02x?}");
    }

    wire.iter()
        .fold(0u16, |acc, b| (acc << 4) | u16::from(b & 0xf)) as i16
}

/// Converts the 8-character ASCII hex rendering of a coordinate (eg:
/// `"0F070500"`) into a signed coordinate.
///
/// ## Errors
///
/// * [`Error::InvalidParameter`] if `hex` is not exactly 8 hex digits.
pub fn decode_coordinate_hex(hex: &str) -> Result<i16> {
    if hex.len() != COORDINATE_LENGTH * 2 || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidParameter(format!(
            "expected {} hex digits for a coordinate, got {hex:?}",
            COORDINATE_LENGTH * 2
        )));
    }

    let digits: String = hex.chars().skip(1).step_by(2).collect();
    let v = u16::from_str_radix(&digits, 16)
        .map_err(|e| Error::InvalidParameter(format!("{hex:?}: {e}")))?;
    Ok(v as i16)
}
