//! EGIS frame check bytes
//!
//! The sensor rejects any write whose 16-bit word sum, taken over the whole frame
//! (check bytes included), is not a multiple of 0xFFFF:
//! 1. Build the frame with the 2 check bytes zeroed
//! 2. Sum consecutive byte pairs as unsigned 16-bit words (first byte low);
//!    a trailing odd byte counts on its own
//! 3. Check value = 0xFFFF - (sum % 0xFFFF)
//! 4. Write the check value low byte first into the check slot
//!
//! Because 0x10000 ≡ 1 (mod 0xFFFF), swapping the bytes of every word only
//! multiplies the residue by 0x100, so an even-length frame satisfies the
//! invariant whether its words are read big- or little-endian.

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::constants::CHECK_BYTES_LENGTH;

/// Sum a buffer as 16-bit words, the way the device does
///
/// # Examples
///
/// ```
/// use egismoc_core::checksum;
///
/// assert_eq!(checksum::word_sum(&[0x01, 0x02, 0x03]), 0x0201 + 0x03);
/// ```
pub fn word_sum(buf: &[u8]) -> u64 {
    buf.chunks(2)
        .map(|chunk| {
            if chunk.len() == 2 {
                LittleEndian::read_u16(chunk) as u64
            } else {
                chunk[0] as u64
            }
        })
        .sum()
}

/// Derive the check value for a buffer whose check slot is zeroed
///
/// Returns the smallest value in `1..=0xFFFF` that brings the word sum to a
/// multiple of 0xFFFF.
pub fn calculate(buf: &[u8]) -> u16 {
    let sum = word_sum(buf);
    let check = 0xFFFF - (sum % 0xFFFF) as u16;

    trace!(
        len = buf.len(),
        sum = sum,
        check = format!("0x{:04X}", check),
        "Calculated check bytes"
    );

    check
}

/// Check bytes as they are laid out on the wire
pub fn check_bytes(buf: &[u8]) -> [u8; CHECK_BYTES_LENGTH] {
    calculate(buf).to_le_bytes()
}

/// Verify that a complete frame satisfies the checksum invariant
pub fn verify(frame: &[u8]) -> bool {
    word_sum(frame) % 0xFFFF == 0
}
