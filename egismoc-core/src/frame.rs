//! EGIS command frame structure and encoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{checksum, constants::CHECK_BYTES_LENGTH};

/// Host to device frame prefix
pub const WRITE_PREFIX: [u8; 8] = [b'E', b'G', b'I', b'S', 0x00, 0x00, 0x00, 0x01];

/// Device to host frame prefix
pub const READ_PREFIX: [u8; 8] = [b'S', b'I', b'G', b'E', 0x00, 0x00, 0x00, 0x01];

/// EGIS command frame
///
/// # Frame Structure
///
/// ```text
/// ┌─────────────┬─────────────┬─────────────┬─────────────┐
/// │   Magic     │   Version   │ Check bytes │    Body     │
/// │  "EGIS"     │ 00 00 00 01 │   2 bytes   │   N bytes   │
/// │  4 bytes    │   4 bytes   │  (LE u16)   │   (bytes)   │
/// └─────────────┴─────────────┴─────────────┴─────────────┘
/// ```
///
/// The check bytes are derived from the whole frame, see [`checksum`].
///
/// # Examples
///
/// ```
/// use egismoc_core::{Frame, checksum};
///
/// let frame = Frame::new(vec![0x00, 0x00, 0x00, 0x04, 0x50, 0x1a, 0x00, 0x00]);
/// let encoded = frame.encode();
///
/// assert_eq!(&encoded[..4], b"EGIS");
/// assert!(checksum::verify(&encoded));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command body
    pub body: Bytes,
}

impl Frame {
    /// Magic + version length
    pub const PREFIX_SIZE: usize = WRITE_PREFIX.len();

    /// Everything before the body
    pub const HEADER_SIZE: usize = Self::PREFIX_SIZE + CHECK_BYTES_LENGTH;

    /// Create a frame around a command body
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }

    /// Check value this frame will carry
    pub fn check_value(&self) -> u16 {
        u16::from_le_bytes(self.check_bytes())
    }

    fn check_bytes(&self) -> [u8; CHECK_BYTES_LENGTH] {
        let mut buf = BytesMut::with_capacity(self.size());
        self.put_unchecked(&mut buf);
        checksum::check_bytes(&buf)
    }

    fn put_unchecked(&self, buf: &mut BytesMut) {
        buf.put_slice(&WRITE_PREFIX);
        buf.put_bytes(0, CHECK_BYTES_LENGTH);
        buf.put_slice(&self.body);
    }

    /// Encode frame to bytes
    ///
    /// The check slot is first zeroed and then overwritten with the check
    /// bytes of the assembled frame.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.size());
        self.put_unchecked(&mut buf);

        let check = checksum::check_bytes(&buf);
        buf[Self::PREFIX_SIZE..Self::HEADER_SIZE].copy_from_slice(&check);

        buf
    }

    /// Get total frame size
    pub fn size(&self) -> usize {
        Self::HEADER_SIZE + self.body.len()
    }
}

/// Compose a ready-to-send frame from a command body
pub fn compose(body: &[u8]) -> Bytes {
    Frame::new(Bytes::copy_from_slice(body)).encode().freeze()
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("check", &format!("0x{:04X}", self.check_value()))
            .field("body", &hex::encode(&self.body))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame(len={})", self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frame_layout() {
        let body = vec![0x00, 0x00, 0x00, 0x07, 0x50, 0x19, 0x04, 0x00, 0x00, 0x01, 0x40];
        let encoded = Frame::new(body.clone()).encode();

        assert_eq!(encoded.len(), Frame::HEADER_SIZE + body.len());
        assert_eq!(&encoded[..8], &WRITE_PREFIX);
        assert_eq!(&encoded[10..], body.as_slice());
        assert!(checksum::verify(&encoded));
    }

    #[test]
    fn test_frame_replay_is_identical() {
        let body = [0x00, 0x00, 0x00, 0x04, 0x50, 0x17, 0x02, 0x00];

        assert_eq!(compose(&body), compose(&body));
        assert_eq!(Frame::new(body.to_vec()).encode(), Frame::new(body.to_vec()).encode());
    }

    #[test]
    fn test_check_value_matches_encoded_slot() {
        let frame = Frame::new(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01]);
        let encoded = frame.encode();

        assert_eq!(u16::from_le_bytes([encoded[8], encoded[9]]), frame.check_value());
        assert!(checksum::verify(&encoded));
    }

    #[test]
    fn test_empty_body() {
        let encoded = compose(&[]);

        assert_eq!(encoded.len(), Frame::HEADER_SIZE);
        assert!(checksum::verify(&encoded));
    }

    #[test]
    fn test_body_change_recomputes_check() {
        let a = Frame::new(vec![0x00, 0x01]);
        let b = Frame::new(vec![0x00, 0x02]);

        assert_ne!(a.check_value(), b.check_value());
    }
}
