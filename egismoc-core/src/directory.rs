//! Enrolled print directory
//!
//! The device keeps its prints in on-chip storage and only hands out their
//! 32-byte identifiers. A [`Directory`] is a snapshot of those identifiers,
//! parsed from one "list" response and thrown away by the task that fetched it.

use std::fmt;

use tracing::{debug, info};

use crate::{
    constants::{FINGERPRINT_DATA_SIZE, LIST_RESPONSE_PREFIX_SIZE, LIST_RESPONSE_SUFFIX_SIZE},
    error::{Error, Result},
};

/// Device print identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrintId([u8; FINGERPRINT_DATA_SIZE]);

impl PrintId {
    /// Identifier size in bytes
    pub const SIZE: usize = FINGERPRINT_DATA_SIZE;

    pub fn new(bytes: [u8; FINGERPRINT_DATA_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build an identifier from exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; FINGERPRINT_DATA_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidPrintIdLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// Build an identifier from the leading bytes of `bytes`, zero padded
    pub fn from_prefix(bytes: &[u8]) -> Self {
        let mut array = [0u8; FINGERPRINT_DATA_SIZE];
        let len = bytes.len().min(FINGERPRINT_DATA_SIZE);
        array[..len].copy_from_slice(&bytes[..len]);
        Self(array)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_DATA_SIZE] {
        &self.0
    }

    /// Identifier as text, up to the first NUL
    pub fn to_text(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(self.0.len());
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl fmt::Debug for PrintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrintId({})", hex::encode(self.0))
    }
}

impl fmt::Display for PrintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Snapshot of the prints stored on the device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    ids: Vec<PrintId>,
}

impl Directory {
    /// Length of the non-identifier part of a list response
    pub const HEADER_SIZE: usize = LIST_RESPONSE_PREFIX_SIZE + LIST_RESPONSE_SUFFIX_SIZE;

    pub fn new(ids: Vec<PrintId>) -> Self {
        Self { ids }
    }

    /// Parse a "list" response
    ///
    /// Identifiers start at byte 14 and follow each other back to back; the
    /// response ends with a 2-byte status. Anything shorter than one complete
    /// record is an empty directory.
    pub fn parse(buf: &[u8]) -> Self {
        if buf.len() < Self::HEADER_SIZE + PrintId::SIZE {
            info!("Number of currently enrolled fingerprints on the device is 0");
            return Self::default();
        }

        let count = (buf.len() - Self::HEADER_SIZE) / PrintId::SIZE;
        let ids: Vec<PrintId> = buf[LIST_RESPONSE_PREFIX_SIZE..]
            .chunks_exact(PrintId::SIZE)
            .take(count)
            .map(PrintId::from_prefix)
            .collect();

        for (i, id) in ids.iter().enumerate() {
            debug!("Device fingerprint {}: {}", i, id);
        }
        info!("Number of currently enrolled fingerprints on the device is {}", ids.len());

        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[PrintId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrintId> {
        self.ids.iter()
    }

    pub fn contains(&self, id: &PrintId) -> bool {
        self.ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::READ_PREFIX;
    use pretty_assertions::assert_eq;

    fn list_response(ids: &[[u8; 32]]) -> Vec<u8> {
        let mut buf = READ_PREFIX.to_vec();
        buf.extend_from_slice(&[0xAB, 0xCD]);
        buf.extend_from_slice(&[0x00, 0x00, 0x00, (ids.len() * 32 + 2) as u8]);
        for id in ids {
            buf.extend_from_slice(id);
        }
        buf.extend_from_slice(&[0x90, 0x00]);
        buf
    }

    #[test]
    fn test_parse_empty() {
        let buf = list_response(&[]);
        assert_eq!(buf.len(), Directory::HEADER_SIZE);

        let dir = Directory::parse(&buf);
        assert!(dir.is_empty());
        assert_eq!(dir.len(), 0);
    }

    #[test]
    fn test_parse_three() {
        let buf = list_response(&[[0x11; 32], [0x22; 32], [0x33; 32]]);
        assert_eq!(buf.len(), Directory::HEADER_SIZE + 3 * 32);

        let dir = Directory::parse(&buf);
        assert_eq!(dir.len(), 3);
        assert_eq!(dir.ids()[0], PrintId::new([0x11; 32]));
        assert_eq!(dir.ids()[1], PrintId::new([0x22; 32]));
        assert_eq!(dir.ids()[2], PrintId::new([0x33; 32]));
    }

    #[test]
    fn test_parse_records_at_fixed_offsets() {
        let mut first = [0u8; 32];
        first[0] = 0xA0;
        first[31] = 0xAF;
        let buf = list_response(&[first, [0x44; 32]]);

        let dir = Directory::parse(&buf);
        assert_eq!(buf[14], 0xA0);
        assert_eq!(buf[45], 0xAF);
        assert_eq!(dir.ids()[0], PrintId::new(first));
        assert_eq!(buf[46], 0x44);
    }

    #[test]
    fn test_parse_short_response() {
        assert!(Directory::parse(&[0u8; 20]).is_empty());
        assert!(Directory::parse(&[]).is_empty());
    }

    #[test]
    fn test_print_id_text() {
        let id = PrintId::from_prefix(b"FP1-20240101-7-DEADBEEF-alice");
        assert_eq!(id.to_text(), "FP1-20240101-7-DEADBEEF-alice");

        let long = PrintId::from_prefix(b"FP1-20240101-7-DEADBEEF-a-very-long-username");
        assert_eq!(long.to_text().len(), 32);
    }

    #[test]
    fn test_print_id_from_slice_length() {
        assert!(PrintId::from_slice(&[0u8; 32]).is_ok());
        assert!(matches!(
            PrintId::from_slice(&[0u8; 31]),
            Err(Error::InvalidPrintIdLength(31))
        ));
    }
}
