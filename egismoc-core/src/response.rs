//! Device response validation
//!
//! Responses share the frame header of commands (`SIGE 00 00 00 01` plus two
//! check bytes). Status patterns are compared right after that header or at
//! the very end of the buffer; nothing here mutates state.

use tracing::debug;

use crate::{
    constants::{FINGERPRINT_DATA_SIZE, FW_VERSION_OFFSET, IDENTIFY_RESPONSE_PRINT_ID_OFFSET},
    directory::PrintId,
    error::{Error, Result},
    frame::Frame,
};

/// Offset at which response prefixes are compared
pub const PREFIX_OFFSET: usize = Frame::HEADER_SIZE;

/// Firmware version response
pub const FW_VERSION_SUFFIX: [u8; 2] = [0x90, 0x00];

/// Capture read responses
pub const READ_SUCCESS_PREFIX: [u8; 4] = [0x00, 0x00, 0x00, 0x04];
pub const READ_SUCCESS_SUFFIX: [u8; 3] = [0x0a, 0x90, 0x00];
pub const READ_OFFCENTER_PREFIX: [u8; 4] = [0x00, 0x00, 0x00, 0x04];
pub const READ_OFFCENTER_SUFFIX: [u8; 3] = [0x0a, 0x64, 0x91];
pub const READ_DIRTY_PREFIX: [u8; 5] = [0x00, 0x00, 0x00, 0x02, 0x64];

/// Identify responses
pub const IDENTIFY_MATCH_PREFIX: [u8; 4] = [0x00, 0x00, 0x00, 0x42];
pub const IDENTIFY_MATCH_SUFFIX: [u8; 2] = [0x90, 0x00];
pub const IDENTIFY_NOTMATCH_PREFIX: [u8; 6] = [0x00, 0x00, 0x00, 0x02, 0x90, 0x04];

/// Enroll duplicate check response
pub const CHECK_NOT_YET_ENROLLED_PREFIX: [u8; 6] = [0x00, 0x00, 0x00, 0x02, 0x90, 0x04];

/// Delete response
pub const DELETE_SUCCESS_PREFIX: [u8; 6] = [0x00, 0x00, 0x00, 0x02, 0x90, 0x00];

/// Check whether `buf` carries `prefix` right after the frame header
pub fn has_prefix(buf: &[u8], prefix: &[u8]) -> bool {
    let result = buf
        .get(PREFIX_OFFSET..PREFIX_OFFSET + prefix.len())
        .is_some_and(|window| window == prefix);
    debug!("Response prefix valid: {}", if result { "yes" } else { "NO" });
    result
}

/// Check whether `buf` ends with `suffix`
pub fn has_suffix(buf: &[u8], suffix: &[u8]) -> bool {
    let result = buf.ends_with(suffix);
    debug!("Response suffix valid: {}", if result { "yes" } else { "NO" });
    result
}

/// Outcome of reading one enrollment capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Partial capture accepted
    Accepted,
    /// Finger was not centered on the sensor
    OffCenter,
    /// Sensor could not read the finger, usually because it is dirty
    Dirty,
    /// Anything else
    Unrecognized,
}

/// Classify a read-capture response
pub fn classify_capture(buf: &[u8]) -> CaptureStatus {
    if has_prefix(buf, &READ_SUCCESS_PREFIX) && has_suffix(buf, &READ_SUCCESS_SUFFIX) {
        CaptureStatus::Accepted
    } else if has_prefix(buf, &READ_OFFCENTER_PREFIX) && has_suffix(buf, &READ_OFFCENTER_SUFFIX) {
        CaptureStatus::OffCenter
    } else if has_prefix(buf, &READ_DIRTY_PREFIX) {
        CaptureStatus::Dirty
    } else {
        CaptureStatus::Unrecognized
    }
}

/// Outcome of the duplicate check made before enrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollCheck {
    NotYetEnrolled,
    AlreadyEnrolled,
}

/// Classify a check response received during enrollment
pub fn classify_enroll_check(buf: &[u8]) -> EnrollCheck {
    if has_prefix(buf, &CHECK_NOT_YET_ENROLLED_PREFIX) {
        EnrollCheck::NotYetEnrolled
    } else {
        EnrollCheck::AlreadyEnrolled
    }
}

/// Outcome of an on-chip identification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifyStatus {
    /// The device matched the finger against one of its prints
    Match(PrintId),
    /// The finger is not enrolled on the device
    NoMatch,
    /// Anything else
    Unrecognized,
}

/// Classify a check response received during identify or verify
///
/// A match carries 32 unknown bytes followed by the matched identifier.
pub fn classify_identify(buf: &[u8]) -> IdentifyStatus {
    if has_prefix(buf, &IDENTIFY_MATCH_PREFIX) && has_suffix(buf, &IDENTIFY_MATCH_SUFFIX) {
        let start = IDENTIFY_RESPONSE_PRINT_ID_OFFSET;
        match buf.get(start..start + FINGERPRINT_DATA_SIZE).map(PrintId::from_slice) {
            Some(Ok(id)) => IdentifyStatus::Match(id),
            _ => IdentifyStatus::Unrecognized,
        }
    } else if has_prefix(buf, &IDENTIFY_NOTMATCH_PREFIX) {
        IdentifyStatus::NoMatch
    } else {
        IdentifyStatus::Unrecognized
    }
}

/// Check that a delete response reports success
pub fn is_delete_success(buf: &[u8]) -> bool {
    has_prefix(buf, &DELETE_SUCCESS_PREFIX)
}

/// Extract the firmware version string
///
/// The version follows the header, three zero bytes and a carriage return, and
/// is terminated by the `90 00` status.
pub fn parse_firmware_version(buf: &[u8]) -> Result<String> {
    if !has_suffix(buf, &FW_VERSION_SUFFIX) {
        return Err(Error::InvalidFirmwareVersion("status suffix missing".into()));
    }

    let end = buf.len() - FW_VERSION_SUFFIX.len();
    let raw = buf.get(FW_VERSION_OFFSET..end).ok_or_else(|| {
        Error::InvalidFirmwareVersion(format!("response of {} bytes has no version", buf.len()))
    })?;

    let version = String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .trim()
        .to_string();

    Ok(version)
}
