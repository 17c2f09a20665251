//! EGIS command bodies
//!
//! Fixed bodies were captured from the vendor driver. The check, delete and
//! new-print bodies depend on the device's print directory and are built by
//! the functions in this module.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::{
    constants::CMD_CHECK_SEPARATOR_LENGTH,
    directory::PrintId,
    error::{Error, Result},
};

/// Fixed-body commands
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    FirmwareVersion,
    List,
    SensorReset,
    SensorCheck,
    SensorIdentify,
    SensorEnroll,
    EnrollStarting,
    SensorStartCapture,
    ReadCapture,
    CommitStarting,
}

impl Command {
    /// Raw command body (without frame prefix and check bytes)
    pub fn body(self) -> &'static [u8] {
        match self {
            Self::FirmwareVersion => &[
                0x00, 0x00, 0x00, 0x07, 0x50, 0x07, 0x00, 0x02, 0x00, 0x00, 0x1d,
            ],
            Self::List => &[0x00, 0x00, 0x00, 0x07, 0x50, 0x19, 0x04, 0x00, 0x00, 0x01, 0x40],
            Self::SensorReset => &[0x00, 0x00, 0x00, 0x04, 0x50, 0x1a, 0x00, 0x00],
            Self::SensorCheck => &[0x00, 0x00, 0x00, 0x04, 0x50, 0x17, 0x02, 0x00],
            Self::SensorIdentify => &[0x00, 0x00, 0x00, 0x04, 0x50, 0x17, 0x01, 0x01],
            Self::SensorEnroll => &[0x00, 0x00, 0x00, 0x04, 0x50, 0x17, 0x01, 0x00],
            Self::EnrollStarting => &[
                0x00, 0x00, 0x00, 0x07, 0x50, 0x16, 0x01, 0x00, 0x00, 0x00, 0x20,
            ],
            Self::SensorStartCapture => &[0x00, 0x00, 0x00, 0x04, 0x50, 0x16, 0x02, 0x01],
            Self::ReadCapture => &[
                0x00, 0x00, 0x00, 0x07, 0x50, 0x16, 0x02, 0x02, 0x00, 0x00, 0x02,
            ],
            Self::CommitStarting => &[
                0x00, 0x00, 0x00, 0x07, 0x50, 0x16, 0x05, 0x00, 0x00, 0x00, 0x20,
            ],
        }
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::FirmwareVersion => "FW_VERSION",
            Self::List => "LIST",
            Self::SensorReset => "SENSOR_RESET",
            Self::SensorCheck => "SENSOR_CHECK",
            Self::SensorIdentify => "SENSOR_IDENTIFY",
            Self::SensorEnroll => "SENSOR_ENROLL",
            Self::EnrollStarting => "ENROLL_STARTING",
            Self::SensorStartCapture => "SENSOR_START_CAPTURE",
            Self::ReadCapture => "READ_CAPTURE",
            Self::CommitStarting => "COMMIT_STARTING",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sub-prefix of the check body
pub const CHECK_PREFIX: [u8; 5] = [0x50, 0x17, 0x03, 0x00, 0x00];

/// Suffix of the check body
pub const CHECK_SUFFIX: [u8; 2] = [0x00, 0x40];

/// Sub-prefix of the delete body
pub const DELETE_PREFIX: [u8; 5] = [0x50, 0x18, 0x04, 0x00, 0x00];

/// Prefix of the new-print body
pub const NEW_PRINT_PREFIX: [u8; 11] = [
    0x00, 0x00, 0x00, 0x27, 0x50, 0x16, 0x03, 0x00, 0x00, 0x00, 0x20,
];

/// Largest unit count the two-byte size field can carry
pub const MAX_SIZE_UNITS: usize = 15;

/// Encode a two-byte size field for `units` blocks of 0x20 bytes plus `extra`
///
/// The device rolls anything past 7 units into the high byte and restarts the
/// low byte from zero. Only counts up to [`MAX_SIZE_UNITS`] fit this rule.
pub fn size_field(units: usize, extra: u8) -> Result<[u8; 2]> {
    if units > MAX_SIZE_UNITS {
        return Err(Error::TooManyPrints {
            count: units,
            max: MAX_SIZE_UNITS,
        });
    }

    let field = if units > 7 {
        [0x01, ((units - 8) * 0x20) as u8 + extra]
    } else {
        [0x00, (units * 0x20) as u8 + extra]
    };

    Ok(field)
}

/// Build the "check" body used by enroll and identify
///
/// ```text
/// 00 00 | size(n+1, +9) | CHECK_PREFIX | size(n+1) | 32 x 00 | ids... | CHECK_SUFFIX
/// ```
pub fn check_body(enrolled: &[PrintId]) -> Result<Bytes> {
    let units = enrolled.len() + 1;
    let mut buf = BytesMut::with_capacity(
        6 + CHECK_PREFIX.len()
            + CMD_CHECK_SEPARATOR_LENGTH
            + enrolled.len() * PrintId::SIZE
            + CHECK_SUFFIX.len(),
    );

    buf.put_bytes(0, 2);
    buf.put_slice(&size_field(units, 0x09)?);
    buf.put_slice(&CHECK_PREFIX);
    buf.put_slice(&size_field(units, 0x00)?);
    buf.put_bytes(0, CMD_CHECK_SEPARATOR_LENGTH);
    for id in enrolled {
        buf.put_slice(id.as_bytes());
    }
    buf.put_slice(&CHECK_SUFFIX);

    trace!(enrolled = enrolled.len(), len = buf.len(), "Built check body");

    Ok(buf.freeze())
}

/// Build the "delete" body for the given identifiers
///
/// Pass a single target to delete one print, or the whole directory to clear
/// the device.
///
/// ```text
/// 00 00 | size(n, +7) | DELETE_PREFIX | size(n) | ids...
/// ```
pub fn delete_body(targets: &[PrintId]) -> Result<Bytes> {
    let units = targets.len();
    let mut buf = BytesMut::with_capacity(6 + DELETE_PREFIX.len() + units * PrintId::SIZE);

    buf.put_bytes(0, 2);
    buf.put_slice(&size_field(units, 0x07)?);
    buf.put_slice(&DELETE_PREFIX);
    buf.put_slice(&size_field(units, 0x00)?);
    for id in targets {
        buf.put_slice(id.as_bytes());
    }

    trace!(targets = units, len = buf.len(), "Built delete body");

    Ok(buf.freeze())
}

/// Build the body that stores a freshly enrolled print under `id`
pub fn new_print_body(id: &PrintId) -> Bytes {
    let mut buf = BytesMut::with_capacity(NEW_PRINT_PREFIX.len() + PrintId::SIZE);
    buf.put_slice(&NEW_PRINT_PREFIX);
    buf.put_slice(id.as_bytes());
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(n: u8) -> Vec<PrintId> {
        (0..n).map(|i| PrintId::new([i + 1; PrintId::SIZE])).collect()
    }

    #[test]
    fn test_size_field_carry() {
        assert_eq!(size_field(1, 0x07).unwrap(), [0x00, 0x27]);
        assert_eq!(size_field(7, 0x07).unwrap(), [0x00, 7 * 0x20 + 0x07]);
        assert_eq!(size_field(8, 0x07).unwrap(), [0x01, 0x07]);
        assert_eq!(size_field(9, 0x00).unwrap(), [0x01, 0x20]);
        assert_eq!(size_field(15, 0x09).unwrap(), [0x01, 0xE9]);
    }

    #[test]
    fn test_size_field_rejects_unverified_counts() {
        assert!(matches!(
            size_field(16, 0x07),
            Err(Error::TooManyPrints { count: 16, max: 15 })
        ));
    }

    #[test]
    fn test_delete_body_single_target() {
        let target = ids(1);
        let body = delete_body(&target).unwrap();

        assert_eq!(&body[..4], &[0x00, 0x00, 0x00, 0x27]);
        assert_eq!(&body[4..9], &DELETE_PREFIX);
        assert_eq!(&body[9..11], &[0x00, 0x20]);
        assert_eq!(&body[11..], target[0].as_bytes());
    }

    #[test]
    fn test_delete_body_carry_at_seven_and_eight() {
        let seven = delete_body(&ids(7)).unwrap();
        assert_eq!(&seven[2..4], &[0x00, 0xE7]);
        assert_eq!(&seven[9..11], &[0x00, 0xE0]);

        let eight = delete_body(&ids(8)).unwrap();
        assert_eq!(&eight[2..4], &[0x01, 0x07]);
        assert_eq!(&eight[9..11], &[0x01, 0x00]);
        assert_eq!(eight.len(), 11 + 8 * PrintId::SIZE);
    }

    #[test]
    fn test_check_body_layout() {
        let enrolled = ids(2);
        let body = check_body(&enrolled).unwrap();

        assert_eq!(&body[..4], &[0x00, 0x00, 0x00, 3 * 0x20 + 0x09]);
        assert_eq!(&body[4..9], &CHECK_PREFIX);
        assert_eq!(&body[9..11], &[0x00, 0x60]);
        assert_eq!(&body[11..43], &[0u8; 32]);
        assert_eq!(&body[43..75], enrolled[0].as_bytes());
        assert_eq!(&body[75..107], enrolled[1].as_bytes());
        assert_eq!(&body[107..], &CHECK_SUFFIX);
    }

    #[test]
    fn test_check_body_empty_directory() {
        let body = check_body(&[]).unwrap();

        assert_eq!(&body[2..4], &[0x00, 0x29]);
        assert_eq!(body.len(), 11 + 32 + 2);
    }

    #[test]
    fn test_check_body_carry_at_seven_enrolled() {
        let body = check_body(&ids(7)).unwrap();

        assert_eq!(&body[2..4], &[0x01, 0x09]);
        assert_eq!(&body[9..11], &[0x01, 0x00]);
    }

    #[test]
    fn test_new_print_body() {
        let id = PrintId::new([0xAA; PrintId::SIZE]);
        let body = new_print_body(&id);

        assert_eq!(&body[..11], &NEW_PRINT_PREFIX);
        assert_eq!(&body[11..], id.as_bytes());
    }

    #[test]
    fn test_fixed_bodies_declare_their_length() {
        for cmd in [
            Command::FirmwareVersion,
            Command::List,
            Command::SensorReset,
            Command::ReadCapture,
            Command::CommitStarting,
        ] {
            let body = cmd.body();
            assert_eq!(body[3] as usize, body.len() - 4, "{}", cmd);
        }
    }
}
