//! Protocol constants

use std::time::Duration;

/// Supported (vendor id, product id) pairs
pub const DEVICE_IDS: &[(u16, u16)] = &[(0x1c7a, 0x0582)];

/// Human readable driver name
pub const DRIVER_FULL_NAME: &str = "Egis Technology (LighTuning) Match-on-Chip";

/// Short driver id, recorded in every print the driver creates
pub const DRIVER_ID: &str = "egismoc";

/// USB endpoints
pub mod endpoints {
    /// Bulk OUT, commands
    pub const CMD_OUT: u8 = 0x02;

    /// Bulk IN, command responses
    pub const CMD_IN: u8 = 0x81;

    /// Interrupt IN, finger presence
    pub const INTERRUPT_IN: u8 = 0x83;
}

/// Control transfer timeout
pub const CONTROL_TIMEOUT: Duration = Duration::from_millis(5000);

/// Bulk OUT timeout
pub const SEND_TIMEOUT: Duration = Duration::from_millis(5000);

/// Bulk IN timeout
pub const RECV_TIMEOUT: Duration = Duration::from_millis(5000);

/// How long to wait for a finger before giving up
pub const INTERRUPT_TIMEOUT: Duration = Duration::from_millis(60000);

/// Bulk IN request length
pub const IN_RECV_LENGTH: usize = 4096;

/// Interrupt IN request length (the device always answers short)
pub const INTERRUPT_IN_RECV_LENGTH: usize = 64;

/// Number of accepted captures needed to enroll one finger
pub const ENROLL_TIMES: usize = 10;

/// Maximum number of prints the device stores
pub const MAX_ENROLL_NUM: usize = 10;

/// Size of a device print identifier
pub const FINGERPRINT_DATA_SIZE: usize = 32;

/// Length of the check bytes slot
pub const CHECK_BYTES_LENGTH: usize = 2;

/// Zero block between the size fields and the id list of a check body
pub const CMD_CHECK_SEPARATOR_LENGTH: usize = 32;

/// Bytes before the first identifier of a list response
pub const LIST_RESPONSE_PREFIX_SIZE: usize = 14;

/// Trailing status bytes of a list response
pub const LIST_RESPONSE_SUFFIX_SIZE: usize = 2;

/// Offset of the matched print identifier in an identify response
pub const IDENTIFY_RESPONSE_PRINT_ID_OFFSET: usize = 46;

/// Bytes to skip before the firmware version string:
/// read prefix, check bytes, three zero bytes and a carriage return
pub const FW_VERSION_OFFSET: usize = 8 + CHECK_BYTES_LENGTH + 3 + 1;
