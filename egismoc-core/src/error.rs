//! Error types for egismoc-core



/// Result type alias for egismoc-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Response is too short to be valid
    #[error("Response too short: expected at least {expected} bytes, got {actual} bytes")]
    ResponseTooShort {
        expected: usize,
        actual: usize,
    },

    /// Too many identifiers for the two-byte size field of a command body
    #[error("Cannot encode {count} print identifiers in one command (max: {max})")]
    TooManyPrints {
        count: usize,
        max: usize,
    },

    /// Print identifier is not exactly 32 bytes
    #[error("Invalid print identifier length: {0} bytes")]
    InvalidPrintIdLength(usize),

    /// Firmware version response is malformed
    #[error("Invalid firmware version response: {0}")]
    InvalidFirmwareVersion(String),
}

impl Error {
    /// Check if error describes malformed data handed to the codec
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::TooManyPrints { .. } | Self::InvalidPrintIdLength(_)
        )
    }

    /// Check if error describes an unexpected device response
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::ResponseTooShort { .. } | Self::InvalidFirmwareVersion(_)
        )
    }
}
