//! Transport errors

use std::io;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Interface not claimed")]
    NotOpen,
    
    #[error("Interface already claimed")]
    AlreadyOpen,
    
    #[error("Device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },
    
    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: &'static str, timeout: Duration },
    
    #[error("Transfer cancelled")]
    Cancelled,
    
    #[error("Short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer { expected: usize, actual: usize },
    
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    
    #[error("USB transfer error: {0}")]
    Transfer(#[from] nusb::transfer::TransferError),
}

impl Error {
    /// Check if the transfer was aborted on request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Check if the device went away or the interface must be reclaimed
    pub fn requires_reopen(&self) -> bool {
        matches!(
            self,
            Error::NotOpen
                | Error::DeviceNotFound { .. }
                | Error::Transfer(nusb::transfer::TransferError::Disconnected)
        )
    }
}
