//! Type definitions for egismoc

pub mod device_info;
pub mod error;
pub mod finger;
pub mod print;

pub use device_info::DeviceInfo;
pub use error::{Error, Result};
pub use finger::Finger;
pub use print::{Print, PrintType, UserId};
