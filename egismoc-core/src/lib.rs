//! # egismoc-core
//!
//! Core protocol implementation for Egis Technology match-on-chip sensors.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding
//! - Check byte calculation
//! - Command bodies and the directory-dependent body builders
//! - Response validation and classification
//! - Enrolled print directory parsing

pub mod checksum;
pub mod command;
pub mod constants;
pub mod directory;
pub mod error;
pub mod frame;
pub mod response;

pub use command::Command;
pub use directory::{Directory, PrintId};
pub use error::{Error, Result};
pub use frame::{Frame, compose};
pub use response::{CaptureStatus, EnrollCheck, IdentifyStatus};

/// Smallest acceptable response (the frame prefix)
pub const MIN_RESPONSE_SIZE: usize = Frame::PREFIX_SIZE;
