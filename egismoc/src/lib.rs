//! # egismoc
//!
//! Driver for Egis Technology (LighTuning) match-on-chip fingerprint sensors
//! (USB `1c7a:0582`).
//!
//! ## Features
//!
//! - Enroll, identify, verify, delete, list and clear prints stored on the chip
//! - Async/await API using Tokio
//! - Cancellable finger waits
//! - Scripted mock transport for testing without hardware
//!
//! ## Quick Start
//!
//! ```no_run
//! use egismoc::{EgisMoc, EnrollProgress, FingerprintDriver, Print};
//! use egismoc::types::Finger;
//!
//! #[tokio::main]
//! async fn main() -> egismoc::Result<()> {
//!     let mut device = EgisMoc::usb();
//!     device.open().await?;
//!
//!     let template = Print::default()
//!         .with_finger(Finger::RightIndex)
//!         .with_username("alice");
//!
//!     let print = device
//!         .enroll(template, &mut |progress| {
//!             if let EnrollProgress::Stage { stage, total } = progress {
//!                 println!("{}/{}", stage, total);
//!             }
//!         })
//!         .await?;
//!
//!     let result = device.identify(&[print]).await?;
//!     println!("matched: {}", result.matched.is_some());
//!
//!     device.close().await?;
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod print;

mod executor;
mod task;

// Re-exports
pub use cancel::Canceller;
pub use config::DeviceConfig;
pub use device::EgisMoc;
pub use driver::{
    EnrollProgress, FingerStatus, FingerprintDriver, Identification, RetryReason, Verification,
};
pub use error::{Error, Result};
pub use task::TaskKind;

pub use egismoc_core as protocol;
pub use egismoc_transport as transport;
pub use egismoc_types as types;
pub use egismoc_types::{DeviceInfo, Print};
