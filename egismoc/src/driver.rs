//! Host-facing driver interface

use std::fmt;

use async_trait::async_trait;

use egismoc_types::Print;

use crate::error::Result;

/// Why a capture has to be repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// Finger was not centered on the sensor
    CenterFinger,
    /// The sensor could not read the finger; it may be dirty
    DirtySensor,
    /// The device reported something else
    Unrecognized,
}

impl RetryReason {
    /// Message suitable for showing to the user
    pub fn message(self) -> &'static str {
        match self {
            Self::CenterFinger => "Please center your finger on the sensor.",
            Self::DirtySensor => {
                "Your device is having trouble recognizing you. Make sure your sensor is clean."
            }
            Self::Unrecognized => "Unknown failure trying to read your finger. Please try again.",
        }
    }
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Enrollment progress report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollProgress {
    /// A capture was accepted; `stage` of `total` are done
    Stage { stage: usize, total: usize },
    /// The capture was rejected; the stage did not advance
    Retry { stage: usize, reason: RetryReason },
}

/// Finger presence as last seen by the driver
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FingerStatus {
    #[default]
    None,
    /// Waiting for a finger
    Needed,
    /// The sensor reported a finger
    Present,
}

/// Result of an identify operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    /// Gallery entry equal to the device's match
    pub matched: Option<Print>,
    /// Print the device matched, even when it is not in the gallery
    pub device_print: Option<Print>,
}

/// Result of a verify operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub matched: bool,
    /// Print the device matched, if any
    pub device_print: Option<Print>,
}

/// Operations a match-on-chip fingerprint device offers
#[async_trait]
pub trait FingerprintDriver: Send {
    /// Claim the device and run its initialization sequence
    async fn open(&mut self) -> Result<()>;

    /// Cancel any wait, drop task state and release the device
    async fn close(&mut self) -> Result<()>;

    /// Abort the pending finger wait
    fn cancel(&self);

    /// Called before the host suspends; aborts the pending finger wait
    fn suspend(&self) {
        self.cancel();
    }

    /// Enroll a new finger on the device
    ///
    /// `template` supplies finger, username and enroll date. `progress` is
    /// called after every capture.
    async fn enroll(
        &mut self,
        template: Print,
        progress: &mut (dyn FnMut(EnrollProgress) + Send),
    ) -> Result<Print>;

    /// Match a finger against the device and look the match up in `gallery`
    async fn identify(&mut self, gallery: &[Print]) -> Result<Identification>;

    /// Match a finger against the device and compare with `expected`
    async fn verify(&mut self, expected: &Print) -> Result<Verification>;

    /// Remove one print from device storage
    async fn delete(&mut self, print: &Print) -> Result<()>;

    /// Remove every print from device storage
    async fn clear_storage(&mut self) -> Result<()>;

    /// Prints currently stored on the device
    async fn list(&mut self) -> Result<Vec<Print>>;
}
