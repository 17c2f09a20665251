//! Transport layer for Egis match-on-chip sensors
//!
//! The driver talks to the sensor over three USB pipes: control transfers
//! during initialization, a bulk OUT/IN pair for commands and an interrupt
//! IN endpoint that fires when a finger touches the sensor.

pub mod error;
pub mod mock;
pub mod usb;

pub use error::{Error, Result};
pub use mock::{MockFailure, MockHandle, MockTransport};
pub use usb::UsbTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio_util::sync::CancellationToken;

/// Control request type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Standard,
    Vendor,
}

/// Device-to-host control request addressed to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    pub kind: RequestKind,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl ControlRequest {
    pub const fn vendor(request: u8, value: u16, index: u16, length: u16) -> Self {
        Self {
            kind: RequestKind::Vendor,
            request,
            value,
            index,
            length,
        }
    }

    pub const fn standard(request: u8, value: u16, index: u16, length: u16) -> Self {
        Self {
            kind: RequestKind::Standard,
            request,
            value,
            index,
            length,
        }
    }
}

/// Transport trait for the sensor's USB pipes
#[async_trait]
pub trait Transport: Send + Sync {
    /// Reset the device and claim its interface
    async fn open(&mut self) -> Result<()>;

    /// Release the interface
    async fn close(&mut self) -> Result<()>;

    /// Check if the interface is claimed
    fn is_open(&self) -> bool;

    /// Run an IN control transfer; a short reply is an error
    async fn control_in(&mut self, request: ControlRequest, timeout: Duration) -> Result<Bytes>;

    /// Write a command frame to the bulk OUT endpoint
    async fn bulk_out(&mut self, data: &[u8], timeout: Duration) -> Result<usize>;

    /// Read one response from the bulk IN endpoint
    async fn bulk_in(&mut self, max_len: usize, timeout: Duration) -> Result<BytesMut>;

    /// Wait on the interrupt endpoint until it fires, times out or `cancel` is triggered
    async fn interrupt_in(
        &mut self,
        max_len: usize,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<BytesMut>;

    /// Human readable device location
    fn description(&self) -> String;
}
