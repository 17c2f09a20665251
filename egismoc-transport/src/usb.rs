//! USB transport backed by `nusb`

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use egismoc_core::constants::{DEVICE_IDS, endpoints};
use nusb::Interface;
use nusb::transfer::{ControlIn, ControlType, Recipient, RequestBuffer};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{ControlRequest, RequestKind, Transport, error::*};

/// USB transport for Egis match-on-chip sensors
///
/// Opening resets the device and claims its interface; closing drops the
/// claim. Every transfer runs under its own timeout.
pub struct UsbTransport {
    vendor_id: u16,
    product_id: u16,
    interface_number: u8,
    reset_delay: Duration,
    interface: Option<Interface>,
    location: Option<String>,
}

impl UsbTransport {
    /// Create a transport for the first supported device id
    pub fn new() -> Self {
        let (vendor_id, product_id) = DEVICE_IDS[0];
        Self {
            vendor_id,
            product_id,
            interface_number: 0,
            reset_delay: Duration::from_millis(50),
            interface: None,
            location: None,
        }
    }

    /// Match a different vendor/product id pair
    pub fn with_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }

    /// Claim a different interface number
    pub fn with_interface(mut self, interface_number: u8) -> Self {
        self.interface_number = interface_number;
        self
    }

    /// Set how long to wait after the reset before claiming
    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    fn interface(&self) -> Result<&Interface> {
        self.interface.as_ref().ok_or(Error::NotOpen)
    }
}

impl Default for UsbTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UsbTransport {
    async fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }

        debug!(
            "Searching for {:04x}:{:04x}...",
            self.vendor_id, self.product_id
        );

        let device_info = nusb::list_devices()?
            .find(|d| d.vendor_id() == self.vendor_id && d.product_id() == self.product_id)
            .ok_or(Error::DeviceNotFound {
                vendor_id: self.vendor_id,
                product_id: self.product_id,
            })?;

        let location = format!(
            "bus {} addr {}",
            device_info.bus_number(),
            device_info.device_address()
        );
        info!("Found device on {}", location);

        let device = device_info.open()?;
        debug!("Resetting device...");
        device.reset()?;
        tokio::time::sleep(self.reset_delay).await;

        let interface = device.detach_and_claim_interface(self.interface_number)?;
        debug!("Interface {} claimed", self.interface_number);

        self.interface = Some(interface);
        self.location = Some(location);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.interface.take().is_some() {
            debug!("Released interface on {}", self.description());
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.interface.is_some()
    }

    async fn control_in(
        &mut self,
        request: ControlRequest,
        timeout_after: Duration,
    ) -> Result<Bytes> {
        let interface = self.interface()?;

        let control_type = match request.kind {
            RequestKind::Standard => ControlType::Standard,
            RequestKind::Vendor => ControlType::Vendor,
        };

        trace!(?request, "Control IN");

        let transfer = interface.control_in(ControlIn {
            control_type,
            recipient: Recipient::Device,
            request: request.request,
            value: request.value,
            index: request.index,
            length: request.length,
        });

        let data = timeout(timeout_after, transfer)
            .await
            .map_err(|_| Error::Timeout {
                operation: "Control transfer",
                timeout: timeout_after,
            })?
            .into_result()?;

        if data.len() < request.length as usize {
            warn!(
                "Control request {} returned {} of {} bytes",
                request.request,
                data.len(),
                request.length
            );
            return Err(Error::ShortTransfer {
                expected: request.length as usize,
                actual: data.len(),
            });
        }

        Ok(Bytes::from(data))
    }

    async fn bulk_out(&mut self, data: &[u8], timeout_after: Duration) -> Result<usize> {
        let interface = self.interface()?;

        trace!(
            "Sending {} bytes: {:02X?}",
            data.len(),
            &data[..data.len().min(32)]
        );

        let transfer = interface.bulk_out(endpoints::CMD_OUT, data.to_vec());
        let sent = timeout(timeout_after, transfer)
            .await
            .map_err(|_| Error::Timeout {
                operation: "Bulk OUT",
                timeout: timeout_after,
            })?
            .into_result()?
            .actual_length();

        if sent < data.len() {
            return Err(Error::ShortTransfer {
                expected: data.len(),
                actual: sent,
            });
        }

        Ok(sent)
    }

    async fn bulk_in(&mut self, max_len: usize, timeout_after: Duration) -> Result<BytesMut> {
        let interface = self.interface()?;

        let transfer = interface.bulk_in(endpoints::CMD_IN, RequestBuffer::new(max_len));
        let data = timeout(timeout_after, transfer)
            .await
            .map_err(|_| Error::Timeout {
                operation: "Bulk IN",
                timeout: timeout_after,
            })?
            .into_result()?;

        trace!(
            "Received {} bytes: {:02X?}",
            data.len(),
            &data[..data.len().min(32)]
        );

        Ok(BytesMut::from(&data[..]))
    }

    async fn interrupt_in(
        &mut self,
        max_len: usize,
        timeout_after: Duration,
        cancel: &CancellationToken,
    ) -> Result<BytesMut> {
        let interface = self.interface()?;

        // Dropping the transfer future cancels the URB
        let transfer = interface.interrupt_in(endpoints::INTERRUPT_IN, RequestBuffer::new(max_len));

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Interrupt wait cancelled");
                Err(Error::Cancelled)
            }
            result = timeout(timeout_after, transfer) => {
                let data = result
                    .map_err(|_| Error::Timeout {
                        operation: "Interrupt IN",
                        timeout: timeout_after,
                    })?
                    .into_result()?;

                trace!("Interrupt fired with {} bytes", data.len());
                Ok(BytesMut::from(&data[..]))
            }
        }
    }

    fn description(&self) -> String {
        match &self.location {
            Some(location) => {
                format!("{:04x}:{:04x} on {}", self.vendor_id, self.product_id, location)
            }
            None => format!("{:04x}:{:04x}", self.vendor_id, self.product_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_usb_transport_create() {
        let transport = UsbTransport::new();
        assert!(!transport.is_open());
        assert_eq!(transport.description(), "1c7a:0582");
    }

    #[tokio::test]
    async fn test_transfers_require_open() {
        let mut transport = UsbTransport::new().with_ids(0xffff, 0xfffe);

        let result = transport.bulk_in(64, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::NotOpen)));

        let result = transport.bulk_out(&[0x00], Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::NotOpen)));
    }
}
