//! Device initialization
//!
//! Five control transfers wake the sensor up, then the firmware version is
//! read to confirm the command channel works.

use tracing::{debug, info};

use egismoc_core::{Command, response};
use egismoc_transport::{ControlRequest, Transport};

use crate::{device::EgisMoc, error::Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InitState {
    Control1,
    Control2,
    Control3,
    Control4,
    Control5,
    GetFirmwareVersion,
}

impl InitState {
    pub(crate) fn next(self) -> Self {
        match self {
            Self::Control1 => Self::Control2,
            Self::Control2 => Self::Control3,
            Self::Control3 => Self::Control4,
            Self::Control4 => Self::Control5,
            Self::Control5 | Self::GetFirmwareVersion => Self::GetFirmwareVersion,
        }
    }

    /// Control transfer issued in this state
    pub(crate) fn control_request(self) -> Option<ControlRequest> {
        match self {
            Self::Control1 => Some(ControlRequest::vendor(32, 0x0000, 4, 16)),
            Self::Control2 => Some(ControlRequest::vendor(32, 0x0000, 4, 40)),
            Self::Control3 | Self::Control4 => Some(ControlRequest::standard(0, 0x0000, 0, 2)),
            Self::Control5 => Some(ControlRequest::vendor(82, 0x0000, 0, 8)),
            Self::GetFirmwareVersion => None,
        }
    }
}

impl<T: Transport> EgisMoc<T> {
    /// Run the initialization sequence, returning the firmware version
    pub(crate) async fn run_init(&mut self) -> Result<String> {
        let mut state = InitState::Control1;

        loop {
            debug!(?state, "Device init step");

            match state.control_request() {
                Some(request) => {
                    self.transport
                        .control_in(request, self.config.control_timeout)
                        .await?;
                    state = state.next();
                }
                None => {
                    let buf = self.run_command(Command::FirmwareVersion).await?;
                    let version = response::parse_firmware_version(&buf)?;
                    info!("Device firmware version is {}", version);
                    return Ok(version);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egismoc_transport::RequestKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_control_sequence() {
        let mut state = InitState::Control1;
        let mut requests = Vec::new();
        while let Some(request) = state.control_request() {
            requests.push(request);
            state = state.next();
        }

        assert_eq!(state, InitState::GetFirmwareVersion);
        assert_eq!(requests.len(), 5);
        assert_eq!(requests[0].kind, RequestKind::Vendor);
        assert_eq!((requests[0].request, requests[0].index, requests[0].length), (32, 4, 16));
        assert_eq!(requests[1].length, 40);
        assert_eq!(requests[2], requests[3]);
        assert_eq!(requests[2].kind, RequestKind::Standard);
        assert_eq!((requests[4].request, requests[4].length), (82, 8));
    }
}
