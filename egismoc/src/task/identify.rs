//! Identify and verify
//!
//! Both run the same on-chip match: the device compares the finger against
//! every stored print and answers with the identifier it matched. What the
//! answer means differs: identify looks the match up in the caller's gallery,
//! verify compares it with one expected print.

use tracing::{debug, info};

use egismoc_core::response::{self, IdentifyStatus};
use egismoc_core::{Command, command};
use egismoc_transport::Transport;
use egismoc_types::Print;

use crate::{
    device::EgisMoc,
    driver::{Identification, Verification},
    error::{Error, Result},
    print,
};

/// What to do with the device's answer
pub(crate) trait MatchAction: Sync {
    type Output: Send;

    /// The device matched `device_print`
    fn on_match(&self, device_print: Print) -> Self::Output;

    /// The finger is not stored on the device
    fn on_no_match(&self) -> Self::Output;
}

pub(crate) struct IdentifyAction<'a> {
    gallery: &'a [Print],
}

impl<'a> IdentifyAction<'a> {
    pub(crate) fn new(gallery: &'a [Print]) -> Self {
        Self { gallery }
    }
}

impl MatchAction for IdentifyAction<'_> {
    type Output = Identification;

    fn on_match(&self, device_print: Print) -> Identification {
        let matched = self.gallery.iter().find(|p| **p == device_print).cloned();
        if matched.is_none() {
            debug!("Matched print is not in the gallery");
        }

        Identification {
            matched,
            device_print: Some(device_print),
        }
    }

    fn on_no_match(&self) -> Identification {
        Identification {
            matched: None,
            device_print: None,
        }
    }
}

pub(crate) struct VerifyAction<'a> {
    expected: &'a Print,
}

impl<'a> VerifyAction<'a> {
    pub(crate) fn new(expected: &'a Print) -> Self {
        Self { expected }
    }
}

impl MatchAction for VerifyAction<'_> {
    type Output = Verification;

    fn on_match(&self, device_print: Print) -> Verification {
        info!(
            "Verifying against: {}",
            self.expected.description.as_deref().unwrap_or_default()
        );

        Verification {
            matched: *self.expected == device_print,
            device_print: Some(device_print),
        }
    }

    fn on_no_match(&self) -> Verification {
        Verification {
            matched: false,
            device_print: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdentifyState {
    GetEnrolledIds,
    CheckEnrolledNum,
    SensorReset,
    SensorIdentify,
    WaitFinger,
    SensorCheck,
    Check,
    CompleteSensorReset,
    Complete,
}

impl IdentifyState {
    pub(crate) fn next(self) -> Self {
        match self {
            Self::GetEnrolledIds => Self::CheckEnrolledNum,
            Self::CheckEnrolledNum => Self::SensorReset,
            Self::SensorReset => Self::SensorIdentify,
            Self::SensorIdentify => Self::WaitFinger,
            Self::WaitFinger => Self::SensorCheck,
            Self::SensorCheck => Self::Check,
            Self::Check => Self::CompleteSensorReset,
            Self::CompleteSensorReset | Self::Complete => Self::Complete,
        }
    }
}

impl<T: Transport> EgisMoc<T> {
    pub(crate) async fn run_match<A: MatchAction>(&mut self, action: &A) -> Result<A::Output> {
        let mut state = IdentifyState::GetEnrolledIds;
        let mut outcome = None;

        loop {
            debug!(?state, "Identify step");

            match state {
                IdentifyState::GetEnrolledIds => {
                    self.refresh_directory().await?;
                }
                IdentifyState::CheckEnrolledNum => {
                    if self.directory.is_empty() {
                        return Err(Error::DataNotFound);
                    }
                }
                IdentifyState::SensorReset | IdentifyState::CompleteSensorReset => {
                    self.run_command(Command::SensorReset).await?;
                }
                IdentifyState::SensorIdentify => {
                    self.run_command(Command::SensorIdentify).await?;
                }
                IdentifyState::WaitFinger => {
                    self.wait_finger().await?;
                }
                IdentifyState::SensorCheck => {
                    self.run_command(Command::SensorCheck).await?;
                }
                IdentifyState::Check => {
                    let body = command::check_body(self.directory.ids())?;
                    let buf = self.execute_body(&body).await?;

                    outcome = Some(match response::classify_identify(&buf) {
                        IdentifyStatus::Match(id) => {
                            let device_print = print::print_from_id(&id, &self.config.device_id);
                            info!(
                                "Identify successful for: {}",
                                device_print.description.as_deref().unwrap_or_default()
                            );
                            action.on_match(device_print)
                        }
                        IdentifyStatus::NoMatch => {
                            info!("Print was not identified by the device");
                            action.on_no_match()
                        }
                        IdentifyStatus::Unrecognized => {
                            return Err(Error::Protocol("Unrecognized response from device".into()));
                        }
                    });
                }
                IdentifyState::Complete => {
                    return outcome.ok_or_else(|| {
                        Error::Protocol("Identify finished without a device answer".into())
                    });
                }
            }

            state = state.next();
        }
    }
}
