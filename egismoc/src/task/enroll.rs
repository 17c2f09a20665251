//! Enrollment
//!
//! The device must not already know the finger (checked against every stored
//! print), then collects partial captures until enough are accepted, and
//! finally stores the print under an identifier derived from a fresh user id.
//!
//! ```text
//! GetEnrolledIds -> CheckEnrolledNum -> SensorReset -> SensorEnroll
//!   -> WaitFinger -> SensorCheck -> Check -> Start
//!   -> CaptureSensorReset -> CaptureStartCapture -> CaptureWaitFinger
//!   -> CaptureReadResponse --(stage < total)--> CaptureSensorReset
//!                          --(stage = total)--> CommitStart
//!   -> Commit -> CommitSensorReset -> Complete
//! ```

use chrono::Local;
use tracing::{debug, info};

use egismoc_core::constants::DRIVER_ID;
use egismoc_core::response::{self, CaptureStatus, EnrollCheck};
use egismoc_core::{Command, command};
use egismoc_transport::Transport;
use egismoc_types::Print;

use crate::{
    device::EgisMoc,
    driver::{EnrollProgress, RetryReason},
    error::{Error, Result},
    print,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnrollState {
    GetEnrolledIds,
    CheckEnrolledNum,
    SensorReset,
    SensorEnroll,
    WaitFinger,
    SensorCheck,
    Check,
    Start,
    CaptureSensorReset,
    CaptureStartCapture,
    CaptureWaitFinger,
    CaptureReadResponse,
    CommitStart,
    Commit,
    CommitSensorReset,
    Complete,
}

impl EnrollState {
    /// Linear successor
    pub(crate) fn next(self) -> Self {
        match self {
            Self::GetEnrolledIds => Self::CheckEnrolledNum,
            Self::CheckEnrolledNum => Self::SensorReset,
            Self::SensorReset => Self::SensorEnroll,
            Self::SensorEnroll => Self::WaitFinger,
            Self::WaitFinger => Self::SensorCheck,
            Self::SensorCheck => Self::Check,
            Self::Check => Self::Start,
            Self::Start => Self::CaptureSensorReset,
            Self::CaptureSensorReset => Self::CaptureStartCapture,
            Self::CaptureStartCapture => Self::CaptureWaitFinger,
            Self::CaptureWaitFinger => Self::CaptureReadResponse,
            Self::CaptureReadResponse => Self::CommitStart,
            Self::CommitStart => Self::Commit,
            Self::Commit => Self::CommitSensorReset,
            Self::CommitSensorReset | Self::Complete => Self::Complete,
        }
    }

    /// State after a capture was read, whatever its outcome
    pub(crate) fn after_capture(stage: usize, total: usize) -> Self {
        if stage >= total {
            Self::CaptureReadResponse.next()
        } else {
            Self::CaptureSensorReset
        }
    }

    /// Fixed command sent in this state, if any
    fn command(self) -> Option<Command> {
        match self {
            Self::SensorReset | Self::CaptureSensorReset | Self::CommitSensorReset => {
                Some(Command::SensorReset)
            }
            Self::SensorEnroll => Some(Command::SensorEnroll),
            Self::SensorCheck => Some(Command::SensorCheck),
            Self::Start => Some(Command::EnrollStarting),
            Self::CaptureStartCapture => Some(Command::SensorStartCapture),
            Self::CaptureReadResponse => Some(Command::ReadCapture),
            Self::CommitStart => Some(Command::CommitStarting),
            _ => None,
        }
    }
}

/// Enrollment in progress
#[derive(Debug)]
pub(crate) struct EnrollSession {
    pub(crate) print: Print,
    pub(crate) stage: usize,
    pub(crate) total: usize,
}

impl EnrollSession {
    /// Apply one capture result, returning the progress to report
    pub(crate) fn record_capture(&mut self, status: CaptureStatus) -> EnrollProgress {
        let reason = match status {
            CaptureStatus::Accepted => {
                self.stage += 1;
                info!(
                    "Partial capture successful. Please touch the sensor again ({}/{})",
                    self.stage, self.total
                );
                return EnrollProgress::Stage {
                    stage: self.stage,
                    total: self.total,
                };
            }
            CaptureStatus::OffCenter => RetryReason::CenterFinger,
            CaptureStatus::Dirty => RetryReason::DirtySensor,
            CaptureStatus::Unrecognized => RetryReason::Unrecognized,
        };

        debug!("Capture rejected: {}", reason);
        EnrollProgress::Retry {
            stage: self.stage,
            reason,
        }
    }
}

impl<T: Transport> EgisMoc<T> {
    pub(crate) async fn run_enroll(
        &mut self,
        template: Print,
        progress: &mut (dyn FnMut(EnrollProgress) + Send),
    ) -> Result<Print> {
        let mut print = template;
        print.driver = DRIVER_ID.to_string();
        print.device_id = self.config.device_id.clone();
        if print.enroll_date.is_none() {
            print.enroll_date = Some(Local::now().date_naive());
        }

        let mut session = EnrollSession {
            print,
            stage: 0,
            total: self.config.enroll_stages,
        };
        let mut state = EnrollState::GetEnrolledIds;

        loop {
            debug!(?state, stage = session.stage, "Enroll step");

            state = match state {
                EnrollState::GetEnrolledIds => {
                    self.refresh_directory().await?;
                    state.next()
                }
                EnrollState::CheckEnrolledNum => {
                    if self.directory.len() >= self.config.max_enrolled {
                        return Err(Error::DataFull);
                    }
                    state.next()
                }
                EnrollState::WaitFinger | EnrollState::CaptureWaitFinger => {
                    self.wait_finger().await?;
                    state.next()
                }
                EnrollState::Check => {
                    let body = command::check_body(self.directory.ids())?;
                    let buf = self.execute_body(&body).await?;

                    match response::classify_enroll_check(&buf) {
                        EnrollCheck::NotYetEnrolled => state.next(),
                        EnrollCheck::AlreadyEnrolled => return Err(Error::DataDuplicate),
                    }
                }
                EnrollState::CaptureReadResponse => {
                    let buf = self.run_command(Command::ReadCapture).await?;
                    let report = session.record_capture(response::classify_capture(&buf));
                    progress(report);

                    EnrollState::after_capture(session.stage, session.total)
                }
                EnrollState::Commit => {
                    let id = print::mint_print_id(&session.print);
                    print::set_print_data(&mut session.print, &id);

                    self.execute_body(&command::new_print_body(&id)).await?;
                    state.next()
                }
                EnrollState::Complete => {
                    info!("Enrollment was successful!");
                    return Ok(session.print);
                }
                other => {
                    if let Some(command) = other.command() {
                        self.run_command(command).await?;
                    }
                    other.next()
                }
            };
        }
    }
}
