//! Clear device storage

use tracing::{debug, info};

use egismoc_core::{command, response};
use egismoc_transport::Transport;

use crate::{
    device::EgisMoc,
    error::{Error, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClearState {
    GetEnrolledIdsBefore,
    Clear,
    GetEnrolledIdsAfter,
    Complete,
}

impl<T: Transport> EgisMoc<T> {
    pub(crate) async fn run_clear_storage(&mut self) -> Result<()> {
        let mut state = ClearState::GetEnrolledIdsBefore;

        loop {
            debug!(?state, "Clear storage step");

            state = match state {
                ClearState::GetEnrolledIdsBefore => {
                    self.refresh_directory().await?;
                    if self.directory.is_empty() {
                        return Err(Error::DataNotFound);
                    }
                    ClearState::Clear
                }
                ClearState::Clear => {
                    let body = command::delete_body(self.directory.ids())?;
                    let buf = self.execute_body(&body).await?;

                    if !response::is_delete_success(&buf) {
                        return Err(Error::Protocol("Clear storage was not successful".into()));
                    }
                    ClearState::GetEnrolledIdsAfter
                }
                ClearState::GetEnrolledIdsAfter => {
                    self.refresh_directory().await?;
                    ClearState::Complete
                }
                ClearState::Complete => {
                    if !self.directory.is_empty() {
                        return Err(Error::Protocol(format!(
                            "Clear storage submitted but {} prints remain on the device",
                            self.directory.len()
                        )));
                    }

                    info!("Device storage cleared");
                    return Ok(());
                }
            };
        }
    }
}
