//! List stored prints

use tracing::debug;

use egismoc_transport::Transport;
use egismoc_types::Print;

use crate::{device::EgisMoc, error::Result, print};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListState {
    GetEnrolledIds,
    ReturnEnrolledPrints,
}

impl<T: Transport> EgisMoc<T> {
    /// Print records for every identifier in the directory
    pub(crate) fn enrolled_prints(&self) -> Vec<Print> {
        self.directory
            .iter()
            .map(|id| print::print_from_id(id, &self.config.device_id))
            .collect()
    }

    pub(crate) async fn run_list(&mut self) -> Result<Vec<Print>> {
        let mut state = ListState::GetEnrolledIds;

        loop {
            debug!(?state, "List step");

            match state {
                ListState::GetEnrolledIds => {
                    self.refresh_directory().await?;
                    state = ListState::ReturnEnrolledPrints;
                }
                ListState::ReturnEnrolledPrints => return Ok(self.enrolled_prints()),
            }
        }
    }
}
