//! Delete one stored print

use tracing::{debug, info};

use egismoc_core::{command, response};
use egismoc_transport::Transport;
use egismoc_types::Print;

use crate::{
    device::EgisMoc,
    error::{Error, Result},
    print,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeleteState {
    GetEnrolledIds,
    Delete,
}

impl<T: Transport> EgisMoc<T> {
    pub(crate) async fn run_delete(&mut self, target: &Print) -> Result<()> {
        // Nothing goes out before the target is known to be valid
        let id = print::decode_print_data(target)?;

        let description = target.description.as_deref().unwrap_or_default();
        if !print::is_driver_description(description) {
            debug!(
                "Fingerprint '{}' was not created by this driver; deleting anyway.",
                description
            );
        }

        let mut state = DeleteState::GetEnrolledIds;

        loop {
            debug!(?state, "Delete step");

            match state {
                DeleteState::GetEnrolledIds => {
                    self.refresh_directory().await?;
                    state = DeleteState::Delete;
                }
                DeleteState::Delete => {
                    info!("Delete fingerprint {} ({})", description, id);

                    let body = command::delete_body(&[id])?;
                    let buf = self.execute_body(&body).await?;

                    if !response::is_delete_success(&buf) {
                        return Err(Error::Protocol("Delete print was not successful".into()));
                    }
                    return Ok(());
                }
            }
        }
    }
}
