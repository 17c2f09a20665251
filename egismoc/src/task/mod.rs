//! Device tasks
//!
//! Each high-level operation is a state machine over an explicit state enum.
//! States run one at a time: most send one command and wait for its
//! response, some wait for a finger, and a few only inspect data gathered by
//! earlier states. Helpers shared by every machine live here.

pub(crate) mod clear;
pub(crate) mod delete;
pub(crate) mod enroll;
pub(crate) mod identify;
pub(crate) mod init;
pub(crate) mod list;

use std::fmt;

use bytes::Bytes;
use tracing::debug;

use egismoc_core::{Command, Directory, compose};
use egismoc_transport::Transport;

use crate::{
    device::EgisMoc,
    driver::FingerStatus,
    error::{Error, Result},
    executor,
};

/// Kind of task occupying the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Init,
    List,
    Enroll,
    Identify,
    Verify,
    Delete,
    ClearStorage,
}

impl TaskKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::List => "list",
            Self::Enroll => "enroll",
            Self::Identify => "identify",
            Self::Verify => "verify",
            Self::Delete => "delete",
            Self::ClearStorage => "clear storage",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The single task slot of a device
#[derive(Debug, Default)]
pub(crate) struct TaskSlot {
    current: Option<TaskKind>,
}

impl TaskSlot {
    /// Claim the slot for `kind`
    pub(crate) fn begin(&mut self, kind: TaskKind) -> Result<()> {
        if let Some(current) = self.current {
            return Err(Error::Busy(current.name()));
        }
        self.current = Some(kind);
        Ok(())
    }

    /// Release the slot, returning the task that held it
    pub(crate) fn finish(&mut self) -> Option<TaskKind> {
        self.current.take()
    }

    pub(crate) fn current(&self) -> Option<TaskKind> {
        self.current
    }
}

impl<T: Transport> EgisMoc<T> {
    /// Frame `body`, send it and return the response
    pub(crate) async fn execute_body(&mut self, body: &[u8]) -> Result<Bytes> {
        let frame = compose(body);
        executor::execute(&mut self.transport, &self.config, &frame).await
    }

    /// Run a fixed-body command
    pub(crate) async fn run_command(&mut self, command: Command) -> Result<Bytes> {
        debug!("Execute command {}", command);
        self.execute_body(command.body()).await
    }

    /// Replace the directory with the device's current print list
    pub(crate) async fn refresh_directory(&mut self) -> Result<()> {
        let response = self.run_command(Command::List).await?;
        self.directory = Directory::parse(&response);
        Ok(())
    }

    /// Wait until a finger touches the sensor
    pub(crate) async fn wait_finger(&mut self) -> Result<()> {
        debug!("Wait for finger on sensor");
        let token = self.canceller.token();
        self.set_finger_status(FingerStatus::Needed);

        let result = self
            .transport
            .interrupt_in(
                self.config.interrupt_recv_length,
                self.config.interrupt_timeout,
                &token,
            )
            .await;

        match result {
            Ok(_) => {
                debug!("Finger on sensor");
                self.set_finger_status(FingerStatus::Present);
                Ok(())
            }
            Err(e) => {
                self.set_finger_status(FingerStatus::None);
                if e.is_cancelled() {
                    Err(Error::Cancelled)
                } else {
                    Err(e.into())
                }
            }
        }
    }
}
