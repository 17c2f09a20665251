//! High-level device interface

use std::ops::{Deref, DerefMut};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use egismoc_core::Directory;
use egismoc_core::constants::{DRIVER_FULL_NAME, DRIVER_ID};
use egismoc_transport::{Transport, UsbTransport};
use egismoc_types::{DeviceInfo, Print};

use crate::{
    cancel::Canceller,
    config::DeviceConfig,
    driver::{EnrollProgress, FingerStatus, FingerprintDriver, Identification, Verification},
    error::{Error, Result},
    task::{
        TaskKind, TaskSlot,
        identify::{IdentifyAction, VerifyAction},
    },
};

/// Egis match-on-chip fingerprint device
///
/// Owns the transport and everything a task needs: the print directory
/// fetched by the running task, the task slot and the cancellation handle.
/// All operations take `&mut self`, so only one runs at a time.
///
/// # Examples
///
/// ```no_run
/// use egismoc::{EgisMoc, FingerprintDriver};
///
/// #[tokio::main]
/// async fn main() -> egismoc::Result<()> {
///     let mut device = EgisMoc::usb();
///
///     device.open().await?;
///     for print in device.list().await? {
///         println!("{}", print);
///     }
///
///     device.close().await?;
///     Ok(())
/// }
/// ```
pub struct EgisMoc<T: Transport> {
    pub(crate) transport: T,
    pub(crate) config: DeviceConfig,
    pub(crate) directory: Directory,
    pub(crate) slot: TaskSlot,
    pub(crate) canceller: Canceller,
    finger_status: watch::Sender<FingerStatus>,
    info: Option<DeviceInfo>,
    open: bool,
}

impl EgisMoc<UsbTransport> {
    /// Create a device for the first attached supported sensor
    pub fn usb() -> Self {
        Self::new(UsbTransport::new())
    }
}

impl<T: Transport> EgisMoc<T> {
    /// Create a device on top of `transport`
    pub fn new(transport: T) -> Self {
        let (finger_status, _) = watch::channel(FingerStatus::None);
        Self {
            transport,
            config: DeviceConfig::default(),
            directory: Directory::default(),
            slot: TaskSlot::default(),
            canceller: Canceller::new(),
            finger_status,
            info: None,
            open: false,
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: DeviceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Check if the device was opened successfully
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Information gathered while opening
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.info.as_ref()
    }

    /// Task currently holding the device
    pub fn current_task(&self) -> Option<TaskKind> {
        self.slot.current()
    }

    /// Handle that can cancel finger waits from another task
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    pub fn finger_status(&self) -> FingerStatus {
        *self.finger_status.borrow()
    }

    /// Watch finger status changes
    pub fn subscribe_finger_status(&self) -> watch::Receiver<FingerStatus> {
        self.finger_status.subscribe()
    }

    pub(crate) fn set_finger_status(&self, status: FingerStatus) {
        self.finger_status.send_if_modified(|current| {
            let changed = *current != status;
            *current = status;
            changed
        });
    }

    /// Claim the task slot once the device is open
    fn begin_task(&mut self, kind: TaskKind) -> Result<TaskGuard<'_, T>> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        self.claim_task(kind)
    }

    fn claim_task(&mut self, kind: TaskKind) -> Result<TaskGuard<'_, T>> {
        debug!("Begin {} task", kind);
        self.slot.begin(kind)?;
        Ok(TaskGuard {
            device: self,
            kind,
            finished: false,
        })
    }

    /// Drop everything a task left behind
    fn reset_task_state(&mut self) {
        self.slot.finish();
        self.directory = Directory::default();
        self.set_finger_status(FingerStatus::None);
    }
}

/// A running task
///
/// Holds the device for the task's lifetime. The slot, directory and finger
/// status are released when the guard drops, including when the task future
/// is dropped before it completes.
struct TaskGuard<'a, T: Transport> {
    device: &'a mut EgisMoc<T>,
    kind: TaskKind,
    finished: bool,
}

impl<T: Transport> TaskGuard<'_, T> {
    /// Log the outcome and release the device
    fn finish<R>(mut self, result: &Result<R>) {
        self.finished = true;
        match result {
            Ok(_) => debug!("Task {} done", self.kind),
            Err(e) => warn!("Task {} failed: {}", self.kind, e),
        }
    }
}

impl<T: Transport> Deref for TaskGuard<'_, T> {
    type Target = EgisMoc<T>;

    fn deref(&self) -> &EgisMoc<T> {
        self.device
    }
}

impl<T: Transport> DerefMut for TaskGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut EgisMoc<T> {
        self.device
    }
}

impl<T: Transport> Drop for TaskGuard<'_, T> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Task {} abandoned before completion", self.kind);
        }
        self.device.reset_task_state();
    }
}

#[async_trait]
impl<T: Transport> FingerprintDriver for EgisMoc<T> {
    async fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::AlreadyOpen);
        }

        debug!("Opening device");
        self.reset_task_state();

        // A previous open may have been abandoned half way
        if self.transport.is_open() {
            self.transport.close().await?;
        }

        self.transport.open().await?;

        let result = {
            let mut task = self.claim_task(TaskKind::Init)?;
            let result = task.run_init().await;
            task.finish(&result);
            result
        };

        match result {
            Ok(firmware_version) => {
                let info = DeviceInfo::new(
                    DRIVER_ID,
                    DRIVER_FULL_NAME,
                    firmware_version,
                    self.config.enroll_stages,
                )
                .with_location(self.transport.description());

                info!("Opened {}", info);
                self.info = Some(info);
                self.open = true;
                Ok(())
            }
            Err(e) => {
                if let Err(close_err) = self.transport.close().await {
                    warn!("Failed to release interface: {}", close_err);
                }
                Err(e)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::NotOpen);
        }

        debug!("Closing device");
        self.canceller.cancel();
        self.reset_task_state();
        self.info = None;
        self.open = false;

        self.transport.close().await?;
        Ok(())
    }

    fn cancel(&self) {
        self.canceller.cancel();
    }

    async fn enroll(
        &mut self,
        template: Print,
        progress: &mut (dyn FnMut(EnrollProgress) + Send),
    ) -> Result<Print> {
        debug!("Enroll");
        let mut task = self.begin_task(TaskKind::Enroll)?;
        let result = task.run_enroll(template, progress).await;
        task.finish(&result);
        result
    }

    async fn identify(&mut self, gallery: &[Print]) -> Result<Identification> {
        debug!("Identify");
        let mut task = self.begin_task(TaskKind::Identify)?;
        let result = task.run_match(&IdentifyAction::new(gallery)).await;
        task.finish(&result);
        result
    }

    async fn verify(&mut self, expected: &Print) -> Result<Verification> {
        debug!("Verify");
        let mut task = self.begin_task(TaskKind::Verify)?;
        let result = task.run_match(&VerifyAction::new(expected)).await;
        task.finish(&result);
        result
    }

    async fn delete(&mut self, print: &Print) -> Result<()> {
        debug!("Delete");
        let mut task = self.begin_task(TaskKind::Delete)?;
        let result = task.run_delete(print).await;
        task.finish(&result);
        result
    }

    async fn clear_storage(&mut self) -> Result<()> {
        debug!("Clear storage");
        let mut task = self.begin_task(TaskKind::ClearStorage)?;
        let result = task.run_clear_storage().await;
        task.finish(&result);
        result
    }

    async fn list(&mut self) -> Result<Vec<Print>> {
        debug!("List");
        let mut task = self.begin_task(TaskKind::List)?;
        let result = task.run_list().await;
        task.finish(&result);
        result
    }
}
