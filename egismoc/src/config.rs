//! Driver configuration

use std::time::Duration;

use egismoc_core::constants::{
    CONTROL_TIMEOUT, ENROLL_TIMES, INTERRUPT_IN_RECV_LENGTH, INTERRUPT_TIMEOUT, IN_RECV_LENGTH,
    MAX_ENROLL_NUM, RECV_TIMEOUT, SEND_TIMEOUT,
};

/// Driver settings
///
/// Defaults match what the sensor expects; most callers only change the
/// finger timeout.
///
/// # Examples
///
/// ```
/// use egismoc::DeviceConfig;
/// use std::time::Duration;
///
/// let config = DeviceConfig::default()
///     .with_interrupt_timeout(Duration::from_secs(15))
///     .with_device_id("reader-1");
///
/// assert_eq!(config.enroll_stages, 10);
/// ```
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub control_timeout: Duration,
    pub send_timeout: Duration,
    pub recv_timeout: Duration,
    /// How long a task waits for a finger on the sensor
    pub interrupt_timeout: Duration,
    pub recv_length: usize,
    pub interrupt_recv_length: usize,
    /// Accepted captures per enrollment
    pub enroll_stages: usize,
    /// Prints the device can hold
    pub max_enrolled: usize,
    /// Recorded in every print this driver creates
    pub device_id: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            control_timeout: CONTROL_TIMEOUT,
            send_timeout: SEND_TIMEOUT,
            recv_timeout: RECV_TIMEOUT,
            interrupt_timeout: INTERRUPT_TIMEOUT,
            recv_length: IN_RECV_LENGTH,
            interrupt_recv_length: INTERRUPT_IN_RECV_LENGTH,
            enroll_stages: ENROLL_TIMES,
            max_enrolled: MAX_ENROLL_NUM,
            device_id: "0".to_string(),
        }
    }
}

impl DeviceConfig {
    /// Set control transfer timeout
    pub fn with_control_timeout(mut self, timeout: Duration) -> Self {
        self.control_timeout = timeout;
        self
    }

    /// Set bulk OUT and bulk IN timeouts
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self.recv_timeout = timeout;
        self
    }

    /// Set how long to wait for a finger
    pub fn with_interrupt_timeout(mut self, timeout: Duration) -> Self {
        self.interrupt_timeout = timeout;
        self
    }

    /// Set the number of captures per enrollment (at least one)
    pub fn with_enroll_stages(mut self, stages: usize) -> Self {
        self.enroll_stages = stages.max(1);
        self
    }

    /// Set device storage capacity
    pub fn with_max_enrolled(mut self, max: usize) -> Self {
        self.max_enrolled = max;
        self
    }

    /// Set the device id recorded in prints
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }
}
