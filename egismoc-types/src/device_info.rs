//! Device information structures

use std::fmt;

/// Device information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Short driver id
    pub driver: String,

    /// Driver full name
    pub name: String,

    /// Firmware version reported by the sensor
    pub firmware_version: String,

    /// Number of accepted captures needed to enroll a finger
    pub enroll_stages: usize,

    /// Where the device is attached (bus/address or a test label)
    pub location: Option<String>,
}

impl DeviceInfo {
    pub fn new(
        driver: impl Into<String>,
        name: impl Into<String>,
        firmware_version: impl Into<String>,
        enroll_stages: usize,
    ) -> Self {
        Self {
            driver: driver.into(),
            name: name.into(),
            firmware_version: firmware_version.into(),
            enroll_stages,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device[{}, FW: {}]", self.name, self.firmware_version)
    }
}
