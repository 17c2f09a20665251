mod common;

use common::*;
use egismoc::protocol::{Command, compose};
use egismoc::transport::{MockFailure, MockTransport, RequestKind};
use egismoc::{DeviceConfig, EgisMoc, Error, FingerprintDriver};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_open_runs_init_sequence() {
    init_logging();
    let transport = MockTransport::new();
    let handle = transport.handle();
    handle.push_response(firmware("2.1.3"));

    let mut device = EgisMoc::new(transport);
    device.open().await.unwrap();

    let controls = handle.controls();
    assert_eq!(controls.len(), 5);
    assert_eq!(
        controls
            .iter()
            .map(|c| (c.kind, c.request, c.value, c.index, c.length))
            .collect::<Vec<_>>(),
        vec![
            (RequestKind::Vendor, 32, 0, 4, 16),
            (RequestKind::Vendor, 32, 0, 4, 40),
            (RequestKind::Standard, 0, 0, 0, 2),
            (RequestKind::Standard, 0, 0, 0, 2),
            (RequestKind::Vendor, 82, 0, 0, 8),
        ]
    );

    assert_eq!(handle.sent(), vec![compose(Command::FirmwareVersion.body())]);

    let info = device.device_info().unwrap();
    assert_eq!(info.firmware_version, "2.1.3");
    assert_eq!(info.enroll_stages, 10);
    assert_eq!(info.location.as_deref(), Some("mock"));
    assert!(device.is_open());
    assert_eq!(device.current_task(), None);
}

#[tokio::test]
async fn test_open_twice() {
    let (mut device, _handle) = open_device(DeviceConfig::default()).await;

    assert!(matches!(device.open().await, Err(Error::AlreadyOpen)));
}

#[tokio::test]
async fn test_bad_firmware_response_releases_interface() {
    init_logging();
    let transport = MockTransport::new();
    let handle = transport.handle();
    handle.push_response(response(&[0x00, 0x00, 0x00, 0x0d, b'1', 0x6a, 0x80]));

    let mut device = EgisMoc::new(transport);
    let result = device.open().await;

    assert!(matches!(
        result,
        Err(Error::Core(egismoc::protocol::Error::InvalidFirmwareVersion(_)))
    ));
    assert!(!device.is_open());
    assert!(!handle.is_open());
    assert_eq!(handle.close_count(), 1);
    assert_eq!(device.current_task(), None);
}

#[tokio::test]
async fn test_control_failure_aborts_open() {
    init_logging();
    let transport = MockTransport::new();
    let handle = transport.handle();
    handle.push_control_reply(vec![0u8; 16]);
    handle.push_control_failure(MockFailure::Stall);

    let mut device = EgisMoc::new(transport);
    let result = device.open().await;

    assert!(matches!(result, Err(Error::Transport(_))));
    assert_eq!(handle.controls().len(), 2);
    assert!(handle.sent().is_empty());
    assert!(!handle.is_open());
}

#[tokio::test]
async fn test_open_after_failed_open() {
    init_logging();
    let transport = MockTransport::new();
    let handle = transport.handle();
    handle.fail_next_open(MockFailure::Disconnected);

    let mut device = EgisMoc::new(transport);
    assert!(device.open().await.is_err());

    handle.push_response(firmware("1.0.0"));
    device.open().await.unwrap();
    assert!(device.is_open());
}

#[tokio::test]
async fn test_close_releases_everything() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;

    device.close().await.unwrap();

    assert!(!device.is_open());
    assert!(device.device_info().is_none());
    assert!(!handle.is_open());
    assert!(matches!(device.list().await, Err(Error::NotOpen)));
}
