//! Shared helpers for driving the device over a scripted transport

#![allow(dead_code)]

use egismoc::protocol::{PrintId, frame::READ_PREFIX};
use egismoc::transport::{MockHandle, MockTransport};
use egismoc::{DeviceConfig, EgisMoc, FingerprintDriver};
use tracing_subscriber::EnvFilter;

pub const OK: [u8; 6] = [0x00, 0x00, 0x00, 0x02, 0x90, 0x00];
pub const NOT_YET_ENROLLED: [u8; 6] = [0x00, 0x00, 0x00, 0x02, 0x90, 0x04];
pub const NO_MATCH: [u8; 6] = [0x00, 0x00, 0x00, 0x02, 0x90, 0x04];
pub const FAILED: [u8; 6] = [0x00, 0x00, 0x00, 0x02, 0x6a, 0x80];

pub const CAPTURE_ACCEPTED: [u8; 7] = [0x00, 0x00, 0x00, 0x04, 0x0a, 0x90, 0x00];
pub const CAPTURE_OFF_CENTER: [u8; 7] = [0x00, 0x00, 0x00, 0x04, 0x0a, 0x64, 0x91];
pub const CAPTURE_DIRTY: [u8; 6] = [0x00, 0x00, 0x00, 0x02, 0x64, 0x83];

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Response frame carrying `payload`
pub fn response(payload: &[u8]) -> Vec<u8> {
    let mut buf = READ_PREFIX.to_vec();
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(payload);
    buf
}

pub fn ok() -> Vec<u8> {
    response(&OK)
}

pub fn firmware(version: &str) -> Vec<u8> {
    let mut payload = vec![0x00, 0x00, 0x00, 0x0d];
    payload.extend_from_slice(version.as_bytes());
    payload.extend_from_slice(&[0x90, 0x00]);
    response(&payload)
}

pub fn list(ids: &[PrintId]) -> Vec<u8> {
    let mut payload = vec![0x00, 0x00, 0x00, (ids.len() * 32 + 2) as u8];
    for id in ids {
        payload.extend_from_slice(id.as_bytes());
    }
    payload.extend_from_slice(&[0x90, 0x00]);
    response(&payload)
}

pub fn identify_match(id: &PrintId) -> Vec<u8> {
    let mut payload = vec![0x00, 0x00, 0x00, 0x42];
    payload.extend_from_slice(&[0xEE; 32]);
    payload.extend_from_slice(id.as_bytes());
    payload.extend_from_slice(&[0x90, 0x00]);
    response(&payload)
}

pub fn print_id(text: &str) -> PrintId {
    PrintId::from_prefix(text.as_bytes())
}

/// Device opened over a fresh mock, with the init traffic already cleared
pub async fn open_device(config: DeviceConfig) -> (EgisMoc<MockTransport>, MockHandle) {
    init_logging();

    let transport = MockTransport::new();
    let handle = transport.handle();
    handle.push_response(firmware("1.0.5"));

    let mut device = EgisMoc::new(transport).with_config(config);
    device.open().await.expect("open");
    handle.clear_sent();

    (device, handle)
}
