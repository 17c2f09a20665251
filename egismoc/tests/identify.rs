mod common;

use std::time::Duration;

use common::*;
use egismoc::print::print_from_id;
use egismoc::protocol::{Command, PrintId, command, compose};
use egismoc::transport::{MockFailure, MockHandle};
use egismoc::{DeviceConfig, Error, FingerStatus, FingerprintDriver};
use pretty_assertions::assert_eq;

fn script_match(handle: &MockHandle, ids: &[PrintId], reply: Vec<u8>) {
    handle.push_response(list(ids));
    handle.push_response(ok()); // sensor reset
    handle.push_response(ok()); // sensor identify
    handle.push_response(ok()); // sensor check
    handle.push_response(reply);
    handle.push_response(ok()); // sensor reset
}

#[tokio::test]
async fn test_identify_gallery_match() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    let a = print_id("FP1-20240101-1-00000001-a");
    let b = print_id("FP1-20240101-2-00000002-b");
    script_match(&handle, &[a, b], identify_match(&b));

    let gallery = vec![print_from_id(&a, "0"), print_from_id(&b, "0")];
    let result = device.identify(&gallery).await.unwrap();

    assert_eq!(result.matched.as_ref(), Some(&gallery[1]));
    assert_eq!(result.device_print, Some(print_from_id(&b, "0")));

    let sent = handle.sent();
    assert_eq!(sent.len(), 6);
    assert_eq!(sent[2], compose(Command::SensorIdentify.body()));
    assert_eq!(sent[4], compose(&command::check_body(&[a, b]).unwrap()));
    assert_eq!(device.finger_status(), FingerStatus::None);
}

#[tokio::test]
async fn test_identify_match_outside_gallery() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    let a = print_id("FP1-20240101-1-00000001-a");
    let b = print_id("FP1-20240101-2-00000002-b");
    script_match(&handle, &[a, b], identify_match(&b));

    let result = device.identify(&[print_from_id(&a, "0")]).await.unwrap();

    assert_eq!(result.matched, None);
    assert_eq!(result.device_print, Some(print_from_id(&b, "0")));
}

#[tokio::test]
async fn test_identify_empty_gallery_reports_device_print() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    let a = print_id("FP1-20240101-1-00000001-a");
    script_match(&handle, &[a], identify_match(&a));

    let result = device.identify(&[]).await.unwrap();

    assert_eq!(result.matched, None);
    assert_eq!(result.device_print, Some(print_from_id(&a, "0")));
    assert_eq!(handle.sent().len(), 6);
}

#[tokio::test]
async fn test_identify_no_match() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    let a = print_id("FP1-20240101-1-00000001-a");
    script_match(&handle, &[a], response(&NO_MATCH));

    let result = device.identify(&[print_from_id(&a, "0")]).await.unwrap();

    assert_eq!(result.matched, None);
    assert_eq!(result.device_print, None);
    assert_eq!(handle.pending_responses(), 0);
}

#[tokio::test]
async fn test_identify_without_prints() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    handle.push_response(list(&[]));

    assert!(matches!(device.identify(&[]).await, Err(Error::DataNotFound)));
    assert_eq!(handle.sent().len(), 1);
    assert_eq!(handle.interrupt_waits(), 0);
}

#[tokio::test]
async fn test_identify_unrecognized_response() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    let a = print_id("FP1-20240101-1-00000001-a");
    script_match(&handle, &[a], response(&FAILED));

    assert!(matches!(device.identify(&[]).await, Err(Error::Protocol(_))));
    // final sensor reset never sent
    assert_eq!(handle.sent().len(), 5);
}

#[tokio::test]
async fn test_verify() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    let a = print_id("FP1-20240101-1-00000001-a");
    let b = print_id("FP1-20240101-2-00000002-b");

    script_match(&handle, &[a, b], identify_match(&a));
    let result = device.verify(&print_from_id(&a, "0")).await.unwrap();
    assert!(result.matched);

    script_match(&handle, &[a, b], identify_match(&b));
    let result = device.verify(&print_from_id(&a, "0")).await.unwrap();
    assert!(!result.matched);
    assert_eq!(result.device_print, Some(print_from_id(&b, "0")));

    script_match(&handle, &[a, b], response(&NO_MATCH));
    let result = device.verify(&print_from_id(&a, "0")).await.unwrap();
    assert!(!result.matched);
    assert_eq!(result.device_print, None);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_finger_wait() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    handle.set_auto_touch(false);
    let a = print_id("FP1-20240101-1-00000001-a");
    script_match(&handle, &[a], identify_match(&a));

    let canceller = device.canceller();
    let mut status = device.subscribe_finger_status();
    tokio::spawn(async move {
        status.wait_for(|s| *s == FingerStatus::Needed).await.unwrap();
        canceller.cancel();
    });

    let result = device.identify(&[]).await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(device.current_task(), None);
    assert_eq!(device.finger_status(), FingerStatus::None);
    assert_eq!(handle.sent().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_finger_wait_times_out() {
    let config = DeviceConfig::default().with_interrupt_timeout(Duration::from_secs(5));
    let (mut device, handle) = open_device(config).await;
    handle.set_auto_touch(false);
    script_match(&handle, &[print_id("FP1-20240101-1-00000001-a")], response(&NO_MATCH));

    let result = device.identify(&[]).await;

    let err = result.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_interrupt_failure() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    handle.push_interrupt_failure(MockFailure::Stall);
    handle.push_response(list(&[print_id("FP1-20240101-1-00000001-a")]));
    handle.push_response(ok()); // sensor reset
    handle.push_response(ok()); // sensor identify

    let result = device.verify(&egismoc::Print::default()).await;

    assert!(matches!(result, Err(Error::Transport(_))));
    assert_eq!(handle.pending_responses(), 0);
    assert_eq!(device.finger_status(), FingerStatus::None);

    // the device takes new tasks afterwards
    handle.push_response(list(&[]));
    assert!(device.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_identify_releases_device() {
    let (mut device, handle) = open_device(DeviceConfig::default()).await;
    handle.set_auto_touch(false);
    handle.push_response(list(&[print_id("FP1-20240101-1-00000001-a")]));
    handle.push_response(ok()); // sensor reset
    handle.push_response(ok()); // sensor identify

    let elapsed = tokio::time::timeout(Duration::from_secs(1), device.identify(&[])).await;

    assert!(elapsed.is_err());
    assert_eq!(handle.interrupt_waits(), 1);
    assert_eq!(device.current_task(), None);
    assert_eq!(device.finger_status(), FingerStatus::None);

    handle.push_response(list(&[]));
    assert!(device.list().await.unwrap().is_empty());
}
