//! Scripted in-memory transport
//!
//! [`MockTransport`] plays back queued replies instead of talking to a
//! device, and records everything the driver writes. Keep a [`MockHandle`]
//! around to script and inspect the transport after it has been moved into
//! a driver.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use nusb::transfer::TransferError;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{ControlRequest, Transport, error::*};

/// Failure to inject in place of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Timeout,
    Stall,
    Disconnected,
}

impl MockFailure {
    fn into_error(self, operation: &'static str, timeout: Duration) -> Error {
        match self {
            MockFailure::Timeout => Error::Timeout { operation, timeout },
            MockFailure::Stall => Error::Transfer(TransferError::Stall),
            MockFailure::Disconnected => Error::Transfer(TransferError::Disconnected),
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Data(Bytes),
    Fail(MockFailure),
}

#[derive(Debug)]
struct State {
    open: bool,
    open_failure: Option<MockFailure>,
    send_failure: Option<MockFailure>,
    auto_touch: bool,
    control_replies: VecDeque<Reply>,
    responses: VecDeque<Reply>,
    interrupts: VecDeque<Reply>,
    sent: Vec<Bytes>,
    controls: Vec<ControlRequest>,
    interrupt_waits: usize,
    close_count: usize,
}

impl Default for State {
    fn default() -> Self {
        Self {
            open: false,
            open_failure: None,
            send_failure: None,
            auto_touch: true,
            control_replies: VecDeque::new(),
            responses: VecDeque::new(),
            interrupts: VecDeque::new(),
            sent: Vec::new(),
            controls: Vec::new(),
            interrupt_waits: 0,
            close_count: 0,
        }
    }
}

/// In-memory transport driven by a script
///
/// Without a scripted reply, control transfers answer with zeroes, the
/// interrupt fires at once (a finger is always present) and bulk reads time
/// out.
///
/// # Examples
///
/// ```
/// use egismoc_transport::{MockTransport, Transport};
/// use std::time::Duration;
///
/// # tokio_test_block_on(async {
/// let mut transport = MockTransport::new();
/// let handle = transport.handle();
/// handle.push_response(vec![0x53, 0x49, 0x47, 0x45]);
///
/// transport.open().await.unwrap();
/// transport.bulk_out(b"EGIS", Duration::from_secs(1)).await.unwrap();
/// let reply = transport.bulk_in(4096, Duration::from_secs(1)).await.unwrap();
///
/// assert_eq!(&reply[..], b"SIGE");
/// assert_eq!(handle.sent().len(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

/// Shared handle for scripting and inspecting a [`MockTransport`]
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl MockHandle {
    /// Queue a bulk IN reply
    pub fn push_response(&self, data: impl Into<Bytes>) {
        self.state.lock().responses.push_back(Reply::Data(data.into()));
    }

    /// Queue a failing bulk IN read
    pub fn push_response_failure(&self, failure: MockFailure) {
        self.state.lock().responses.push_back(Reply::Fail(failure));
    }

    /// Queue a control transfer reply
    pub fn push_control_reply(&self, data: impl Into<Bytes>) {
        self.state.lock().control_replies.push_back(Reply::Data(data.into()));
    }

    /// Queue a failing control transfer
    pub fn push_control_failure(&self, failure: MockFailure) {
        self.state.lock().control_replies.push_back(Reply::Fail(failure));
    }

    /// Queue a failing interrupt wait
    pub fn push_interrupt_failure(&self, failure: MockFailure) {
        self.state.lock().interrupts.push_back(Reply::Fail(failure));
    }

    /// Make the next bulk OUT fail
    pub fn fail_next_send(&self, failure: MockFailure) {
        self.state.lock().send_failure = Some(failure);
    }

    /// Make the next open fail
    pub fn fail_next_open(&self, failure: MockFailure) {
        self.state.lock().open_failure = Some(failure);
    }

    /// Choose whether unscripted interrupt waits fire at once or block until
    /// cancelled or timed out
    pub fn set_auto_touch(&self, enabled: bool) {
        self.state.lock().auto_touch = enabled;
    }

    /// Frames written so far
    pub fn sent(&self) -> Vec<Bytes> {
        self.state.lock().sent.clone()
    }

    /// Forget the recorded frames
    pub fn clear_sent(&self) {
        self.state.lock().sent.clear();
    }

    /// Control requests issued so far
    pub fn controls(&self) -> Vec<ControlRequest> {
        self.state.lock().controls.clone()
    }

    /// Number of interrupt waits started
    pub fn interrupt_waits(&self) -> usize {
        self.state.lock().interrupt_waits
    }

    /// Replies still queued for bulk IN
    pub fn pending_responses(&self) -> usize {
        self.state.lock().responses.len()
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Number of times the interface was released
    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.open {
            return Err(Error::AlreadyOpen);
        }
        if let Some(failure) = state.open_failure.take() {
            return Err(failure.into_error("Open", Duration::ZERO));
        }

        debug!("Mock transport opened");
        state.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.open {
            state.close_count += 1;
        }
        state.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.lock().open
    }

    async fn control_in(&mut self, request: ControlRequest, timeout: Duration) -> Result<Bytes> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(Error::NotOpen);
        }

        state.controls.push(request);
        let data = match state.control_replies.pop_front() {
            Some(Reply::Data(data)) => data,
            Some(Reply::Fail(failure)) => {
                return Err(failure.into_error("Control transfer", timeout));
            }
            None => Bytes::from(vec![0u8; request.length as usize]),
        };

        if data.len() < request.length as usize {
            return Err(Error::ShortTransfer {
                expected: request.length as usize,
                actual: data.len(),
            });
        }

        Ok(data)
    }

    async fn bulk_out(&mut self, data: &[u8], timeout: Duration) -> Result<usize> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(Error::NotOpen);
        }
        if let Some(failure) = state.send_failure.take() {
            return Err(failure.into_error("Bulk OUT", timeout));
        }

        trace!("Mock sent {} bytes", data.len());
        state.sent.push(Bytes::copy_from_slice(data));
        Ok(data.len())
    }

    async fn bulk_in(&mut self, max_len: usize, timeout: Duration) -> Result<BytesMut> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(Error::NotOpen);
        }

        match state.responses.pop_front() {
            Some(Reply::Data(data)) => {
                let len = data.len().min(max_len);
                Ok(BytesMut::from(&data[..len]))
            }
            Some(Reply::Fail(failure)) => Err(failure.into_error("Bulk IN", timeout)),
            None => Err(MockFailure::Timeout.into_error("Bulk IN", timeout)),
        }
    }

    async fn interrupt_in(
        &mut self,
        max_len: usize,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<BytesMut> {
        let scripted = {
            let mut state = self.state.lock();
            if !state.open {
                return Err(Error::NotOpen);
            }
            state.interrupt_waits += 1;
            match state.interrupts.pop_front() {
                Some(reply) => Some(reply),
                None if state.auto_touch => Some(Reply::Data(Bytes::from_static(&[0x01]))),
                None => None,
            }
        };

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        match scripted {
            Some(Reply::Data(data)) => {
                let len = data.len().min(max_len);
                Ok(BytesMut::from(&data[..len]))
            }
            Some(Reply::Fail(failure)) => Err(failure.into_error("Interrupt IN", timeout)),
            None => {
                tokio::select! {
                    _ = cancel.cancelled() => Err(Error::Cancelled),
                    _ = tokio::time::sleep(timeout) => Err(Error::Timeout {
                        operation: "Interrupt IN",
                        timeout,
                    }),
                }
            }
        }
    }

    fn description(&self) -> String {
        "mock".to_string()
    }
}
