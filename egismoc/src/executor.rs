//! Command execution
//!
//! Every command is one write to the bulk OUT endpoint followed by one read
//! from bulk IN. Only one command is in flight at a time; the exclusive
//! borrow of the transport enforces it.

use bytes::Bytes;
use tracing::{debug, trace};

use egismoc_core::MIN_RESPONSE_SIZE;
use egismoc_transport::Transport;

use crate::{
    config::DeviceConfig,
    error::{Error, Result},
};

/// Executor step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmdState {
    Send,
    Get,
}

/// Send `frame` and read the response
///
/// An empty frame skips the write and only reads. A failed write is returned
/// without attempting the read.
pub(crate) async fn execute<T>(
    transport: &mut T,
    config: &DeviceConfig,
    frame: &[u8],
) -> Result<Bytes>
where
    T: Transport + ?Sized,
{
    let mut state = CmdState::Send;

    loop {
        match state {
            CmdState::Send => {
                if frame.is_empty() {
                    trace!("Nothing to send, reading only");
                } else {
                    trace!(len = frame.len(), frame = %hex::encode(frame), "Sending command");
                    transport.bulk_out(frame, config.send_timeout).await?;
                }
                state = CmdState::Get;
            }
            CmdState::Get => {
                let buf = transport.bulk_in(config.recv_length, config.recv_timeout).await?;
                if buf.len() < MIN_RESPONSE_SIZE {
                    debug!("Response of {} bytes is too short", buf.len());
                    return Err(Error::Core(egismoc_core::Error::ResponseTooShort {
                        expected: MIN_RESPONSE_SIZE,
                        actual: buf.len(),
                    }));
                }

                trace!(len = buf.len(), response = %hex::encode(&buf), "Received response");
                return Ok(buf.freeze());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::BytesMut;
    use egismoc_transport::{ControlRequest, Error as TransportError, Result as TransportResult};
    use mockall::{mock, predicate::*};
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    mock! {
        pub Link {}

        #[async_trait]
        impl Transport for Link {
            async fn open(&mut self) -> TransportResult<()>;
            async fn close(&mut self) -> TransportResult<()>;
            fn is_open(&self) -> bool;
            async fn control_in(&mut self, request: ControlRequest, timeout: Duration) -> TransportResult<Bytes>;
            async fn bulk_out(&mut self, data: &[u8], timeout: Duration) -> TransportResult<usize>;
            async fn bulk_in(&mut self, max_len: usize, timeout: Duration) -> TransportResult<BytesMut>;
            async fn interrupt_in(
                &mut self,
                max_len: usize,
                timeout: Duration,
                cancel: &CancellationToken,
            ) -> TransportResult<BytesMut>;
            fn description(&self) -> String;
        }
    }

    fn response() -> BytesMut {
        BytesMut::from(&b"SIGE\x00\x00\x00\x01\xAA\xBB\x00\x00\x00\x02\x90\x00"[..])
    }

    #[tokio::test]
    async fn test_send_then_get() {
        let mut link = MockLink::new();
        let mut seq = mockall::Sequence::new();

        link.expect_bulk_out()
            .withf(|data, _| data == b"EGIS-frame")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|data, _| Ok(data.len()));
        link.expect_bulk_in()
            .with(eq(4096), eq(Duration::from_millis(5000)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(response()));

        let buf = execute(&mut link, &DeviceConfig::default(), b"EGIS-frame")
            .await
            .unwrap();
        assert_eq!(buf.len(), 16);
    }

    #[tokio::test]
    async fn test_empty_frame_only_reads() {
        let mut link = MockLink::new();
        link.expect_bulk_out().never();
        link.expect_bulk_in().times(1).returning(|_, _| Ok(response()));

        assert!(execute(&mut link, &DeviceConfig::default(), &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_error_skips_read() {
        let mut link = MockLink::new();
        link.expect_bulk_out()
            .times(1)
            .returning(|_, _| Err(TransportError::Cancelled));
        link.expect_bulk_in().never();

        let result = execute(&mut link, &DeviceConfig::default(), b"EGIS").await;
        assert!(matches!(result, Err(Error::Transport(TransportError::Cancelled))));
    }

    #[tokio::test]
    async fn test_short_response_is_rejected() {
        let mut link = MockLink::new();
        link.expect_bulk_out().returning(|data, _| Ok(data.len()));
        link.expect_bulk_in()
            .returning(|_, _| Ok(BytesMut::from(&b"SIGE"[..])));

        let result = execute(&mut link, &DeviceConfig::default(), b"EGIS").await;
        assert!(matches!(
            result,
            Err(Error::Core(egismoc_core::Error::ResponseTooShort { expected: 8, actual: 4 }))
        ));
    }
}
