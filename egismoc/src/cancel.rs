//! Finger wait cancellation

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle that aborts the pending finger wait
///
/// Cancelling trips the current token and installs a fresh one, so a later
/// wait is not affected. Clone it out of the driver to cancel from another
/// task.
#[derive(Debug, Clone, Default)]
pub struct Canceller {
    token: Arc<Mutex<CancellationToken>>,
}

impl Canceller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the pending finger wait, if any
    pub fn cancel(&self) {
        debug!("Cancel");
        let mut token = self.token.lock();
        token.cancel();
        *token = CancellationToken::new();
    }

    /// Token the next wait should observe
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_trips_current_token_only() {
        let canceller = Canceller::new();
        let before = canceller.token();

        canceller.clone().cancel();

        assert!(before.is_cancelled());
        assert!(!canceller.token().is_cancelled());
    }
}
