use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::label::LabelCache;

/// Shared flag requesting a render to stop.
///
/// The render checks the flag at layer boundaries and before every feature, so a stop takes
/// effect at the next check.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the render to stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns true if a stop was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Stops the render of a [`StreamingRenderer`](crate::StreamingRenderer) from another thread.
#[derive(Clone)]
pub struct StopHandle {
    token: CancelToken,
    labels: Arc<dyn LabelCache>,
}

impl StopHandle {
    pub(crate) fn new(token: CancelToken, labels: Arc<dyn LabelCache>) -> Self {
        Self { token, labels }
    }

    /// Requests the render in progress to stop and stops the label cache.
    pub fn stop(&self) {
        self.token.cancel();
        self.labels.stop();
    }

    /// Returns true if a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}
