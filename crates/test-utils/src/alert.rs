//! An [`AlertSink`] that remembers what it was sent.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use drip_alert::{errors::AlertError, sink::AlertSink};

/// Records every alert. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlertSink {
    messages: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingAlertSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes delivery fail (or succeed again). Failed alerts are still recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every alert received so far, in order.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .expect("messages must not be poisoned")
            .clone()
    }
}

#[async_trait]
impl AlertSink for RecordingAlertSink {
    async fn notify(&self, message: &str) -> Result<(), AlertError> {
        self.messages
            .lock()
            .expect("messages must not be poisoned")
            .push(message.to_string());

        if self.failing.load(Ordering::SeqCst) {
            return Err(AlertError::Rejected {
                service: "recording",
                reason: "sink is failing".to_string(),
            });
        }

        Ok(())
    }
}
