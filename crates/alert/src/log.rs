//! An [`AlertSink`] that only writes to the log.

use async_trait::async_trait;
use tracing::error;

use crate::{errors::AlertError, sink::AlertSink};

/// Emits every alert as an error-level log line.
///
/// Used when no chat integration is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn notify(&self, message: &str) -> Result<(), AlertError> {
        error!(alert = %message, "operator alert");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_fails() {
        assert!(LogAlertSink.notify("Error dripping for 5").await.is_ok());
    }
}
