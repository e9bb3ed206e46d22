//! The alert sink interface.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::errors::AlertError;

/// Somewhere to send a plain-text message for operators.
#[async_trait]
pub trait AlertSink: Debug + Send + Sync {
    /// Delivers `message`.
    ///
    /// Callers are expected to log a failure and carry on.
    async fn notify(&self, message: &str) -> Result<(), AlertError>;
}
