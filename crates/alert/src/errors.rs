//! Alert delivery errors.

use thiserror::Error;

/// Why an alert could not be delivered.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The HTTP request did not complete.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service received the request and refused it.
    #[error("rejected by {service}: {reason}")]
    Rejected {
        /// Service that refused the alert.
        service: &'static str,

        /// Reason it gave.
        reason: String,
    },
}
