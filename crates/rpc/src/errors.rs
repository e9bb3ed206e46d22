//! Error codes returned by the RPC server.
//!
//! Codes follow HTTP status semantics so that a gateway in front of the server can forward them
//! as they are.

use jsonrpsee::types::ErrorObjectOwned;
use serde::Serialize;

/// The request carries no identity.
pub const UNAUTHENTICATED: i32 = 401;

/// The request is malformed or cannot be served right now (bad recipient, unknown name, already
/// claimed, invalid network entries).
pub const BAD_REQUEST: i32 = 400;

/// The claimant is not eligible, or the admin key is wrong.
pub const FORBIDDEN: i32 = 403;

/// Something failed on the faucet's side; the claimant may retry later.
pub const INTERNAL: i32 = 500;

/// Builds an error object with `code` and a human-readable `message`.
pub fn rpc_error(code: i32, message: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned::<()>(code, message.into(), None)
}

/// Builds an error object that also carries `data`, e.g. what was done before the failure.
pub fn rpc_error_with_data<T: Serialize>(
    code: i32,
    message: impl Into<String>,
    data: T,
) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code, message.into(), Some(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_object_carries_code_and_message() {
        let err = rpc_error(UNAUTHENTICATED, "Not authenticated.");

        assert_eq!(err.code(), 401);
        assert_eq!(err.message(), "Not authenticated.");
        assert!(err.data().is_none());
    }
}
