pub(crate) const DEFAULT_THREAD_COUNT: u8 = 4;

pub(crate) const DEFAULT_THREAD_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Base name the service reports itself as in logs and traces.
pub(crate) const SERVICE_NAME: &str = "drip-faucet";

/// File name of the SQLite database inside the data directory.
pub(crate) const DB_NAME: &str = "faucet.db";

/// Environment variable holding the hex-encoded private key drips are signed with.
pub(crate) const OPERATOR_KEY_ENVVAR: &str = "DRIP_OPERATOR_PRIVATE_KEY";
