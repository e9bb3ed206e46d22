//! Parses command-line arguments for the faucet.

use std::path::PathBuf;

use clap::{crate_version, Parser};

#[derive(Debug, Parser)]
#[clap(
    name = "drip-faucet",
    about = "A faucet that funds an address on several test networks at once",
    version = crate_version!()
)]
pub(crate) struct Cli {
    #[clap(
        long,
        short = 'c',
        help = "The file containing the configuration for the faucet",
        default_value = "config.toml"
    )]
    pub config: PathBuf,
}
