//! Entry point for `feed-client`.
//!
//! Owns only process setup (logging, argument parsing) and printing; all
//! protocol work lives in the library.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use feed_client::{config, ClientConfig, FeedClient};

/// Fetch every packet from the feed server and backfill any gaps.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Server host or IP.
    #[arg(long, default_value = config::DEFAULT_HOST)]
    host: String,
    /// Server port.
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,
    /// Give up connecting after this many milliseconds (default: wait forever).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    connect_timeout_ms: Option<u64>,
    /// Give up on a silent server after this many milliseconds (default: wait forever).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    read_timeout_ms: Option<u64>,
}

fn main() -> Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::new(cli.host, cli.port);
    if let Some(ms) = cli.connect_timeout_ms {
        config = config.with_connect_timeout(Duration::from_millis(ms));
    }
    if let Some(ms) = cli.read_timeout_ms {
        config = config.with_io_timeout(Duration::from_millis(ms));
    }

    let mut client = FeedClient::new(config);
    match client.run() {
        Ok(packets) => {
            for packet in packets {
                println!("{}", packet);
            }
            log::debug!("{:?}", client.backfill_stats());
        }
        Err(e) => {
            eprintln!("Something went wrong ! {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
