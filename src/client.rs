//! Full fetch: stream everything, backfill the gaps, return one sorted set.

use crate::config::ClientConfig;
use crate::gaps::{BackfillStats, GapResolver, ResendFn};
use crate::session::Session;
use crate::wire::{ClientError, Packet};

pub struct FeedClient {
    config: ClientConfig,
    resolver: GapResolver,
}

impl FeedClient {
    /// Client that backfills over the network.
    pub fn new(config: ClientConfig) -> Self {
        let resolver = GapResolver::new(config.clone());
        Self { config, resolver }
    }

    /// Client with a custom resend backend; the initial stream still uses `config`.
    pub fn with_resend_backend(config: ClientConfig, backend: Box<ResendFn>) -> Self {
        Self {
            config,
            resolver: GapResolver::with_backend(backend),
        }
    }

    pub fn backfill_stats(&self) -> &BackfillStats {
        self.resolver.stats()
    }

    /// Fetch the full stream, backfill gaps and return packets sorted by sequence.
    ///
    /// A failure while streaming aborts the whole run. Resend failures only
    /// leave their sequence out.
    pub fn run(&mut self) -> Result<Vec<Packet>, ClientError> {
        let frames = Session::open(&self.config)?.stream_all()?;
        let streamed: Vec<Packet> = frames.iter().map(Packet::decode).collect();
        log::info!(
            "received {} packets from {}:{}",
            streamed.len(),
            self.config.host,
            self.config.port
        );

        let observed: Vec<i32> = streamed.iter().map(|p| p.sequence).collect();
        let backfilled = self.resolver.resolve(&observed);

        Ok(merge_packets(streamed, backfilled))
    }
}

/// Combine streamed and backfilled packets, sorted ascending by sequence.
///
/// Sequence numbers are unique in the result; on a clash the earliest packet
/// wins, so a streamed packet beats a backfilled one.
pub fn merge_packets(mut streamed: Vec<Packet>, backfilled: Vec<Packet>) -> Vec<Packet> {
    streamed.extend(backfilled);
    // stable sort keeps arrival order among equal sequences
    streamed.sort_by_key(|p| p.sequence);
    streamed.dedup_by_key(|p| p.sequence);
    streamed
}

/// Run one complete fetch against `config`.
pub fn fetch_all(config: &ClientConfig) -> Result<Vec<Packet>, ClientError> {
    FeedClient::new(config.clone()).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Side;

    fn packet(sequence: i32, quantity: i32) -> Packet {
        Packet {
            symbol: "MSFT".to_string(),
            side: Side::Sell,
            quantity,
            price: 250,
            sequence,
        }
    }

    fn sequences(packets: &[Packet]) -> Vec<i32> {
        packets.iter().map(|p| p.sequence).collect()
    }

    #[test]
    fn merge_sorts_unconditionally() {
        let merged = merge_packets(vec![packet(2, 1), packet(1, 1)], vec![]);
        assert_eq!(sequences(&merged), vec![1, 2]);
    }

    #[test]
    fn merge_inserts_backfill_in_order() {
        let merged = merge_packets(
            vec![packet(1, 1), packet(2, 1), packet(4, 1)],
            vec![packet(3, 1)],
        );
        assert_eq!(sequences(&merged), vec![1, 2, 3, 4]);
    }

    #[test]
    fn merge_drops_duplicate_sequences_keeping_streamed() {
        let merged = merge_packets(vec![packet(1, 10), packet(2, 10)], vec![packet(2, 99)]);
        assert_eq!(sequences(&merged), vec![1, 2]);
        assert_eq!(merged[1].quantity, 10);
    }

    #[test]
    fn merge_collapses_duplicates_within_stream() {
        let merged = merge_packets(vec![packet(3, 1), packet(1, 1), packet(3, 2)], vec![]);
        assert_eq!(sequences(&merged), vec![1, 3]);
        assert_eq!(merged[1].quantity, 1);
    }

    #[test]
    fn merge_empty() {
        assert!(merge_packets(vec![], vec![]).is_empty());
    }

    #[test]
    fn run_fails_when_server_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ClientConfig::from(listener.local_addr().unwrap());
        drop(listener);

        let mut client = FeedClient::new(config);
        assert!(matches!(client.run(), Err(ClientError::Connection(_))));
        assert_eq!(client.backfill_stats(), &BackfillStats::default());
    }
}
