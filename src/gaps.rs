use std::collections::HashSet;

use crate::config::ClientConfig;
use crate::session::Session;
use crate::wire::{ClientError, Packet};

/// ------------------------------------------------------------
/// Policy
/// ------------------------------------------------------------
/// Largest sequence a resend request can carry (one payload byte).
pub const MAX_RESEND_SEQUENCE: i32 = u8::MAX as i32;

/// Upper bound of the gap search.
///
/// The highest observed sequence is assumed to be the true end of the stream
/// and is never itself treated as missing. This is a protocol assumption:
/// packets dropped after the last one received cannot be detected.
pub fn trusted_upper_bound(observed: &[i32]) -> Option<i32> {
    observed.iter().copied().max()
}

/// Gaps below the trusted upper bound, split by whether a resend can name them.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct GapSearch {
    /// Absent sequences in `[1, min(H-1, MAX_RESEND_SEQUENCE)]`, ascending.
    pub requestable: Vec<i32>,
    /// Count of absent sequences in `(MAX_RESEND_SEQUENCE, H-1]`.
    pub unaddressable: u64,
}

impl GapSearch {
    pub fn is_empty(&self) -> bool {
        self.requestable.is_empty() && self.unaddressable == 0
    }
}

/// Every absent sequence in `[1, H-1]`.
///
/// Only gaps that fit a resend request are enumerated; the rest are counted,
/// so the cost is bounded by `MAX_RESEND_SEQUENCE` and the input size.
pub fn missing_sequences(observed: &[i32]) -> GapSearch {
    let Some(high) = trusted_upper_bound(observed) else {
        return GapSearch::default();
    };
    let seen: HashSet<i32> = observed.iter().copied().collect();
    let search_high = high.min(MAX_RESEND_SEQUENCE + 1);
    GapSearch {
        requestable: (1..search_high).filter(|s| !seen.contains(s)).collect(),
        unaddressable: count_unaddressable(&seen, high),
    }
}

/// Gaps in `(MAX_RESEND_SEQUENCE, high)` that no request can name.
fn count_unaddressable(seen: &HashSet<i32>, high: i32) -> u64 {
    let first = i64::from(MAX_RESEND_SEQUENCE) + 1;
    let last = i64::from(high) - 1;
    if last < first {
        return 0;
    }
    let seen_in_range = seen
        .iter()
        .filter(|&&s| i64::from(s) >= first && i64::from(s) <= last)
        .count() as i64;
    (last - first + 1 - seen_in_range) as u64
}

/// ------------------------------------------------------------
/// Stats
/// ------------------------------------------------------------
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BackfillStats {
    pub requested: u64,     // resend sessions issued
    pub recovered: u64,     // sessions that returned a packet
    pub dropped: u64,       // no answer or connection failure
    pub unaddressable: u64, // gaps above MAX_RESEND_SEQUENCE
}

/// ------------------------------------------------------------
/// Backend type alias
/// ------------------------------------------------------------
/// Fetches one sequence. `Ok(None)` means the server had nothing to send.
pub type ResendFn = dyn FnMut(u8) -> Result<Option<Packet>, ClientError>;

/// Fetch a single packet over its own connection.
pub fn resend_over_network(
    config: &ClientConfig,
    sequence: u8,
) -> Result<Option<Packet>, ClientError> {
    let frame = Session::open(config)?.resend(sequence)?;
    Ok(frame.map(|f| Packet::decode(&f)))
}

/// ------------------------------------------------------------
/// Gap Resolver
/// ------------------------------------------------------------
pub struct GapResolver {
    config: ClientConfig,
    backend: Option<Box<ResendFn>>,
    stats: BackfillStats,
}

impl GapResolver {
    /// Resolver that opens one fresh connection per missing sequence.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            backend: None,
            stats: BackfillStats::default(),
        }
    }

    /// Resolver with a mock backend
    pub fn with_backend(backend: Box<ResendFn>) -> Self {
        Self {
            config: ClientConfig::default(),
            backend: Some(backend),
            stats: BackfillStats::default(),
        }
    }

    /// Counters accumulated over every `resolve` call.
    pub fn stats(&self) -> &BackfillStats {
        &self.stats
    }

    /// Request every missing sequence once, serially.
    ///
    /// Failures are not escalated: a sequence whose resend errors or returns
    /// nothing is left out of the result.
    pub fn resolve(&mut self, observed: &[i32]) -> Vec<Packet> {
        let gaps = missing_sequences(observed);
        if gaps.is_empty() {
            return Vec::new();
        }
        if gaps.unaddressable > 0 {
            log::debug!(
                "{} missing sequences above {} cannot be requested",
                gaps.unaddressable,
                MAX_RESEND_SEQUENCE
            );
        }
        self.stats.unaddressable += gaps.unaddressable;

        let mut recovered = Vec::new();
        for sequence in gaps.requestable {
            // requestable never exceeds MAX_RESEND_SEQUENCE
            let Ok(seq_byte) = u8::try_from(sequence) else {
                continue;
            };
            self.stats.requested += 1;
            match self.fetch(seq_byte) {
                Ok(Some(packet)) => {
                    if packet.sequence != sequence {
                        log::debug!(
                            "resend for {} answered with sequence {}",
                            sequence,
                            packet.sequence
                        );
                    }
                    self.stats.recovered += 1;
                    recovered.push(packet);
                }
                Ok(None) => {
                    self.stats.dropped += 1;
                    log::debug!("no answer for sequence {}", sequence);
                }
                Err(e) => {
                    self.stats.dropped += 1;
                    log::debug!("resend for sequence {} failed: {}", sequence, e);
                }
            }
        }

        log::info!(
            "backfill recovered {} of {} requested sequences",
            self.stats.recovered,
            self.stats.requested
        );
        recovered
    }

    fn fetch(&mut self, sequence: u8) -> Result<Option<Packet>, ClientError> {
        match &mut self.backend {
            Some(backend) => backend(sequence),
            None => resend_over_network(&self.config, sequence),
        }
    }
}
