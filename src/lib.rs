//! `feed-client` — fetches a fixed-frame market data stream over TCP and
//! backfills sequence gaps.
//!
//! # Architecture
//!
//! ```text
//!  ┌────────────┐  stream-all   ┌──────────┐
//!  │ FeedClient │──────────────▶│ Session  │──▶ reader ──▶ wire
//!  └─────┬──────┘               └──────────┘
//!        │ observed sequences        ▲
//!  ┌─────▼──────┐  one resend per gap │
//!  │GapResolver │─────────────────────┘
//!  └────────────┘
//! ```
//!
//! - [`wire`]    — request/frame layout and [`ClientError`]
//! - [`reader`]  — assembles 17-byte frames from a blocking stream
//! - [`session`] — one connection, one request
//! - [`gaps`]    — gap detection and serial backfill
//! - [`client`]  — full fetch, merge and sort
//! - [`config`]  — server address and optional timeouts

pub mod client;
pub mod config;
pub mod gaps;
pub mod reader;
pub mod session;
pub mod wire;

pub use client::{fetch_all, merge_packets, FeedClient};
pub use config::ClientConfig;
pub use gaps::{missing_sequences, BackfillStats, GapResolver, GapSearch};
pub use wire::{ClientError, Packet, Side};
