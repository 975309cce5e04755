//! Wire-format definitions for requests and response frames.
//!
//! No I/O happens here, only byte layout.
//!
//! # Wire format
//!
//! All multi-byte integers are **big-endian**.
//!
//! Request (client → server), [`REQUEST_LEN`] = 2 bytes:
//!
//! ```text
//! +-----------+-----------+
//! | call type | resendSeq |
//! +-----------+-----------+
//! ```
//!
//! Response frame (server → client), [`FRAME_LEN`] = 17 bytes:
//!
//! ```text
//!  0       4    5          9          13         17
//! +-------+----+----------+----------+----------+
//! |symbol |side| quantity |  price   | sequence |
//! +-------+----+----------+----------+----------+
//! ```

use std::fmt;
use thiserror::Error;

/// Byte length of an outbound request.
pub const REQUEST_LEN: usize = 2;

/// Byte length of every response frame on the wire.
pub const FRAME_LEN: usize = 17;

// Byte offsets of each field within a response frame.
const OFF_SYMBOL: usize = 0;
const OFF_SIDE: usize = 4;
const OFF_QUANTITY: usize = 5;
const OFF_PRICE: usize = 9;
const OFF_SEQUENCE: usize = 13;

/// One raw response frame, owned.
pub type Frame = [u8; FRAME_LEN];

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    /// Ask the server for every packet it has, then close.
    StreamAll = 1,
    /// Ask the server for exactly one packet by sequence number.
    Resend = 2,
}

impl CallType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(CallType::StreamAll),
            2 => Some(CallType::Resend),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub call_type: CallType,
    pub resend_seq: u8,
}

impl Request {
    pub fn stream_all() -> Self {
        Self {
            call_type: CallType::StreamAll,
            resend_seq: 0,
        }
    }

    pub fn resend(sequence: u8) -> Self {
        Self {
            call_type: CallType::Resend,
            resend_seq: sequence,
        }
    }

    pub fn encode(&self) -> [u8; REQUEST_LEN] {
        encode_request(self.call_type.to_u8(), self.resend_seq)
    }
}

/// Lay out a request as `[call_type, resend_seq]`.
///
/// No validation beyond the type width; callers pass valid values.
pub fn encode_request(call_type: u8, resend_seq: u8) -> [u8; REQUEST_LEN] {
    [call_type, resend_seq]
}

/// Buy/sell indicator. Bytes other than `'B'` and `'S'` pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
    Other(u8),
}

impl Side {
    pub fn from_u8(value: u8) -> Self {
        match value {
            b'B' => Side::Buy,
            b'S' => Side::Sell,
            other => Side::Other(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => b'B',
            Side::Sell => b'S',
            Side::Other(v) => v,
        }
    }

    pub fn as_char(self) -> char {
        char::from(self.to_u8())
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A decoded response frame.
///
/// Numeric fields are in host byte order; [`Packet::encode`] converts to
/// big-endian on the wire and [`Packet::decode`] converts back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Four symbol bytes, verbatim (padding and NULs are kept).
    pub symbol: String,
    pub side: Side,
    pub quantity: i32,
    pub price: i32,
    /// 1-based position in the server's full stream.
    pub sequence: i32,
}

impl Packet {
    /// Parse a packet from one complete frame. Infallible: every field is
    /// fixed-width and no value is rejected.
    pub fn decode(frame: &Frame) -> Self {
        let symbol = String::from_utf8_lossy(&frame[OFF_SYMBOL..OFF_SIDE]).into_owned();
        Packet {
            symbol,
            side: Side::from_u8(frame[OFF_SIDE]),
            quantity: read_i32_be(frame, OFF_QUANTITY),
            price: read_i32_be(frame, OFF_PRICE),
            sequence: read_i32_be(frame, OFF_SEQUENCE),
        }
    }

    /// Parse a packet from a slice that must be exactly [`FRAME_LEN`] bytes.
    pub fn decode_slice(buf: &[u8]) -> Result<Self, ClientError> {
        let frame: &Frame = buf.try_into().map_err(|_| {
            ClientError::Decode(format!(
                "expected {} byte frame, got {}",
                FRAME_LEN,
                buf.len()
            ))
        })?;
        Ok(Self::decode(frame))
    }

    /// Serialise into a wire frame. Symbols shorter than four bytes are padded
    /// with spaces, longer ones truncated.
    pub fn encode(&self) -> Frame {
        let mut buf = [0u8; FRAME_LEN];
        let mut symbol = [b' '; 4];
        for (dst, src) in symbol.iter_mut().zip(self.symbol.bytes()) {
            *dst = src;
        }
        buf[OFF_SYMBOL..OFF_SIDE].copy_from_slice(&symbol);
        buf[OFF_SIDE] = self.side.to_u8();
        buf[OFF_QUANTITY..OFF_QUANTITY + 4].copy_from_slice(&self.quantity.to_be_bytes());
        buf[OFF_PRICE..OFF_PRICE + 4].copy_from_slice(&self.price.to_be_bytes());
        buf[OFF_SEQUENCE..OFF_SEQUENCE + 4].copy_from_slice(&self.sequence.to_be_bytes());
        buf
    }
}

fn read_i32_be(frame: &Frame, offset: usize) -> i32 {
    i32::from_be_bytes([
        frame[offset],
        frame[offset + 1],
        frame[offset + 2],
        frame[offset + 3],
    ])
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Received Packet - Symbol: {}, Buy/Sell: {}, Quantity: {}, Price: {}, Sequence: {}",
            self.symbol, self.side, self.quantity, self.price, self.sequence
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Invalid frame: {0}")]
    Decode(String),
    #[error("Timeout")]
    Timeout,
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            // A read timeout surfaces as WouldBlock on unix.
            ErrorKind::TimedOut | ErrorKind::WouldBlock => ClientError::Timeout,
            _ => ClientError::Io(err.to_string()),
        }
    }
}
