//! One TCP connection carrying exactly one request.
//!
//! The protocol never reuses a connection: each request opens a fresh
//! [`Session`], sends two bytes, reads until the server closes and drops the
//! socket. Both request methods take `self` so a session cannot be reused.

use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::reader::{read_frame, read_frames};
use crate::wire::{ClientError, Frame, Request};

#[derive(Debug)]
pub struct Session {
    stream: TcpStream,
}

impl Session {
    /// Connect to the configured server. No retry.
    pub fn open(config: &ClientConfig) -> Result<Self, ClientError> {
        let addr = config.socket_addr()?;
        // std rejects zero durations; zero means no timeout
        let nonzero = |t: Option<Duration>| t.filter(|d| !d.is_zero());
        let stream = match nonzero(config.connect_timeout) {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(|e| ClientError::Connection(format!("{}: {}", addr, e)))?;

        stream.set_read_timeout(nonzero(config.read_timeout))?;
        stream.set_write_timeout(nonzero(config.write_timeout))?;
        Ok(Self { stream })
    }

    /// Send a stream-all request and collect every frame until the server closes.
    pub fn stream_all(mut self) -> Result<Vec<Frame>, ClientError> {
        self.send(Request::stream_all())?;
        let frames = read_frames(&mut self.stream);
        self.close();
        frames
    }

    /// Ask for a single sequence. `Ok(None)` when the server sends nothing.
    pub fn resend(mut self, sequence: u8) -> Result<Option<Frame>, ClientError> {
        self.send(Request::resend(sequence))?;
        let frame = read_frame(&mut self.stream);
        self.close();
        frame
    }

    fn send(&mut self, request: Request) -> Result<(), ClientError> {
        let bytes = request.encode();
        let result = self
            .stream
            .write_all(&bytes)
            .and_then(|_| self.stream.flush());
        if let Err(e) = result {
            self.close();
            return Err(ClientError::from(e));
        }
        log::debug!(
            "Sent request: CallType={}, ResendSeq={}",
            bytes[0],
            bytes[1]
        );
        Ok(())
    }

    fn close(&self) {
        // Peer may already have closed; nothing to report.
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
