//! Frame assembly over a blocking byte stream.
//!
//! TCP gives no message boundaries, so a single `read` may return part of a
//! frame or the tail of one frame and the head of the next. Bytes are
//! accumulated until a full [`FRAME_LEN`] frame exists, then copied into an
//! owned [`Frame`]. Contents are never interpreted here.

use std::io::{ErrorKind, Read};

use crate::wire::{ClientError, Frame, FRAME_LEN};

/// Outcome of filling one frame buffer.
enum Fill {
    Complete,
    /// Peer closed after this many bytes of the frame.
    Eof(usize),
}

fn fill_frame<R: Read>(reader: &mut R, buf: &mut Frame) -> Result<Fill, ClientError> {
    let mut filled = 0;
    while filled < FRAME_LEN {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(Fill::Eof(filled)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ClientError::from(e)),
        }
    }
    Ok(Fill::Complete)
}

/// Read frames until the peer closes the stream.
///
/// An empty result is valid. A trailing partial frame is discarded.
pub fn read_frames<R: Read>(reader: &mut R) -> Result<Vec<Frame>, ClientError> {
    let mut frames = Vec::new();
    loop {
        // Fresh buffer per frame; nothing stored aliases a later read.
        let mut buf = [0u8; FRAME_LEN];
        match fill_frame(reader, &mut buf)? {
            Fill::Complete => frames.push(buf),
            Fill::Eof(0) => break,
            Fill::Eof(partial) => {
                log::warn!(
                    "stream closed mid-frame, discarding {} of {} bytes",
                    partial,
                    FRAME_LEN
                );
                break;
            }
        }
    }
    log::debug!("read {} frames", frames.len());
    Ok(frames)
}

/// Read at most one frame. `None` if the peer closes before a full frame.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Frame>, ClientError> {
    let mut buf = [0u8; FRAME_LEN];
    match fill_frame(reader, &mut buf)? {
        Fill::Complete => Ok(Some(buf)),
        Fill::Eof(0) => Ok(None),
        Fill::Eof(partial) => {
            log::warn!("single-frame response truncated at {} bytes", partial);
            Ok(None)
        }
    }
}
