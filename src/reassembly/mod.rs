//! Per-lane TCP payload reassembly.
//!
//! Each logical payload on a TCP lane is preceded by a 2-byte big-endian
//! length header, followed by exactly that many body bytes. Frames may be
//! fragmented across segments and several frames may be coalesced inside a
//! single segment, so the reassembler is a small state machine: it
//! accumulates raw stream bytes, emits every complete payload in order, and
//! drains overflow iteratively until fewer bytes than one frame remain.
//!
//! Completion is decided by byte count only. The TCP PUSH flag is never
//! consulted; it may be absent on the final segment of a large payload.

mod error;

use bytes::{Buf, BytesMut};

pub use error::ReassemblyError;

use crate::demux::Lane;

/// Length of the big-endian length prefix preceding each framed payload.
pub const LENGTH_PREFIX_LEN: usize = 2;

/// Declared frame lengths above this are treated as lane corruption.
///
/// A 2-byte prefix cannot exceed 64 KiB, so the default guard only fires
/// through [`LaneReassembler::with_max_frame_len`]; it is kept as a safety
/// rail should the prefix ever widen.
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// One complete framed message body recovered from a TCP lane.
///
/// The 2-byte length header has already been stripped. `sequence` is the
/// millisecond offset of the completing segment from the lane epoch, used
/// only as an opaque correlation id downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanePayload {
    pub lane: Lane,
    pub sequence: u32,
    pub bytes: Vec<u8>,
}

/// Per-lane reassembly state machine.
///
/// One instance per lane, owned exclusively by the pipeline thread. All
/// failures are recoverable by [`reset`](Self::reset); the reassembler
/// resets itself before surfacing an error so a corrupt lane never poisons
/// the rest of the capture session.
#[derive(Debug)]
pub struct LaneReassembler {
    lane: Lane,
    /// Raw stream bytes not yet emitted, including any not-yet-complete
    /// length prefix. Empty exactly when the lane is fresh.
    buf: BytesMut,
    /// Body length of the in-flight frame once its prefix has been read.
    want: Option<usize>,
    max_frame_len: usize,
}

impl LaneReassembler {
    /// Create a fresh reassembler for `lane`.
    #[must_use]
    pub fn new(lane: Lane) -> Self { Self::with_max_frame_len(lane, DEFAULT_MAX_FRAME_LEN) }

    /// Create a reassembler with an explicit corruption guard, used by
    /// tests to exercise the oversize path with small frames.
    #[must_use]
    pub fn with_max_frame_len(lane: Lane, max_frame_len: usize) -> Self {
        Self {
            lane,
            buf: BytesMut::new(),
            want: None,
            max_frame_len,
        }
    }

    /// Lane this reassembler serves.
    #[must_use]
    pub const fn lane(&self) -> Lane { self.lane }

    /// Whether the lane holds no partial frame.
    #[must_use]
    pub fn is_fresh(&self) -> bool { self.buf.is_empty() && self.want.is_none() }

    /// Feed one segment's payload, appending every completed frame body to
    /// `out` in stream order.
    ///
    /// A single segment may complete several frames (coalescing) or none
    /// (fragmentation). A segment shorter than the remaining length prefix
    /// is buffered until the prefix completes.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::FrameTooLarge`] when a declared length
    /// exceeds the configured maximum. The lane has already been reset to
    /// fresh state when this returns; the caller only needs to log.
    pub fn push(
        &mut self,
        payload: &[u8],
        sequence: u32,
        out: &mut Vec<LanePayload>,
    ) -> Result<(), ReassemblyError> {
        self.buf.extend_from_slice(payload);

        loop {
            let want = match self.want {
                Some(want) => want,
                None => {
                    if self.buf.len() < LENGTH_PREFIX_LEN {
                        // Length not yet known; wait for more bytes.
                        return Ok(());
                    }
                    let declared = usize::from(u16::from_be_bytes([self.buf[0], self.buf[1]]));
                    self.buf.advance(LENGTH_PREFIX_LEN);
                    if declared > self.max_frame_len {
                        self.reset();
                        return Err(ReassemblyError::FrameTooLarge {
                            lane: self.lane,
                            declared,
                            limit: self.max_frame_len,
                        });
                    }
                    *self.want.insert(declared)
                }
            };

            if self.buf.len() < want {
                return Ok(());
            }

            let bytes = self.buf.split_to(want).freeze().to_vec();
            self.want = None;
            out.push(LanePayload {
                lane: self.lane,
                sequence,
                bytes,
            });

            if self.buf.is_empty() {
                // Drop the empty accumulator's capacity between frames.
                self.buf = BytesMut::new();
                return Ok(());
            }
        }
    }

    /// Force the lane back to fresh state, discarding any partial frame.
    pub fn reset(&mut self) {
        self.buf = BytesMut::new();
        self.want = None;
    }
}
