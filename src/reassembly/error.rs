//! Error types for lane reassembly.

use thiserror::Error;

use crate::demux::Lane;

/// Errors produced by [`LaneReassembler`](super::LaneReassembler).
///
/// Every variant is recoverable: the reassembler resets the lane before
/// returning, so the caller logs and continues with the next segment.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// A length prefix declared a frame beyond the corruption guard.
    #[error("{lane}: declared frame of {declared} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge {
        /// Lane that observed the oversize prefix.
        lane: Lane,
        /// Length the prefix declared.
        declared: usize,
        /// Configured maximum frame length.
        limit: usize,
    },
}
