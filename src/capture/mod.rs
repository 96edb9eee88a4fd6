//! Frame sources feeding the pipeline.
//!
//! A [`FrameSource`] yields link-layer frames in capture order with a
//! monotonically increasing capture timestamp. Two implementations exist:
//! a live interface tap ([`live::LiveSource`]) and a pcap/pcapng replay
//! ([`replay::ReplaySource`]). Both feed the identical pipeline; all I/O is
//! confined to this module.

pub mod live;
pub mod replay;

use std::time::Duration;

use thiserror::Error;

/// Link layer of a captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkLayer {
    /// Ethernet II framing; the demultiplexer parses from the MAC header.
    Ethernet,
    /// Bare IP packets (pcap `RAW`/`IPV4`/`IPV6` link types).
    Ip,
}

/// One captured link-layer frame.
///
/// `captured_at` is an offset from an arbitrary per-source origin (process
/// start for live capture, the capture file epoch for replay). Only
/// differences between timestamps are meaningful downstream.
#[derive(Clone, Debug)]
pub struct RawFrame {
    pub link: LinkLayer,
    pub data: Vec<u8>,
    pub captured_at: Duration,
}

/// Outcome of polling a source for the next frame.
#[derive(Debug)]
pub enum FramePoll {
    /// A frame was captured.
    Frame(RawFrame),
    /// The read timed out with nothing captured; poll cancellation and retry.
    Idle,
    /// The source is exhausted (end of capture file).
    End,
}

/// Pull contract for captured frames.
///
/// Sources deliver frames serially; the pipeline runs inline on the calling
/// thread. Errors returned here are fatal to the capture session.
pub trait FrameSource {
    /// Return the next captured frame, an idle tick, or end of stream.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the underlying capture device or file
    /// fails in a way the session cannot recover from.
    fn next_frame(&mut self) -> Result<FramePoll, SourceError>;
}

/// Errors produced by [`FrameSource`] implementations.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The capture device returned an I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The capture file could not be parsed.
    #[error("capture parse error: {0}")]
    Parse(String),
}
