//! Fatal session error types.
//!
//! Only errors that terminate a capture session live here. Recoverable
//! conditions (malformed frames, lane corruption, decode failures) are
//! absorbed and logged inside the pipeline per the error-handling policy.

use std::path::PathBuf;

use thiserror::Error;

use crate::capture::SourceError;

/// Top-level error type for opening and running a capture session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TapError {
    /// No interface matched the selection string.
    #[error("no capture interface matches {selector:?}")]
    InterfaceNotFound {
        /// Selector as provided by the caller (name, IPv4, or display name).
        selector: String,
    },
    /// The host has no interface with an assigned address to default to.
    #[error("no capture interface with an assigned address")]
    NoUsableInterface,
    /// The interface exists but the capture channel could not be opened.
    ///
    /// Typically insufficient privilege; capturing requires `CAP_NET_RAW`
    /// or root on most systems.
    #[error("failed to open capture on {interface}: {source}")]
    CaptureOpen {
        /// Interface name the open was attempted on.
        interface: String,
        #[source]
        source: std::io::Error,
    },
    /// The capture file for replay does not exist.
    #[error("capture file not found: {path}")]
    CaptureFileNotFound {
        /// Path as provided by the caller.
        path: PathBuf,
    },
    /// The frame source failed mid-session.
    #[error("frame source failed: {0}")]
    Source(#[from] SourceError),
}

/// Result type alias used by session-level operations.
pub type Result<T> = std::result::Result<T, TapError>;
