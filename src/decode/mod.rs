//! Message decoders sitting between framing and the event router.
//!
//! Each decoder parses one protocol direction and publishes typed events.
//! A failure to parse an outer envelope discards the whole payload and is
//! surfaced to the session for logging; a failure inside a single
//! sub-record is logged with the offending bytes in hex and never stops the
//! remaining records.

pub(crate) mod companion;
pub(crate) mod game;

use std::fmt::Write;

use thiserror::Error;

use crate::{diagnostics::DiagnosticSink, events::EventBus};

/// An outer envelope that could not be parsed.
///
/// The payload carrying it has been discarded; the lane itself is intact.
#[derive(Debug, Error)]
#[error("failed to parse {what} envelope: {source}")]
pub struct DecodeError {
    pub(crate) what: &'static str,
    #[source]
    pub(crate) source: prost::DecodeError,
}

/// Borrowed decoder context: the event router and the diagnostic sink.
pub(crate) struct DecodeCx<'a> {
    pub bus: &'a mut EventBus,
    pub sink: &'a mut dyn DiagnosticSink,
}

/// Render bytes as space-separated uppercase hex for decode-failure logs.
pub(crate) fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02X}");
    }
    out
}
