//! UDP envelope stripping.
//!
//! Inbound game datagrams carry a bare protobuf message and pass through
//! untouched. Outbound datagrams wrap the message in a short variable-length
//! header and append a 4-byte trailer (an opaque hash, discarded). The
//! header length is recovered by a heuristic on the first bytes.
//!
//! The heuristic is an empirically-derived compatibility surface and is
//! reproduced exactly; do not simplify the constants.

use thiserror::Error;

use crate::demux::Direction;

/// Length of the opaque trailer on every outbound datagram.
pub const TRAILER_LEN: usize = 4;

/// Default header length when the heuristic recognises the typical shape.
const DEFAULT_SKIP: usize = 5;

/// Protobuf wire tag for field 1, varint — the first byte of every known
/// embedded message.
const LEADING_TAG: u8 = 0x08;

/// Errors produced when locating the embedded message in a datagram.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The datagram is too short to hold the header and trailer.
    #[error("malformed outbound datagram: {len} bytes, need at least {needed}")]
    TooShort {
        /// Observed datagram length.
        len: usize,
        /// Minimum length implied by the recovered header.
        needed: usize,
    },
    /// The first byte encodes an impossible header length.
    #[error("malformed outbound datagram: header length byte {0:#04x} is invalid")]
    BadHeaderLength(u8),
}

/// Locate the embedded protobuf message inside a UDP payload.
///
/// Inbound payloads are returned unchanged. Outbound payloads lose their
/// variable-length header and the 4-byte trailer:
///
/// - default header length 5;
/// - `p[5] == 0x08` confirms the default (protobuf tag right after a
///   5-byte header, the typical case);
/// - else `p[0] == 0x08` means no header at all;
/// - else the first byte encodes the header length as `p[0] - 1`.
///
/// # Errors
///
/// Returns [`EnvelopeError`] when the datagram cannot hold the recovered
/// header plus trailer; the caller drops the datagram.
pub fn strip(direction: Direction, payload: &[u8]) -> Result<&[u8], EnvelopeError> {
    match direction {
        Direction::Outbound => strip_outbound(payload),
        _ => Ok(payload),
    }
}

fn strip_outbound(payload: &[u8]) -> Result<&[u8], EnvelopeError> {
    // Below the 5-byte default header plus trailer nothing can be embedded;
    // this also covers the p[5] probe.
    if payload.len() < DEFAULT_SKIP + TRAILER_LEN {
        return Err(EnvelopeError::TooShort {
            len: payload.len(),
            needed: DEFAULT_SKIP + TRAILER_LEN,
        });
    }

    let skip = if payload[DEFAULT_SKIP] == LEADING_TAG {
        DEFAULT_SKIP
    } else if payload[0] == LEADING_TAG {
        0
    } else {
        usize::from(payload[0])
            .checked_sub(1)
            .ok_or(EnvelopeError::BadHeaderLength(payload[0]))?
    };

    let needed = skip
        .checked_add(TRAILER_LEN)
        .ok_or(EnvelopeError::BadHeaderLength(payload[0]))?;
    if payload.len() < needed {
        return Err(EnvelopeError::TooShort {
            len: payload.len(),
            needed,
        });
    }

    Ok(&payload[skip..payload.len() - TRAILER_LEN])
}
