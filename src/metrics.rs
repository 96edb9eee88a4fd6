//! Metric helpers for `ridetap`.
//!
//! This module defines metric names and helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. All functions become no-ops
//! if the optional `metrics` Cargo feature is disabled.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking captured frames.
pub const FRAMES_CAPTURED: &str = "ridetap_frames_captured_total";
/// Name of the counter tracking reassembled lane payloads.
pub const PAYLOADS_REASSEMBLED: &str = "ridetap_payloads_reassembled_total";
/// Name of the counter tracking lane resets after corruption.
pub const LANE_RESETS: &str = "ridetap_lane_resets_total";
/// Name of the counter tracking message decode failures.
pub const DECODE_ERRORS: &str = "ridetap_decode_errors_total";
/// Name of the counter tracking published events.
pub const EVENTS_PUBLISHED: &str = "ridetap_events_published_total";

/// Record a captured frame.
#[cfg(feature = "metrics")]
pub fn inc_frames_captured() { counter!(FRAMES_CAPTURED).increment(1); }

#[cfg(not(feature = "metrics"))]
pub fn inc_frames_captured() {}

/// Record a completed lane payload for the given lane name.
#[cfg(feature = "metrics")]
pub fn inc_payloads_reassembled(lane: &'static str) {
    counter!(PAYLOADS_REASSEMBLED, "lane" => lane).increment(1);
}

#[cfg(not(feature = "metrics"))]
pub fn inc_payloads_reassembled(_lane: &'static str) {}

/// Record a lane reset caused by corruption.
#[cfg(feature = "metrics")]
pub fn inc_lane_resets(lane: &'static str) {
    counter!(LANE_RESETS, "lane" => lane).increment(1);
}

#[cfg(not(feature = "metrics"))]
pub fn inc_lane_resets(_lane: &'static str) {}

/// Record a message decode failure.
#[cfg(feature = "metrics")]
pub fn inc_decode_errors() { counter!(DECODE_ERRORS).increment(1); }

#[cfg(not(feature = "metrics"))]
pub fn inc_decode_errors() {}

/// Record a published event.
#[cfg(feature = "metrics")]
pub fn inc_events_published() { counter!(EVENTS_PUBLISHED).increment(1); }

#[cfg(not(feature = "metrics"))]
pub fn inc_events_published() {}
