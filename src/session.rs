//! Capture session: owns the pipeline and drives it over a frame source.
//!
//! One session runs single-threaded: the source delivers frames serially
//! and demultiplexing, reassembly, decoding, and event delivery all happen
//! inline on the calling thread. The only cross-thread handoff is the
//! cancellation token, polled between frames.
//!
//! Only fatal source errors surface to the caller; malformed frames, lane
//! corruption, and decode failures are logged and absorbed.

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    capture::{FramePoll, FrameSource, RawFrame},
    decode::{companion, game, hex, DecodeCx},
    demux::{Demultiplexer, Direction, Lane, Routed},
    diagnostics::{DiagnosticSink, NullSink},
    envelope,
    error::TapError,
    events::EventBus,
    reassembly::{LanePayload, LaneReassembler},
};

/// Lifecycle of a capture session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No source attached.
    Idle,
    /// Frames are being consumed.
    Running,
    /// Cancellation observed; the source is being closed.
    Stopping,
}

/// Tallies kept while a session runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames delivered by the source.
    pub frames_seen: u64,
    /// Frames that matched no routing rule.
    pub frames_dropped: u64,
    /// Complete payloads produced by the TCP reassemblers.
    pub payloads_reassembled: u64,
    /// Lane resets after corruption.
    pub lane_resets: u64,
    /// Payloads discarded because their outer envelope failed to parse.
    pub decode_errors: u64,
    /// Events published to subscribers.
    pub events_published: u64,
}

/// A configured capture pipeline.
///
/// Subscribe on [`events`](Self::events) before calling
/// [`run`](Self::run); the session borrows the bus for delivery while it
/// runs.
pub struct CaptureSession {
    bus: EventBus,
    sink: Box<dyn DiagnosticSink>,
    demux: Demultiplexer,
    lanes: [LaneReassembler; 3],
    state: SessionState,
    stats: SessionStats,
}

impl CaptureSession {
    /// Create a session with a no-op diagnostic sink.
    ///
    /// `companion` widens the port filter to include the companion-app
    /// stream.
    #[must_use]
    pub fn new(companion: bool) -> Self {
        Self::with_sink(companion, Box::new(NullSink))
    }

    /// Create a session storing unrecognised messages in `sink`.
    #[must_use]
    pub fn with_sink(companion: bool, sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            bus: EventBus::new(),
            sink,
            demux: Demultiplexer::new(companion),
            lanes: [
                LaneReassembler::new(Lane::GameInbound),
                LaneReassembler::new(Lane::CompanionOutbound),
                LaneReassembler::new(Lane::CompanionInbound),
            ],
            state: SessionState::Idle,
            stats: SessionStats::default(),
        }
    }

    /// Event surface for registering subscribers.
    pub fn events(&mut self) -> &mut EventBus { &mut self.bus }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState { self.state }

    /// Drive the pipeline until the source ends or `cancel` fires.
    ///
    /// Partial reassembly buffers are discarded on exit; nothing is
    /// flushed. The session returns to [`SessionState::Idle`] and can be
    /// run again with a fresh source.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::Source`] when the frame source fails fatally.
    /// Recoverable conditions never surface here.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        cancel: &CancellationToken,
    ) -> Result<SessionStats, TapError> {
        self.state = SessionState::Running;
        self.stats = SessionStats::default();
        let published_at_start = self.bus.published();

        let result = loop {
            if cancel.is_cancelled() {
                debug!("cancellation observed, stopping capture");
                break Ok(());
            }
            match source.next_frame() {
                Ok(FramePoll::Frame(frame)) => self.process_frame(&frame),
                Ok(FramePoll::Idle) => continue,
                Ok(FramePoll::End) => break Ok(()),
                Err(e) => break Err(TapError::Source(e)),
            }
        };

        self.state = SessionState::Stopping;
        for lane in &mut self.lanes {
            lane.reset();
        }
        self.stats.events_published = self.bus.published() - published_at_start;
        self.state = SessionState::Idle;

        result.map(|()| self.stats)
    }

    fn process_frame(&mut self, frame: &RawFrame) {
        self.stats.frames_seen += 1;
        crate::metrics::inc_frames_captured();

        let Some(routed) = self.demux.route(frame) else {
            self.stats.frames_dropped += 1;
            return;
        };

        match routed {
            Routed::Segment(segment) => {
                let lane = segment.lane;
                let mut payloads = Vec::new();
                let pushed = self.lanes[lane.index()].push(
                    segment.payload,
                    segment.sequence,
                    &mut payloads,
                );
                if let Err(e) = pushed {
                    warn!("lane corrupted, resetting: {e}");
                    self.stats.lane_resets += 1;
                    crate::metrics::inc_lane_resets(lane.as_str());
                    return;
                }
                for payload in payloads {
                    self.stats.payloads_reassembled += 1;
                    crate::metrics::inc_payloads_reassembled(lane.as_str());
                    self.dispatch_lane_payload(&payload);
                }
            }
            Routed::Datagram { direction, payload } => {
                match envelope::strip(direction, payload) {
                    Ok(body) => self.dispatch_datagram(direction, body),
                    Err(e) => {
                        warn!("dropping malformed {direction} datagram: {e}");
                        self.stats.frames_dropped += 1;
                    }
                }
            }
        }
    }

    fn dispatch_lane_payload(&mut self, payload: &LanePayload) {
        let mut cx = DecodeCx {
            bus: &mut self.bus,
            sink: self.sink.as_mut(),
        };
        let sequence = Some(payload.sequence);
        let result = match payload.lane {
            Lane::GameInbound => game::decode_inbound(&payload.bytes, sequence, &mut cx),
            Lane::CompanionOutbound => {
                companion::decode_outbound(&payload.bytes, sequence, &mut cx)
            }
            Lane::CompanionInbound => companion::decode_inbound(&payload.bytes, sequence, &mut cx),
        };
        if let Err(e) = result {
            warn!(
                "{}: {e}; payload {}",
                payload.lane,
                hex(&payload.bytes)
            );
            self.stats.decode_errors += 1;
            crate::metrics::inc_decode_errors();
        }
    }

    fn dispatch_datagram(&mut self, direction: Direction, body: &[u8]) {
        let mut cx = DecodeCx {
            bus: &mut self.bus,
            sink: self.sink.as_mut(),
        };
        let result = match direction {
            Direction::Inbound => game::decode_inbound(body, None, &mut cx),
            _ => game::decode_outbound(body, None, &mut cx),
        };
        if let Err(e) = result {
            warn!("{direction} datagram: {e}; body {}", hex(body));
            self.stats.decode_errors += 1;
            crate::metrics::inc_decode_errors();
        }
    }
}
