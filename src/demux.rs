//! L3/L4 demultiplexer: classifies captured frames into pipeline lanes.
//!
//! Each frame is parsed down to its transport header and routed to exactly
//! one sink by `(protocol, port)`. TCP segments are stamped with a derived
//! per-lane sequence number: the millisecond offset from the first segment
//! observed on that lane. The sequence number is an opaque correlation id
//! downstream, never a reordering key.

use std::{fmt, time::Duration};

use etherparse::{SlicedPacket, TransportSlice};
use log::{debug, warn};

use crate::{
    capture::{LinkLayer, RawFrame},
    ports::{COMPANION_TCP_PORT, GAME_TCP_PORT, GAME_UDP_PORT},
};

/// Traffic direction relative to the desktop simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the desktop (server → game, or desktop-bound companion data).
    Inbound,
    /// Away from the desktop (game → server, or companion app → desktop).
    Outbound,
    /// Direction could not be established.
    Unknown,
}

impl Direction {
    /// Stable lowercase name for logs, metrics, and dump filenames.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
            Direction::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One directional TCP reassembly context keyed by `(protocol, side, role)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Game server → desktop stream on the game TCP port.
    GameInbound,
    /// Companion app → desktop stream on the companion port.
    CompanionOutbound,
    /// Desktop → companion app stream on the companion port.
    CompanionInbound,
}

impl Lane {
    /// Direction tag attached to events decoded from this lane.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Lane::GameInbound | Lane::CompanionInbound => Direction::Inbound,
            Lane::CompanionOutbound => Direction::Outbound,
        }
    }

    /// Stable lowercase name for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Lane::GameInbound => "game-inbound",
            Lane::CompanionOutbound => "companion-outbound",
            Lane::CompanionInbound => "companion-inbound",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Lane::GameInbound => 0,
            Lane::CompanionOutbound => 1,
            Lane::CompanionInbound => 2,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One TCP segment routed to a reassembly lane.
///
/// Owned by the demultiplexer for the duration of one dispatch; the payload
/// borrows from the captured frame.
#[derive(Debug)]
pub struct Segment<'a> {
    pub lane: Lane,
    /// Millisecond offset from the first segment seen on this lane.
    pub sequence: u32,
    /// TCP PUSH flag, carried for diagnostics only. Reassembly completion
    /// is decided by byte count, never by this flag.
    pub push: bool,
    /// TCP ACK flag, carried for diagnostics only.
    pub ack: bool,
    pub payload: &'a [u8],
}

/// Routing outcome for one captured frame.
#[derive(Debug)]
pub enum Routed<'a> {
    /// A TCP segment bound for one of the three reassembly lanes.
    Segment(Segment<'a>),
    /// A UDP datagram bound for the envelope stripper.
    Datagram {
        direction: Direction,
        payload: &'a [u8],
    },
}

/// Stateful frame classifier.
///
/// Holds the per-lane epochs used to derive segment sequence numbers. One
/// instance lives for the capture session; lanes keep their epoch across
/// reassembler resets.
#[derive(Debug)]
pub struct Demultiplexer {
    companion: bool,
    epochs: [Option<Duration>; 3],
}

impl Demultiplexer {
    /// Create a classifier. `companion` widens the port filter to include
    /// the companion-app stream, mirroring the optional capture filter.
    #[must_use]
    pub fn new(companion: bool) -> Self {
        Self {
            companion,
            epochs: [None; 3],
        }
    }

    /// Classify one frame, returning its routing or `None` when dropped.
    ///
    /// Rules are evaluated in order: game TCP inbound, game TCP outbound
    /// (dropped, never carries payload), companion TCP both ways, game UDP
    /// both ways, everything else dropped silently.
    pub fn route<'a>(&mut self, frame: &'a RawFrame) -> Option<Routed<'a>> {
        let sliced = match frame.link {
            LinkLayer::Ethernet => SlicedPacket::from_ethernet(&frame.data),
            LinkLayer::Ip => SlicedPacket::from_ip(&frame.data),
        };
        let sliced = match sliced {
            Ok(s) => s,
            Err(e) => {
                warn!("dropping unparseable frame: {e:?}");
                return None;
            }
        };

        match sliced.transport {
            Some(TransportSlice::Tcp(tcp)) => {
                let lane = self.classify_tcp(tcp.source_port(), tcp.destination_port())?;
                let sequence = self.sequence_for(lane, frame.captured_at);
                Some(Routed::Segment(Segment {
                    lane,
                    sequence,
                    push: tcp.psh(),
                    ack: tcp.ack(),
                    payload: tcp.payload(),
                }))
            }
            Some(TransportSlice::Udp(udp)) => {
                let direction = if udp.source_port() == GAME_UDP_PORT {
                    Direction::Inbound
                } else if udp.destination_port() == GAME_UDP_PORT {
                    Direction::Outbound
                } else {
                    return None;
                };
                Some(Routed::Datagram {
                    direction,
                    payload: udp.payload(),
                })
            }
            _ => None,
        }
    }

    fn classify_tcp(&self, src: u16, dst: u16) -> Option<Lane> {
        if src == GAME_TCP_PORT {
            return Some(Lane::GameInbound);
        }
        if dst == GAME_TCP_PORT {
            // Handshake and ACK-only traffic towards the server.
            debug!("dropping outbound game TCP segment");
            return None;
        }
        if self.companion {
            if src == COMPANION_TCP_PORT {
                return Some(Lane::CompanionOutbound);
            }
            if dst == COMPANION_TCP_PORT {
                return Some(Lane::CompanionInbound);
            }
        }
        None
    }

    /// Millisecond offset from the lane epoch, set on first sight.
    fn sequence_for(&mut self, lane: Lane, captured_at: Duration) -> u32 {
        let epoch = *self.epochs[lane.index()].get_or_insert(captured_at);
        let elapsed = captured_at.saturating_sub(epoch);
        u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX)
    }
}
