//! Game-protocol decoding (C5): player states and update records.

use log::{debug, warn};
use prost::Message;

use super::{hex, DecodeCx, DecodeError};
use crate::{
    demux::Direction,
    events::{
        ChatEvent,
        EventPositionsEvent,
        MeetupEvent,
        PlayerEnteredWorldEvent,
        PlayerStateEvent,
        RideOnEvent,
        TimeSyncEvent,
    },
    proto::{
        ChatMessage,
        ClientToServer,
        Meetup,
        PlayerEnteredWorld,
        PlayerUpdate,
        RideOn,
        ServerToClient,
        TimeSync,
    },
};

/// Update-type tags whose payloads are understood to exist but not yet
/// mapped to a schema. Recorded for diagnostics, no event.
const OPAQUE_UPDATE_TYPES: [u32; 5] = [102, 106, 109, 110, 116];

/// Decode an outbound game envelope (desktop → server).
///
/// Carries at most one player state, the local rider's.
pub(crate) fn decode_outbound(
    bytes: &[u8],
    sequence: Option<u32>,
    cx: &mut DecodeCx<'_>,
) -> Result<(), DecodeError> {
    let envelope = ClientToServer::decode(bytes).map_err(|source| DecodeError {
        what: "client-to-server",
        source,
    })?;

    if let Some(state) = envelope.state {
        cx.bus.publish_outgoing_player_state(&PlayerStateEvent {
            direction: Direction::Outbound,
            sequence,
            state,
        });
    }
    Ok(())
}

/// Decode an inbound game envelope (server → desktop).
///
/// Emits one event per player state, the optional event-position block, and
/// one event per recognised player-update record. A record that fails to
/// parse is logged in hex and skipped; the remaining records still decode.
pub(crate) fn decode_inbound(
    bytes: &[u8],
    sequence: Option<u32>,
    cx: &mut DecodeCx<'_>,
) -> Result<(), DecodeError> {
    let envelope = ServerToClient::decode(bytes).map_err(|source| DecodeError {
        what: "server-to-client",
        source,
    })?;

    for state in envelope.player_states {
        cx.bus.publish_incoming_player_state(&PlayerStateEvent {
            direction: Direction::Inbound,
            sequence,
            state,
        });
    }

    if let Some(positions) = envelope.event_positions {
        cx.bus.publish_event_positions(&EventPositionsEvent {
            direction: Direction::Inbound,
            sequence,
            positions,
        });
    }

    for update in &envelope.player_updates {
        dispatch_update(update, sequence, cx);
    }
    Ok(())
}

/// Re-parse one update record by its tag and publish the matching event.
fn dispatch_update(update: &PlayerUpdate, sequence: Option<u32>, cx: &mut DecodeCx<'_>) {
    let payload = update.payload.as_slice();
    match update.update_type {
        3 => {
            if let Some(time_sync) = parse_record::<TimeSync>("time sync", payload) {
                cx.bus.publish_player_time_sync(&TimeSyncEvent {
                    direction: Direction::Inbound,
                    sequence,
                    time_sync,
                });
            }
        }
        4 => {
            if let Some(ride_on) = parse_record::<RideOn>("ride on", payload) {
                cx.bus.publish_ride_on_given(&RideOnEvent {
                    direction: Direction::Inbound,
                    sequence,
                    ride_on,
                });
            }
        }
        5 => {
            if let Some(chat) = parse_record::<ChatMessage>("chat", payload) {
                cx.bus.publish_chat_message(&ChatEvent {
                    direction: Direction::Inbound,
                    sequence,
                    chat,
                });
            }
        }
        6 | 10 => {
            if let Some(meetup) = parse_record::<Meetup>("meetup", payload) {
                cx.bus.publish_meetup_update(&MeetupEvent {
                    direction: Direction::Inbound,
                    sequence,
                    meetup,
                });
            }
        }
        105 => {
            if let Some(player) = parse_record::<PlayerEnteredWorld>("entered world", payload) {
                cx.bus.publish_player_entered_world(&PlayerEnteredWorldEvent {
                    direction: Direction::Inbound,
                    sequence,
                    player,
                });
            }
        }
        tag if OPAQUE_UPDATE_TYPES.contains(&tag) => {
            debug!("opaque player update type {tag}, {} bytes", payload.len());
            cx.sink.store(
                &format!("player-update-{tag}"),
                payload,
                Direction::Inbound,
                sequence,
            );
        }
        tag => {
            warn!("unknown player update type {tag}: {}", hex(payload));
            cx.sink.store(
                &format!("player-update-{tag}"),
                payload,
                Direction::Inbound,
                sequence,
            );
        }
    }
}

/// Parse one sub-record, logging the bytes in hex on failure.
fn parse_record<M: Message + Default>(what: &'static str, payload: &[u8]) -> Option<M> {
    match M::decode(payload) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("{what} record failed to parse: {e}; payload {}", hex(payload));
            crate::metrics::inc_decode_errors();
            None
        }
    }
}

#[cfg(test)]
mod tests;
