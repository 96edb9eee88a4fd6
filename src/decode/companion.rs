//! Companion-protocol decoding (C6): commands, buttons, and activity data.

use log::{debug, warn};
use prost::Message;

use super::{hex, DecodeCx, DecodeError};
use crate::{
    commands::CompanionCommand,
    demux::Direction,
    events::{
        ActivityEvent,
        ActivityPhase,
        ClockSyncEvent,
        CommandAvailableEvent,
        CommandSentEvent,
        DeviceInfoEvent,
        HeartBeatEvent,
        PowerUpEvent,
        RiderPositionEvent,
    },
    proto::{ActivityDetails, DesktopItem, DesktopMessage, RiderMessage},
};

/// App-to-desktop payloads at or below this size are keep-alives.
const HEART_BEAT_MAX_LEN: usize = 10;

/// Detail-data tag marking a device description.
const DATA_DEVICE_INFO: u32 = 4;
/// Detail-data tag marking the end of a recorded activity.
const DATA_ACTIVITY_ENDED: u32 = 15;

/// Rider group carrying the local rider's position fix.
const LOCAL_RIDER_GROUP: u32 = 10;

/// Item types that are empty or filler on current clients.
const IGNORED_ITEM_TYPES: [u32; 4] = [1, 3, 6, 9];

/// Detail types understood to exist but not yet mapped to a schema.
const OPAQUE_DETAILS_TYPES: [u32; 7] = [6, 7, 10, 18, 20, 21, 23];

/// Decode an app-to-desktop companion payload.
///
/// Short payloads are heartbeats; an envelope without a detail block and
/// with `tag10 == 0` is a wall-clock sync; everything else dispatches on
/// the detail type.
pub(crate) fn decode_outbound(
    bytes: &[u8],
    sequence: Option<u32>,
    cx: &mut DecodeCx<'_>,
) -> Result<(), DecodeError> {
    if bytes.len() <= HEART_BEAT_MAX_LEN {
        cx.bus.publish_heart_beat(&HeartBeatEvent {
            direction: Direction::Outbound,
            sequence,
        });
        return Ok(());
    }

    let message = RiderMessage::decode(bytes).map_err(|source| DecodeError {
        what: "rider-message",
        source,
    })?;

    let Some(detail) = message.detail else {
        if message.tag10.unwrap_or_default() == 0 {
            if let Some(clock) = message.clock {
                cx.bus.publish_clock_sync(&ClockSyncEvent {
                    direction: Direction::Outbound,
                    sequence,
                    time: clock.time,
                });
            } else {
                warn!("clock sync envelope without clock payload: {}", hex(bytes));
            }
        } else {
            debug!("detail-less rider message with tag10 {:?}", message.tag10);
            cx.sink
                .store("rider-message-bare", bytes, Direction::Outbound, sequence);
        }
        return Ok(());
    };

    match detail.detail_type {
        // Ride-on candidates fire on every nearby thumb; far too frequent
        // to surface as user events.
        16 => cx
            .sink
            .store("ride-on-candidate", bytes, Direction::Outbound, sequence),
        22 => match detail.command_type {
            Some(code) => cx.bus.publish_command_sent(&CommandSentEvent {
                direction: Direction::Outbound,
                sequence,
                command: CompanionCommand::from_code(code),
                code,
            }),
            None => {
                warn!("command-sent detail without command type: {}", hex(bytes));
                cx.sink
                    .store("companion-detail-22", bytes, Direction::Outbound, sequence);
            }
        },
        29 => dispatch_device_detail(detail.data.as_ref(), bytes, sequence, cx),
        tag @ (14 | 20 | 28) => {
            debug!("diagnostic companion detail type {tag}");
            cx.sink.store(
                &format!("companion-detail-{tag}"),
                bytes,
                Direction::Outbound,
                sequence,
            );
        }
        tag => {
            warn!("unknown companion detail type {tag}: {}", hex(bytes));
            cx.sink.store(
                &format!("companion-detail-{tag}"),
                bytes,
                Direction::Outbound,
                sequence,
            );
        }
    }
    Ok(())
}

/// Dispatch a detail-type-29 record by its inner data tag.
fn dispatch_device_detail(
    data: Option<&crate::proto::DetailData>,
    raw: &[u8],
    sequence: Option<u32>,
    cx: &mut DecodeCx<'_>,
) {
    let Some(data) = data else {
        warn!("device detail without data block: {}", hex(raw));
        return;
    };
    match data.tag1 {
        DATA_DEVICE_INFO => match &data.device {
            Some(device) => cx.bus.publish_device_info(&DeviceInfoEvent {
                direction: Direction::Outbound,
                sequence,
                device: device.clone(),
            }),
            None => warn!("device info record without device block: {}", hex(raw)),
        },
        DATA_ACTIVITY_ENDED => cx.bus.publish_activity_details(&ActivityEvent {
            direction: Direction::Outbound,
            sequence,
            phase: ActivityPhase::Ended {
                name: data.activity_name.clone().unwrap_or_default(),
            },
        }),
        tag => {
            debug!("opaque device detail data tag {tag}");
            cx.sink
                .store("companion-detail-29", raw, Direction::Outbound, sequence);
        }
    }
}

/// Decode a desktop-to-app companion payload: a sequence of typed items.
pub(crate) fn decode_inbound(
    bytes: &[u8],
    sequence: Option<u32>,
    cx: &mut DecodeCx<'_>,
) -> Result<(), DecodeError> {
    let message = DesktopMessage::decode(bytes).map_err(|source| DecodeError {
        what: "desktop-message",
        source,
    })?;

    for item in &message.items {
        dispatch_item(item, sequence, cx);
    }
    Ok(())
}

/// Dispatch one desktop item by its type tag.
fn dispatch_item(item: &DesktopItem, sequence: Option<u32>, cx: &mut DecodeCx<'_>) {
    match item.item_type {
        2 => match &item.power_up {
            Some(power_up) => cx.bus.publish_power_up_granted(&PowerUpEvent {
                direction: Direction::Inbound,
                sequence,
                kind: power_up.kind.clone(),
            }),
            None => warn!("power-up item without payload"),
        },
        4 => match &item.command {
            Some(command) => cx.bus.publish_command_available(&CommandAvailableEvent {
                direction: Direction::Inbound,
                sequence,
                command: CompanionCommand::from_code(command.code),
                code: command.code,
                title: command.title.clone(),
            }),
            None => warn!("command-available item without payload"),
        },
        13 => match &item.details {
            Some(details) => dispatch_details(details, item, sequence, cx),
            None => warn!("activity item without details block"),
        },
        tag if IGNORED_ITEM_TYPES.contains(&tag) => {}
        tag => {
            warn!("unknown desktop item type {tag}");
            cx.sink.store(
                &format!("desktop-item-{tag}"),
                &item.encode_to_vec(),
                Direction::Inbound,
                sequence,
            );
        }
    }
}

/// Dispatch an activity-details block by its sub-type.
fn dispatch_details(
    details: &ActivityDetails,
    item: &DesktopItem,
    sequence: Option<u32>,
    cx: &mut DecodeCx<'_>,
) {
    match details.details_type {
        3 => cx.bus.publish_activity_details(&ActivityEvent {
            direction: Direction::Inbound,
            sequence,
            phase: ActivityPhase::Started {
                activity_id: details.activity_id.unwrap_or_default(),
            },
        }),
        5 => {
            let groups = details
                .rider_data
                .as_ref()
                .map(|data| data.groups.as_slice())
                .unwrap_or_default();
            for group in groups {
                if group.index == LOCAL_RIDER_GROUP && group.riders.len() == 1 {
                    let rider = &group.riders[0];
                    cx.bus.publish_rider_position(&RiderPositionEvent {
                        direction: Direction::Inbound,
                        sequence,
                        lat: rider.lat,
                        lon: rider.lon,
                        altitude: rider.altitude,
                    });
                } else {
                    debug!(
                        "rider group {} with {} riders",
                        group.index,
                        group.riders.len()
                    );
                }
            }
        }
        tag @ (17 | 19) => debug!("nearby-rider details type {tag}, no event"),
        tag if OPAQUE_DETAILS_TYPES.contains(&tag) => {
            debug!("opaque activity details type {tag}");
            cx.sink.store(
                &format!("activity-details-{tag}"),
                &item.encode_to_vec(),
                Direction::Inbound,
                sequence,
            );
        }
        tag => {
            warn!("unknown activity details type {tag}");
            cx.sink.store(
                &format!("activity-details-{tag}"),
                &item.encode_to_vec(),
                Direction::Inbound,
                sequence,
            );
        }
    }
}

#[cfg(test)]
mod tests;
